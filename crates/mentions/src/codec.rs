//! Conversion between the canonical value and the editable surface.
//!
//! The canonical value is plain text with one marker per mention
//! (`#{name:<label>,id:<value>}` unless a [`Formatter`](crate::Formatter) is
//! configured). Line breaks are `\n` in the value and `<br>` on a textarea
//! surface.

use crate::config::MentionsConfig;
use crate::option::MentionOption;
use core_types::EditorKind;
use html::Node;
use input_core::{MentionToken, Surface, SurfaceNode, char_len, mention_attrs, normalize_newlines};
use regex::Captures;

/// A piece of a decoded value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Mention(MentionOption),
}

fn mention_from_captures(caps: &Captures<'_>) -> Option<MentionOption> {
    let label = caps.name("label").or_else(|| caps.get(1))?;
    let value = caps.name("value").or_else(|| caps.get(2))?;
    Some(MentionOption::new(label.as_str(), value.as_str()))
}

fn push_text(segments: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    match segments.last_mut() {
        Some(Segment::Text(t)) => t.push_str(text),
        _ => segments.push(Segment::Text(text.to_string())),
    }
}

/// Splits a canonical value into text and mentions.
///
/// Matches that lack a label or value group, and empty matches, stay text.
pub fn decode(value: &str, config: &MentionsConfig) -> Vec<Segment> {
    let value = normalize_newlines(value);
    let mut segments = Vec::new();
    let mut last = 0;
    for caps in config.mention_pattern().captures_iter(&value) {
        let Some(m) = caps.get(0) else { continue };
        if m.is_empty() {
            continue;
        }
        let Some(option) = mention_from_captures(&caps) else {
            continue;
        };
        push_text(&mut segments, &value[last..m.start()]);
        segments.push(Segment::Mention(option));
        last = m.end();
    }
    push_text(&mut segments, &value[last..]);
    segments
}

/// The surface token for one mention.
pub fn token_for(option: &MentionOption, config: &MentionsConfig) -> MentionToken {
    match config.formatter() {
        Some(f) => MentionToken::with_markup(
            option.value.clone(),
            option.label.clone(),
            (f.render)(&option.value, &option.label),
        ),
        None => MentionToken::new(
            option.value.clone(),
            option.label.clone(),
            config.prefix(),
            config.suffix(),
        ),
    }
}

/// Builds the surface for a canonical value. The caret ends up at the end.
///
/// In a textarea, `\n` becomes a line break; in a single-line input it stays
/// literal text.
pub fn render(value: &str, config: &MentionsConfig) -> Surface {
    let multiline = config.kind() == EditorKind::Textarea;
    let mut nodes = Vec::new();
    for segment in decode(value, config) {
        match segment {
            Segment::Text(t) if multiline => {
                for (i, line) in t.split('\n').enumerate() {
                    if i > 0 {
                        nodes.push(SurfaceNode::LineBreak);
                    }
                    if !line.is_empty() {
                        nodes.push(SurfaceNode::text(line));
                    }
                }
            }
            Segment::Text(t) => nodes.push(SurfaceNode::Text(t)),
            Segment::Mention(option) => nodes.push(SurfaceNode::Mention(token_for(&option, config))),
        }
    }
    let mut surface = Surface::new(config.classes().markup());
    surface.set_content(nodes);
    surface.normalize();
    surface
}

/// Canonical value of a surface model.
pub fn encode_surface(surface: &Surface, config: &MentionsConfig) -> String {
    let mut out = String::new();
    for node in surface.nodes() {
        match node {
            SurfaceNode::Text(t) => out.push_str(t),
            SurfaceNode::Mention(m) => out.push_str(&config.marker(&m.key, &m.label)),
            SurfaceNode::Trigger(p) => out.push_str(&p.text),
            SurfaceNode::LineBreak => out.push('\n'),
        }
    }
    out
}

/// Canonical value of surface markup.
///
/// Mention elements become markers, `<br>` becomes `\n` and every other
/// element contributes its text. Comments are dropped.
pub fn encode(markup: &str, config: &MentionsConfig) -> String {
    let tree = html::parse_fragment(markup);
    let mention_class = &config.classes().mention;
    let mut out = String::new();
    let mut stack: Vec<&Node> = tree.children().iter().rev().collect();
    while let Some(node) = stack.pop() {
        match node {
            Node::Text { text } => out.push_str(text),
            Node::Comment { .. } | Node::Fragment { .. } => {}
            Node::Element { name, children, .. } => {
                if let Some((key, label)) = mention_attrs(node, mention_class) {
                    out.push_str(&config.marker(key, label));
                } else if name.eq_ignore_ascii_case("br") {
                    out.push('\n');
                } else {
                    stack.extend(children.iter().rev());
                }
            }
        }
    }
    out
}

/// Weight of one mention towards the length limit.
pub fn mention_length(option: &MentionOption, config: &MentionsConfig) -> usize {
    match &config.get_mention_length {
        Some(f) => f(option),
        None => char_len(&config.marker(&option.value, &option.label)),
    }
}

/// Effective length of a canonical value: text counts per `char`, each
/// mention by its weight.
pub fn value_length(value: &str, config: &MentionsConfig) -> usize {
    decode(value, config)
        .iter()
        .map(|s| match s {
            Segment::Text(t) => char_len(t),
            Segment::Mention(option) => mention_length(option, config),
        })
        .sum()
}

/// Mentions referenced by a canonical value, in order.
///
/// Markers are matched and stripped one at a time until none remain.
pub fn scan_mentions(value: &str, config: &MentionsConfig) -> Vec<MentionOption> {
    let pattern = config.mention_pattern();
    let mut rest = value.to_string();
    let mut found = Vec::new();
    loop {
        let (range, option) = {
            let Some(caps) = pattern.captures(&rest) else {
                break;
            };
            let Some(m) = caps.get(0) else { break };
            if m.is_empty() {
                break;
            }
            (m.range(), mention_from_captures(&caps))
        };
        match option {
            Some(option) => found.push(option),
            None => {
                log::debug!(target: "mentions.codec", "marker without label/value groups at {range:?}");
            }
        }
        rest.replace_range(range, "");
    }
    found
}
