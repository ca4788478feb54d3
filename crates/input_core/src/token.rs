//! Inline atomic mention tokens and the transient trigger placeholder.

use html::Node;

/// Class names used when writing and recognising surface markup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkupClasses {
    /// Class of mention token elements.
    pub mention: String,
    /// Class of the trigger placeholder element.
    pub trigger: String,
}

impl Default for MarkupClasses {
    fn default() -> Self {
        Self {
            mention: "mention".to_string(),
            trigger: "at".to_string(),
        }
    }
}

/// How a token presents itself inside the surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenDisplay {
    /// Plain text, escaped on output (`prefix + label + suffix`).
    Text(String),
    /// A markup fragment produced by a custom formatter, written verbatim.
    Markup(String),
}

/// An atomic inline reference to an external entity.
///
/// Character-level edits never split a token: caret movement, deletion and
/// selection treat it as a single unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MentionToken {
    pub key: String,
    pub label: String,
    pub display: TokenDisplay,
}

impl MentionToken {
    /// Token rendered as `prefix + label + suffix`.
    pub fn new(key: impl Into<String>, label: impl Into<String>, prefix: &str, suffix: &str) -> Self {
        let label = label.into();
        let display = TokenDisplay::Text(format!("{prefix}{label}{suffix}"));
        Self {
            key: key.into(),
            label,
            display,
        }
    }

    pub fn with_markup(
        key: impl Into<String>,
        label: impl Into<String>,
        markup: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            display: TokenDisplay::Markup(markup.into()),
        }
    }

    pub(crate) fn write_markup(&self, classes: &MarkupClasses, out: &mut String) {
        out.push_str("<em class=\"");
        html::escape_attr_into(out, &classes.mention);
        out.push_str("\" contenteditable=\"false\" data-id=\"");
        html::escape_attr_into(out, &self.key);
        out.push_str("\" data-name=\"");
        html::escape_attr_into(out, &self.label);
        out.push_str("\">");
        match &self.display {
            TokenDisplay::Text(t) => html::escape_text_into(out, t),
            TokenDisplay::Markup(m) => out.push_str(m),
        }
        out.push_str("</em>");
    }
}

/// Transient marker inserted when the trigger character is typed.
///
/// Holds the literal trigger followed by the filter text typed so far.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriggerPlaceholder {
    pub text: String,
}

impl TriggerPlaceholder {
    pub fn new(trigger: char) -> Self {
        Self {
            text: trigger.to_string(),
        }
    }
}

/// Key and label of `node` when it is a mention token element.
///
/// An element qualifies when its class list contains `mention_class` or a
/// class ending in `mention`, and it carries a key (`data-key`/`data-id`) and
/// a label (`data-label`/`data-name`).
pub fn mention_attrs<'a>(node: &'a Node, mention_class: &str) -> Option<(&'a str, &'a str)> {
    let classes = node.attr("class")?;
    let is_mention = classes
        .split_ascii_whitespace()
        .any(|c| c == mention_class || c.ends_with("mention"));
    if !is_mention {
        return None;
    }
    let key = node.attr("data-key").or_else(|| node.attr("data-id"))?;
    let label = node.attr("data-label").or_else(|| node.attr("data-name"))?;
    Some((key, label))
}
