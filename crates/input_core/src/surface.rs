//! The editable surface: a flat list of inline nodes plus a selection.
//!
//! Positions are measured in *units*: every `char` of a text run or of the
//! trigger placeholder is one unit, and every atomic node (mention token,
//! line break) is exactly one unit. Character-level edits operate on unit
//! ranges, which is what keeps tokens whole.

use crate::reconcile::{Neighbor, Removal, reconcile_after_removal};
use crate::selection::{Boundary, NodePath, Selection};
use crate::text::{char_len, insert_at_char, remove_char_range, split_off_at_char};
use crate::token::{MarkupClasses, MentionToken, TokenDisplay, TriggerPlaceholder, mention_attrs};
use html::Node;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceNode {
    Text(String),
    Mention(MentionToken),
    Trigger(TriggerPlaceholder),
    LineBreak,
}

impl SurfaceNode {
    pub fn text(s: impl Into<String>) -> Self {
        SurfaceNode::Text(s.into())
    }

    pub fn is_text(&self) -> bool {
        matches!(self, SurfaceNode::Text(_))
    }

    /// Mention tokens and line breaks.
    pub fn is_atomic(&self) -> bool {
        matches!(self, SurfaceNode::Mention(_) | SurfaceNode::LineBreak)
    }

    /// Units this node occupies.
    pub fn unit_len(&self) -> usize {
        match self {
            SurfaceNode::Text(t) => char_len(t),
            SurfaceNode::Trigger(p) => char_len(&p.text),
            SurfaceNode::Mention(_) | SurfaceNode::LineBreak => 1,
        }
    }
}

/// Where a unit offset lands for insertion purposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    InText(usize, usize),
    InTrigger(usize, usize),
    Between(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    nodes: Vec<SurfaceNode>,
    selection: Selection,
    classes: MarkupClasses,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(MarkupClasses::default())
    }
}

impl Surface {
    pub fn new(classes: MarkupClasses) -> Self {
        Self {
            nodes: Vec::new(),
            selection: Selection::default(),
            classes,
        }
    }

    /// Builds a surface from raw nodes, as-is. The caret starts at the beginning.
    pub fn from_nodes(nodes: Vec<SurfaceNode>, classes: MarkupClasses) -> Self {
        Self {
            nodes,
            selection: Selection::default(),
            classes,
        }
    }

    /// Parses surface markup (as produced by [`Surface::to_markup`]).
    ///
    /// Mention elements become tokens, trigger spans become the placeholder,
    /// `<br>` becomes a line break, and any other element is flattened into
    /// its text. Adjacent text is merged.
    pub fn from_markup(markup: &str, classes: MarkupClasses) -> Self {
        let tree = html::parse_fragment(markup);
        let mut nodes: Vec<SurfaceNode> = Vec::new();
        let mut stack: Vec<&Node> = tree.children().iter().rev().collect();
        while let Some(node) = stack.pop() {
            match node {
                Node::Text { text } => push_text(&mut nodes, text),
                Node::Comment { .. } | Node::Fragment { .. } => {}
                Node::Element { name, children, .. } => {
                    if let Some((key, label)) = mention_attrs(node, &classes.mention) {
                        let display = if children.iter().all(|c| matches!(c, Node::Text { .. })) {
                            TokenDisplay::Text(html::dom_utils::text_content(node))
                        } else {
                            TokenDisplay::Markup(html::nodes_to_html(children))
                        };
                        nodes.push(SurfaceNode::Mention(MentionToken {
                            key: key.to_string(),
                            label: label.to_string(),
                            display,
                        }));
                    } else if node.has_class(&classes.trigger) {
                        nodes.push(SurfaceNode::Trigger(TriggerPlaceholder {
                            text: html::dom_utils::text_content(node),
                        }));
                    } else if name.eq_ignore_ascii_case("br") {
                        nodes.push(SurfaceNode::LineBreak);
                    } else {
                        stack.extend(children.iter().rev());
                    }
                }
            }
        }
        log::trace!(target: "input_core.surface", "parsed {} nodes from markup", nodes.len());
        Self::from_nodes(nodes, classes)
    }

    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                SurfaceNode::Text(t) => html::escape_text_into(&mut out, t),
                SurfaceNode::Mention(m) => m.write_markup(&self.classes, &mut out),
                SurfaceNode::Trigger(p) => {
                    out.push_str("<span class=\"");
                    html::escape_attr_into(&mut out, &self.classes.trigger);
                    out.push_str("\">");
                    html::escape_text_into(&mut out, &p.text);
                    out.push_str("</span>");
                }
                SurfaceNode::LineBreak => out.push_str("<br>"),
            }
        }
        out
    }

    pub fn nodes(&self) -> &[SurfaceNode] {
        &self.nodes
    }

    pub fn classes(&self) -> &MarkupClasses {
        &self.classes
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Sets the selection; out-of-range points are clamped.
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = Selection::new(
            self.clamp_boundary(selection.anchor),
            self.clamp_boundary(selection.focus),
        );
    }

    /// Replaces the content and puts the caret at the end.
    pub fn set_content(&mut self, nodes: Vec<SurfaceNode>) {
        self.nodes = nodes;
        self.selection = Selection::collapsed(Boundary::root(self.nodes.len()));
    }

    /// Whether the surface holds no content at all (empty text runs only).
    pub fn is_empty(&self) -> bool {
        self.nodes
            .iter()
            .all(|n| matches!(n, SurfaceNode::Text(t) if t.is_empty()))
    }

    pub fn total_units(&self) -> usize {
        self.nodes.iter().map(SurfaceNode::unit_len).sum()
    }

    pub fn trigger_index(&self) -> Option<usize> {
        self.nodes
            .iter()
            .position(|n| matches!(n, SurfaceNode::Trigger(_)))
    }

    pub fn trigger(&self) -> Option<&TriggerPlaceholder> {
        self.nodes.iter().find_map(|n| match n {
            SurfaceNode::Trigger(p) => Some(p),
            _ => None,
        })
    }

    /// Overwrites the trigger placeholder's text. Returns `false` when there
    /// is no placeholder.
    pub fn set_trigger_text(&mut self, text: &str) -> bool {
        let Some(idx) = self.trigger_index() else {
            return false;
        };
        if let SurfaceNode::Trigger(p) = &mut self.nodes[idx] {
            p.text = text.to_string();
        }
        true
    }

    /// Mention tokens in document order.
    pub fn mentions(&self) -> impl Iterator<Item = &MentionToken> {
        self.nodes.iter().filter_map(|n| match n {
            SurfaceNode::Mention(m) => Some(m),
            _ => None,
        })
    }

    fn node_start(&self, index: usize) -> usize {
        self.nodes[..index.min(self.nodes.len())]
            .iter()
            .map(SurfaceNode::unit_len)
            .sum()
    }

    /// Unit offset of `b` from the start of the surface.
    pub fn linear_offset(&self, b: Boundary) -> usize {
        match b.node {
            NodePath::Root => self.node_start(b.offset),
            NodePath::Child(j) => match self.nodes.get(j) {
                Some(node) => self.node_start(j) + b.offset.min(node.unit_len()),
                None => self.total_units(),
            },
        }
    }

    pub fn is_valid_boundary(&self, b: Boundary) -> bool {
        match b.node {
            NodePath::Root => b.offset <= self.nodes.len(),
            NodePath::Child(j) => self.nodes.get(j).is_some_and(|n| b.offset <= n.unit_len()),
        }
    }

    pub fn clamp_boundary(&self, b: Boundary) -> Boundary {
        match b.node {
            NodePath::Root => Boundary::root(b.offset.min(self.nodes.len())),
            NodePath::Child(j) => match self.nodes.get(j) {
                Some(n) => Boundary::child(j, b.offset.min(n.unit_len())),
                None => Boundary::root(self.nodes.len()),
            },
        }
    }

    /// Canonical boundary for a unit offset: inside a text run when one
    /// touches the offset, otherwise inside the trigger, otherwise a
    /// container point.
    pub fn boundary_at(&self, x: usize) -> Boundary {
        let mut start = 0;
        let mut trigger_hit = None;
        for (j, node) in self.nodes.iter().enumerate() {
            let end = start + node.unit_len();
            if (start..=end).contains(&x) {
                match node {
                    SurfaceNode::Text(_) => return Boundary::child(j, x - start),
                    SurfaceNode::Trigger(_) if trigger_hit.is_none() => {
                        trigger_hit = Some(Boundary::child(j, x - start));
                    }
                    _ => {}
                }
            }
            start = end;
        }
        if let Some(b) = trigger_hit {
            return b;
        }
        let mut start = 0;
        let mut k = 0;
        for node in &self.nodes {
            let end = start + node.unit_len();
            if end > x {
                break;
            }
            k += 1;
            start = end;
        }
        Boundary::root(k)
    }

    fn slot_at(&self, x: usize) -> Slot {
        let mut start = 0;
        for (j, node) in self.nodes.iter().enumerate() {
            let end = start + node.unit_len();
            match node {
                SurfaceNode::Text(_) if (start..=end).contains(&x) => {
                    return Slot::InText(j, x - start);
                }
                SurfaceNode::Trigger(_) if start < x && x < end => {
                    return Slot::InTrigger(j, x - start);
                }
                _ => {}
            }
            start = end;
        }
        match self.boundary_at(x) {
            Boundary {
                node: NodePath::Root,
                offset,
            } => Slot::Between(offset),
            Boundary {
                node: NodePath::Child(j),
                offset,
            } => {
                if offset == 0 {
                    Slot::Between(j)
                } else {
                    Slot::Between(j + 1)
                }
            }
        }
    }

    /// Selection as an ordered unit range.
    pub fn selected_range(&self) -> (usize, usize) {
        let a = self.linear_offset(self.selection.anchor);
        let f = self.linear_offset(self.selection.focus);
        (a.min(f), a.max(f))
    }

    pub fn is_collapsed(&self) -> bool {
        let (s, e) = self.selected_range();
        s == e
    }

    pub fn caret_offset(&self) -> usize {
        self.linear_offset(self.selection.focus)
    }

    pub fn set_caret(&mut self, b: Boundary) {
        self.set_selection(Selection::collapsed(b));
    }

    pub fn set_caret_after(&mut self, index: usize) {
        self.set_caret(Boundary::root(index + 1));
    }

    /// Selects node `index` as a whole.
    pub fn select_node(&mut self, index: usize) {
        self.set_selection(Selection::new(
            Boundary::root(index),
            Boundary::root(index + 1),
        ));
    }

    pub fn collapse_to_end(&mut self) {
        self.set_caret(Boundary::root(self.nodes.len()));
    }

    /// Inserts `s` at the caret, replacing any selection. The caret ends up
    /// after the inserted text.
    pub fn insert_text(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        self.delete_selection();
        let x = self.caret_offset();
        match self.slot_at(x) {
            Slot::InText(j, o) => {
                if let SurfaceNode::Text(t) = &mut self.nodes[j] {
                    insert_at_char(t, o, s);
                }
            }
            Slot::InTrigger(j, o) => {
                if let SurfaceNode::Trigger(p) = &mut self.nodes[j] {
                    insert_at_char(&mut p.text, o, s);
                }
            }
            Slot::Between(k) => self.nodes.insert(k, SurfaceNode::text(s)),
        }
        let caret = x + char_len(s);
        self.selection = Selection::collapsed(self.boundary_at(caret));
        self.normalize();
    }

    /// Inserts `node` at the caret, splitting a text run if needed, and
    /// places the caret right after it. Returns the node's index.
    pub fn insert_node(&mut self, node: SurfaceNode) -> usize {
        self.delete_selection();
        let x = self.caret_offset();
        let index = match self.slot_at(x) {
            Slot::InText(j, o) => {
                let len = self.nodes[j].unit_len();
                if o == 0 {
                    j
                } else if o >= len {
                    j + 1
                } else {
                    let tail = match &mut self.nodes[j] {
                        SurfaceNode::Text(t) => split_off_at_char(t, o),
                        _ => String::new(),
                    };
                    self.nodes.insert(j + 1, SurfaceNode::Text(tail));
                    j + 1
                }
            }
            Slot::InTrigger(j, _) => j + 1,
            Slot::Between(k) => k,
        };
        self.nodes.insert(index, node);
        self.set_caret_after(index);
        index
    }

    pub fn insert_line_break(&mut self) -> usize {
        self.insert_node(SurfaceNode::LineBreak)
    }

    /// Deletes the selected units. Returns `false` for a collapsed selection.
    pub fn delete_selection(&mut self) -> bool {
        let (s, e) = self.selected_range();
        if s == e {
            return false;
        }
        self.remove_units(s, e);
        true
    }

    /// Deletes the selection, or the unit before the caret. An atomic node
    /// before the caret is removed whole.
    pub fn delete_backward(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        let x = self.caret_offset();
        if x == 0 {
            return false;
        }
        self.remove_units(x - 1, x);
        true
    }

    /// Deletes the selection, or the unit after the caret.
    pub fn delete_forward(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        let x = self.caret_offset();
        if x >= self.total_units() {
            return false;
        }
        self.remove_units(x, x + 1);
        true
    }

    fn remove_units(&mut self, s: usize, e: usize) {
        let mut start = 0;
        let mut kept = Vec::with_capacity(self.nodes.len());
        for mut node in std::mem::take(&mut self.nodes) {
            let len = node.unit_len();
            let end = start + len;
            let a = s.max(start);
            let b = e.min(end);
            if a < b {
                match &mut node {
                    SurfaceNode::Text(t) => remove_char_range(t, a - start, b - start),
                    SurfaceNode::Trigger(p) => remove_char_range(&mut p.text, a - start, b - start),
                    SurfaceNode::Mention(_) | SurfaceNode::LineBreak => {
                        start = end;
                        continue;
                    }
                }
                if node.unit_len() == 0 && !node.is_text() {
                    start = end;
                    continue;
                }
            }
            kept.push(node);
            start = end;
        }
        self.nodes = kept;
        self.selection = Selection::collapsed(self.boundary_at(s));
        self.normalize();
    }

    /// Merges adjacent text runs and drops empty ones, keeping the selection
    /// at the same unit offsets.
    pub fn normalize(&mut self) {
        let anchor = self.linear_offset(self.selection.anchor);
        let focus = self.linear_offset(self.selection.focus);
        let mut merged: Vec<SurfaceNode> = Vec::with_capacity(self.nodes.len());
        for node in std::mem::take(&mut self.nodes) {
            match node {
                SurfaceNode::Text(t) if t.is_empty() => {}
                SurfaceNode::Text(t) => push_text(&mut merged, &t),
                other => merged.push(other),
            }
        }
        self.nodes = merged;
        self.selection = Selection::new(self.boundary_at(anchor), self.boundary_at(focus));
    }

    /// Removes node `index`, merging the text runs on either side of it, and
    /// reconciles the selection.
    pub fn remove_node(&mut self, index: usize) -> Option<SurfaceNode> {
        self.splice(index, None)
    }

    /// Replaces the trigger placeholder at `index` with its literal text,
    /// folded into the surrounding text. The selection keeps its position.
    pub fn unwrap_placeholder(&mut self, index: usize) -> bool {
        let text = match self.nodes.get(index) {
            Some(SurfaceNode::Trigger(p)) => p.text.clone(),
            _ => return false,
        };
        self.splice(index, Some(text)).is_some()
    }

    fn neighbor(&self, index: Option<usize>) -> Neighbor {
        match index.and_then(|i| self.nodes.get(i)) {
            Some(SurfaceNode::Text(t)) => Neighbor::Text(char_len(t)),
            Some(_) => Neighbor::Atomic,
            None => Neighbor::Missing,
        }
    }

    fn splice(&mut self, index: usize, replacement: Option<String>) -> Option<SurfaceNode> {
        if index >= self.nodes.len() {
            return None;
        }
        let removal = Removal {
            index,
            left: self.neighbor(index.checked_sub(1)),
            right: self.neighbor(Some(index + 1)),
            removed_len: self.nodes[index].unit_len(),
            replacement_len: replacement.as_deref().map_or(0, char_len),
        };

        let lo = if removal.left.is_text() { index - 1 } else { index };
        let hi = if removal.right.is_text() { index + 1 } else { index };
        let mut removed = None;
        let mut text = String::new();
        let mut keep_text = false;
        for (pos, node) in (lo..).zip(self.nodes.drain(lo..=hi)) {
            if pos == index {
                removed = Some(node);
                if let Some(r) = replacement.as_deref().filter(|r| !r.is_empty()) {
                    text.push_str(r);
                    keep_text = true;
                }
            } else if let SurfaceNode::Text(t) = node {
                text.push_str(&t);
                keep_text = true;
            }
        }
        if keep_text {
            self.nodes.insert(lo, SurfaceNode::Text(text));
        }

        let fix = |surface: &Surface, point: Boundary| {
            let mapped = reconcile_after_removal(point, &removal);
            if surface.is_valid_boundary(mapped) {
                mapped
            } else {
                log::warn!(
                    target: "input_core.reconcile",
                    "no valid position for {point:?} after removing node {index}; falling back"
                );
                Boundary::root(index.min(surface.nodes.len()))
            }
        };
        let anchor = fix(&*self, self.selection.anchor);
        let focus = fix(&*self, self.selection.focus);
        self.selection = Selection::new(anchor, focus);
        removed
    }
}

fn push_text(nodes: &mut Vec<SurfaceNode>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(SurfaceNode::Text(last)) = nodes.last_mut() {
        last.push_str(text);
    } else {
        nodes.push(SurfaceNode::text(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mention(key: &str, label: &str) -> SurfaceNode {
        SurfaceNode::Mention(MentionToken::new(key, label, "@", " "))
    }

    fn surface(nodes: Vec<SurfaceNode>) -> Surface {
        Surface::from_nodes(nodes, MarkupClasses::default())
    }

    #[test]
    fn markup_round_trips_through_parse() {
        let s = surface(vec![
            SurfaceNode::text("Hi "),
            mention("1", "Alice"),
            SurfaceNode::text("!"),
            SurfaceNode::LineBreak,
            SurfaceNode::Trigger(TriggerPlaceholder::new('@')),
        ]);
        let markup = s.to_markup();
        assert_eq!(
            markup,
            "Hi <em class=\"mention\" contenteditable=\"false\" data-id=\"1\" data-name=\"Alice\">@Alice </em>!<br><span class=\"at\">@</span>"
        );
        let parsed = Surface::from_markup(&markup, MarkupClasses::default());
        assert_eq!(parsed.nodes(), s.nodes());
    }

    #[test]
    fn unknown_elements_are_flattened() {
        let s = Surface::from_markup("a<b>b<i>c</i></b>d<!--x-->", MarkupClasses::default());
        assert_eq!(s.nodes(), &[SurfaceNode::text("abcd")]);
    }

    #[test]
    fn insert_text_extends_existing_run() {
        let mut s = surface(vec![SurfaceNode::text("ac")]);
        s.set_caret(Boundary::child(0, 1));
        s.insert_text("b");
        assert_eq!(s.nodes(), &[SurfaceNode::text("abc")]);
        assert_eq!(s.selection(), Selection::collapsed(Boundary::child(0, 2)));
    }

    #[test]
    fn insert_text_after_token_creates_run() {
        let mut s = surface(vec![mention("1", "A")]);
        s.set_caret(Boundary::root(1));
        s.insert_text("x");
        assert_eq!(s.nodes(), &[mention("1", "A"), SurfaceNode::text("x")]);
        assert_eq!(s.caret_offset(), 2);
    }

    #[test]
    fn insert_node_splits_text() {
        let mut s = surface(vec![SurfaceNode::text("abcd")]);
        s.set_caret(Boundary::child(0, 2));
        let idx = s.insert_node(mention("1", "A"));
        assert_eq!(idx, 1);
        assert_eq!(
            s.nodes(),
            &[SurfaceNode::text("ab"), mention("1", "A"), SurfaceNode::text("cd")]
        );
        assert_eq!(s.selection(), Selection::collapsed(Boundary::root(2)));
    }

    #[test]
    fn delete_backward_removes_token_whole() {
        let mut s = surface(vec![
            SurfaceNode::text("a"),
            mention("1", "A"),
            SurfaceNode::text("b"),
        ]);
        s.set_caret(Boundary::child(2, 0));
        assert!(s.delete_backward());
        assert_eq!(s.nodes(), &[SurfaceNode::text("ab")]);
        assert_eq!(s.selection(), Selection::collapsed(Boundary::child(0, 1)));
    }

    #[test]
    fn delete_selection_never_splits_token() {
        let mut s = surface(vec![
            SurfaceNode::text("ab"),
            mention("1", "A"),
            SurfaceNode::text("cd"),
        ]);
        s.set_selection(Selection::new(Boundary::child(2, 1), Boundary::child(0, 1)));
        assert!(s.delete_selection());
        assert_eq!(s.nodes(), &[SurfaceNode::text("ad")]);
        assert!(s.is_collapsed());
        assert_eq!(s.caret_offset(), 1);
    }

    #[test]
    fn delete_forward_removes_token_whole() {
        let mut s = surface(vec![SurfaceNode::text("a"), mention("1", "A"), SurfaceNode::text("b")]);
        s.set_caret(Boundary::child(0, 1));
        assert!(s.delete_forward());
        assert_eq!(s.nodes(), &[SurfaceNode::text("ab")]);
        assert_eq!(s.caret_offset(), 1);
        s.collapse_to_end();
        assert!(!s.delete_forward());
    }

    #[test]
    fn delete_backward_at_start_is_noop() {
        let mut s = surface(vec![SurfaceNode::text("a")]);
        assert!(!s.delete_backward());
        assert_eq!(s.nodes(), &[SurfaceNode::text("a")]);
    }

    #[test]
    fn unwrap_placeholder_folds_text_and_keeps_caret() {
        let mut s = surface(vec![
            SurfaceNode::text("hi "),
            SurfaceNode::Trigger(TriggerPlaceholder {
                text: "@al".to_string(),
            }),
            SurfaceNode::text("!"),
        ]);
        s.set_caret(Boundary::child(1, 3));
        assert!(s.unwrap_placeholder(1));
        assert_eq!(s.nodes(), &[SurfaceNode::text("hi @al!")]);
        assert_eq!(s.selection(), Selection::collapsed(Boundary::child(0, 6)));
    }

    #[test]
    fn unwrap_placeholder_rejects_other_nodes() {
        let mut s = surface(vec![SurfaceNode::text("a")]);
        assert!(!s.unwrap_placeholder(0));
        assert!(!s.unwrap_placeholder(3));
    }

    #[test]
    fn remove_node_reconciles_container_caret() {
        let mut s = surface(vec![
            SurfaceNode::text("ab"),
            SurfaceNode::Trigger(TriggerPlaceholder::new('@')),
            SurfaceNode::text("cd"),
        ]);
        s.set_caret(Boundary::root(2));
        assert!(s.remove_node(1).is_some());
        assert_eq!(s.nodes(), &[SurfaceNode::text("abcd")]);
        assert_eq!(s.selection(), Selection::collapsed(Boundary::child(0, 2)));
    }

    #[test]
    fn boundary_at_prefers_text() {
        let s = surface(vec![mention("1", "A"), SurfaceNode::text("xy"), mention("2", "B")]);
        assert_eq!(s.boundary_at(0), Boundary::root(0));
        assert_eq!(s.boundary_at(1), Boundary::child(1, 0));
        assert_eq!(s.boundary_at(3), Boundary::child(1, 2));
        assert_eq!(s.boundary_at(4), Boundary::root(3));
    }

    #[test]
    fn set_selection_clamps() {
        let mut s = surface(vec![SurfaceNode::text("ab")]);
        s.set_selection(Selection::new(Boundary::child(0, 9), Boundary::child(4, 0)));
        assert_eq!(s.selection().anchor, Boundary::child(0, 2));
        assert_eq!(s.selection().focus, Boundary::root(1));
    }
}
