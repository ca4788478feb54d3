//! Selection snapshots: record the surface markup plus anchor/focus relative
//! to the non-empty child list, and restore both later.
//!
//! Indices count *runs*: consecutive text children (empty ones ignored) form
//! one run, because that is how the markup reparses. Every other child is a
//! run of its own. Offsets are unit offsets inside the run.

use crate::selection::{Boundary, NodePath, Selection};
use crate::surface::{Surface, SurfaceNode};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionSnapshot {
    pub markup: String,
    pub anchor_node_idx: usize,
    pub anchor_offset: usize,
    pub focus_node_idx: usize,
    pub focus_offset: usize,
}

struct RunMap {
    /// Run index and offset of each child; `None` for empty text.
    slots: Vec<Option<(usize, usize)>>,
    runs: usize,
}

impl RunMap {
    fn build(nodes: &[SurfaceNode]) -> Self {
        let mut slots = Vec::with_capacity(nodes.len());
        let mut runs = 0usize;
        let mut open_text_len: Option<usize> = None;
        for node in nodes {
            match node {
                SurfaceNode::Text(t) if t.is_empty() => slots.push(None),
                SurfaceNode::Text(_) => {
                    let len = node.unit_len();
                    match open_text_len {
                        Some(prev) => {
                            slots.push(Some((runs - 1, prev)));
                            open_text_len = Some(prev + len);
                        }
                        None => {
                            slots.push(Some((runs, 0)));
                            runs += 1;
                            open_text_len = Some(len);
                        }
                    }
                }
                _ => {
                    slots.push(Some((runs, 0)));
                    runs += 1;
                    open_text_len = None;
                }
            }
        }
        Self { slots, runs }
    }

    /// End of the nearest non-empty child at or before `index`.
    fn end_of_previous(&self, nodes: &[SurfaceNode], index: usize) -> (usize, usize) {
        (0..=index.min(nodes.len().saturating_sub(1)))
            .rev()
            .find_map(|c| {
                self.slots
                    .get(c)
                    .copied()
                    .flatten()
                    .map(|(run, off)| (run, off + nodes[c].unit_len()))
            })
            .unwrap_or((0, 0))
    }

    fn express(&self, nodes: &[SurfaceNode], b: Boundary) -> (usize, usize) {
        match b.node {
            NodePath::Child(j) => match self.slots.get(j).copied().flatten() {
                Some((run, off)) => (run, off + b.offset.min(nodes[j].unit_len())),
                None if j == 0 => (0, 0),
                None => self.end_of_previous(nodes, j - 1),
            },
            NodePath::Root if b.offset == 0 || nodes.is_empty() => (0, 0),
            NodePath::Root => self.end_of_previous(nodes, b.offset - 1),
        }
    }
}

/// Records the surface markup and selection.
///
/// An empty surface yields the all-zero sentinel. A container point is
/// re-expressed as the end of the nearest non-empty child before it.
pub fn capture_selection(surface: &Surface) -> SelectionSnapshot {
    let nodes = surface.nodes();
    let map = RunMap::build(nodes);
    if map.runs == 0 {
        return SelectionSnapshot {
            markup: surface.to_markup(),
            ..SelectionSnapshot::default()
        };
    }
    let selection = surface.selection();
    let (anchor_node_idx, anchor_offset) = map.express(nodes, selection.anchor);
    let (focus_node_idx, focus_offset) = map.express(nodes, selection.focus);
    SelectionSnapshot {
        markup: surface.to_markup(),
        anchor_node_idx,
        anchor_offset,
        focus_node_idx,
        focus_offset,
    }
}

/// Replaces the surface content with the snapshot markup and reapplies the
/// recorded selection, clamped to what the markup produced.
pub fn restore_selection(surface: &mut Surface, snapshot: &SelectionSnapshot) {
    *surface = Surface::from_markup(&snapshot.markup, surface.classes().clone());
    let point = |idx: usize, offset: usize| match surface.nodes().get(idx) {
        Some(node) => Boundary::child(idx, offset.min(node.unit_len())),
        None => Boundary::root(surface.nodes().len()),
    };
    let selection = Selection::new(
        point(snapshot.anchor_node_idx, snapshot.anchor_offset),
        point(snapshot.focus_node_idx, snapshot.focus_offset),
    );
    log::debug!(target: "input_core.snapshot", "restored selection {selection:?}");
    surface.set_selection(selection);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{MarkupClasses, MentionToken};
    use pretty_assertions::assert_eq;

    fn mention() -> SurfaceNode {
        SurfaceNode::Mention(MentionToken::new("1", "A", "@", " "))
    }

    #[test]
    fn empty_surface_gives_zero_sentinel() {
        let s = Surface::from_nodes(vec![SurfaceNode::text("")], MarkupClasses::default());
        let snap = capture_selection(&s);
        assert_eq!(snap, SelectionSnapshot::default());
    }

    #[test]
    fn container_point_walks_back_over_empty_text() {
        let mut s = Surface::from_nodes(
            vec![
                SurfaceNode::text("ab"),
                mention(),
                SurfaceNode::text(""),
                SurfaceNode::text(""),
            ],
            MarkupClasses::default(),
        );
        s.set_caret(Boundary::root(4));
        let snap = capture_selection(&s);
        assert_eq!((snap.focus_node_idx, snap.focus_offset), (1, 1));
    }

    #[test]
    fn adjacent_text_children_share_a_run() {
        let mut s = Surface::from_nodes(
            vec![SurfaceNode::text("ab"), SurfaceNode::text(""), SurfaceNode::text("cd")],
            MarkupClasses::default(),
        );
        s.set_caret(Boundary::child(2, 1));
        let snap = capture_selection(&s);
        assert_eq!((snap.anchor_node_idx, snap.anchor_offset), (0, 3));
    }

    #[test]
    fn restore_reapplies_markup_and_selection() {
        let mut s = Surface::from_nodes(
            vec![SurfaceNode::text("hi "), mention(), SurfaceNode::text("x")],
            MarkupClasses::default(),
        );
        s.set_selection(Selection::new(Boundary::child(0, 1), Boundary::root(2)));
        let snap = capture_selection(&s);

        s.insert_text("zzz");
        restore_selection(&mut s, &snap);

        assert_eq!(
            s.nodes(),
            &[SurfaceNode::text("hi "), mention(), SurfaceNode::text("x")]
        );
        assert_eq!(
            s.selection(),
            Selection::new(Boundary::child(0, 1), Boundary::child(1, 1))
        );
    }
}
