//! Selection reconciliation after an inline node is removed.
//!
//! Removing node `i` (optionally replacing it with a text run of length `t`)
//! makes the text runs on its left and right adjacent; the surface merges
//! them with the replacement into one run. A boundary point taken before the
//! mutation is classified by where it sits relative to `i` and then mapped
//! through a small table keyed by that placement and the neighbour kinds.
//!
//! In unit terms: points before the removed node keep their offset, points
//! inside it collapse onto its start (or stay inside the replacement text),
//! and points after it move left by `removed_len - t`.

use crate::selection::{Boundary, NodePath};

/// Kind of node next to the removed one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Neighbor {
    /// A text run with this many chars. Empty runs still merge.
    Text(usize),
    /// Any non-text node.
    Atomic,
    /// The removed node was first or last.
    Missing,
}

impl Neighbor {
    pub fn is_text(self) -> bool {
        matches!(self, Neighbor::Text(_))
    }

    fn text_len(self) -> usize {
        match self {
            Neighbor::Text(len) => len,
            _ => 0,
        }
    }
}

/// Description of a single-node removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Removal {
    /// Index of the removed node in the pre-removal child list.
    pub index: usize,
    pub left: Neighbor,
    pub right: Neighbor,
    /// Units the removed node occupied.
    pub removed_len: usize,
    /// Length of the text the node is replaced with (`0` for plain removal).
    pub replacement_len: usize,
}

impl Removal {
    /// Whether a text run remains where the node and its text neighbours were.
    fn merges(&self) -> bool {
        self.left.is_text() || self.right.is_text() || self.replacement_len > 0
    }

    fn merged_index(&self) -> usize {
        if self.left.is_text() {
            self.index.saturating_sub(1)
        } else {
            self.index
        }
    }

    /// How many child slots disappear.
    fn shift(&self) -> usize {
        let before = 1 + usize::from(self.left.is_text()) + usize::from(self.right.is_text());
        before - usize::from(self.merges())
    }
}

/// Where a point sits relative to the removed node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Strictly before the removed node (including inside the left neighbour).
    Before,
    /// Inside the removed node, `offset` units from its start.
    At { offset: usize },
    /// Inside the right neighbour.
    ImmediatelyAfter { offset: usize },
    /// Past the right neighbour.
    After,
}

/// Classifies `point` against `removal`.
///
/// A container point between children is treated as the matching edge of the
/// removed node when it touches it.
pub fn placement(point: Boundary, removal: &Removal) -> Placement {
    let i = removal.index;
    match point.node {
        NodePath::Child(j) if j < i => Placement::Before,
        NodePath::Child(j) if j == i => Placement::At {
            offset: point.offset,
        },
        NodePath::Child(j) if j == i + 1 => Placement::ImmediatelyAfter {
            offset: point.offset,
        },
        NodePath::Child(_) => Placement::After,
        NodePath::Root => {
            let k = point.offset;
            if k < i {
                Placement::Before
            } else if k == i {
                Placement::At { offset: 0 }
            } else if k == i + 1 {
                Placement::At {
                    offset: removal.removed_len,
                }
            } else {
                Placement::After
            }
        }
    }
}

/// Maps a pre-removal boundary point to the equivalent post-removal point.
///
/// The result is not validated against a surface; callers fall back to the
/// removed node's old position when it does not fit.
pub fn reconcile_after_removal(point: Boundary, removal: &Removal) -> Boundary {
    let merged = removal.merged_index();
    let base = removal.left.text_len();
    let t = removal.replacement_len;

    let mapped = match (placement(point, removal), removal.merges(), removal.right.is_text()) {
        (Placement::Before, _, _) => point,
        (Placement::At { offset }, true, _) => Boundary::child(merged, base + offset.min(t)),
        (Placement::At { .. }, false, _) => Boundary::root(removal.index),
        (Placement::ImmediatelyAfter { offset }, _, true) => {
            Boundary::child(merged, base + t + offset)
        }
        (Placement::ImmediatelyAfter { .. }, _, false) | (Placement::After, _, _) => {
            shift_left(point, removal.shift())
        }
    };
    log::trace!(target: "input_core.reconcile", "{point:?} -> {mapped:?} via {removal:?}");
    mapped
}

fn shift_left(point: Boundary, by: usize) -> Boundary {
    match point.node {
        NodePath::Root => Boundary::root(point.offset.saturating_sub(by)),
        NodePath::Child(j) => Boundary::child(j.saturating_sub(by), point.offset),
    }
}
