//! Order and emptiness checks over surface positions.

use crate::selection::{Boundary, NodePath};
use crate::surface::{Surface, SurfaceNode};
use std::cmp::Ordering;

/// Document order of two boundary points. Distinct points that denote the
/// same caret position compare `Equal`.
pub fn compare_order(surface: &Surface, a: Boundary, b: Boundary) -> Ordering {
    surface.linear_offset(a).cmp(&surface.linear_offset(b))
}

/// Whether `b` comes strictly after `a`.
pub fn is_after(surface: &Surface, a: Boundary, b: Boundary) -> bool {
    compare_order(surface, a, b) == Ordering::Less
}

pub fn is_empty_text(node: &SurfaceNode) -> bool {
    matches!(node, SurfaceNode::Text(t) if t.is_empty())
}

/// Index of the mention token `b` points into, if any.
pub fn mention_at(surface: &Surface, b: Boundary) -> Option<usize> {
    match b.node {
        NodePath::Child(j) => {
            matches!(surface.nodes().get(j), Some(SurfaceNode::Mention(_))).then_some(j)
        }
        NodePath::Root => None,
    }
}
