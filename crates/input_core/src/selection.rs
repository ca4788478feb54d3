//! Boundary points and selections over a surface's child list.

/// Node a boundary point is expressed against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodePath {
    /// The surface container itself; the offset is a child index.
    Root,
    /// A direct child; the offset is in caret stops of that child.
    Child(usize),
}

/// A DOM-style boundary point.
///
/// For text and trigger children the offset counts `char`s. Atomic children
/// (mention tokens, line breaks) have two stops: `0` before and `1` after.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Boundary {
    pub node: NodePath,
    pub offset: usize,
}

impl Boundary {
    #[inline]
    pub const fn root(offset: usize) -> Self {
        Self {
            node: NodePath::Root,
            offset,
        }
    }

    #[inline]
    pub const fn child(index: usize, offset: usize) -> Self {
        Self {
            node: NodePath::Child(index),
            offset,
        }
    }

    /// Child index this point addresses, if it is not a container point.
    pub fn child_index(&self) -> Option<usize> {
        match self.node {
            NodePath::Root => None,
            NodePath::Child(i) => Some(i),
        }
    }
}

/// Anchor/focus pair. The anchor is where the selection started; the focus
/// is where it currently ends, and may come before the anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Selection {
    pub anchor: Boundary,
    pub focus: Boundary,
}

impl Selection {
    pub const fn new(anchor: Boundary, focus: Boundary) -> Self {
        Self { anchor, focus }
    }

    pub const fn collapsed(at: Boundary) -> Self {
        Self {
            anchor: at,
            focus: at,
        }
    }

    /// Structural equality of anchor and focus. Two distinct boundaries can
    /// still denote the same caret position; use
    /// [`Surface::is_collapsed`](crate::Surface::is_collapsed) for that.
    #[inline]
    pub fn is_caret(&self) -> bool {
        self.anchor == self.focus
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::collapsed(Boundary::root(0))
    }
}
