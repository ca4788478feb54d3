//! Small value types shared between the editing core and the widget layer.
//!
//! Geometry is expressed in CSS px. Origin is the viewport's top-left corner,
//! `y` grows downwards.

/// Identifier handed out by the listener registry and the event emitter.
pub type ListenerId = u64;

/// A rectangle in CSS px units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rectangle {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Width/height pair, used for the viewport and for unplaced panels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Kind of editable surface. Only affects line-break handling and scroll
/// repositioning.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EditorKind {
    /// Single-line surface; Enter never inserts a line break.
    #[default]
    Input,
    /// Multi-line surface; Enter inserts a line break.
    Textarea,
}

impl EditorKind {
    pub fn is_multiline(self) -> bool {
        matches!(self, EditorKind::Textarea)
    }
}
