//! Geometry queries the widget makes of its host.

use core_types::{Rectangle, Size};

pub trait LayoutHost {
    fn viewport(&self) -> Size;

    /// Bounding box of the trigger placeholder, if it is laid out.
    fn trigger_rect(&self) -> Option<Rectangle>;

    /// Natural size of the dropdown panel with its current content.
    fn panel_size(&self) -> Size;

    /// Bounding box of the editable surface.
    fn surface_rect(&self) -> Rectangle;
}

/// A host with fixed geometry. Useful headless and in tests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedLayout {
    pub viewport: Size,
    pub trigger: Option<Rectangle>,
    pub panel: Size,
    pub surface: Rectangle,
}

impl Default for FixedLayout {
    fn default() -> Self {
        Self {
            viewport: Size::new(1024.0, 768.0),
            trigger: Some(Rectangle::new(0.0, 0.0, 10.0, 20.0)),
            panel: Size::new(240.0, 200.0),
            surface: Rectangle::new(0.0, 0.0, 400.0, 40.0),
        }
    }
}

impl LayoutHost for FixedLayout {
    fn viewport(&self) -> Size {
        self.viewport
    }

    fn trigger_rect(&self) -> Option<Rectangle> {
        self.trigger
    }

    fn panel_size(&self) -> Size {
        self.panel
    }

    fn surface_rect(&self) -> Rectangle {
        self.surface
    }
}
