//! Dropdown placement relative to the trigger placeholder.

use core_types::{Rectangle, Size};

/// Where the dropdown goes and how much room it has.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelPlacement {
    pub x: f32,
    pub y: f32,
    pub available_width: f32,
    pub available_height: f32,
}

/// Final geometry handed to the host, after applying configured caps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelGeometry {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub max_width: f32,
    pub max_height: f32,
}

/// Places a panel of natural size `panel` under `anchor`.
///
/// Shifted left when it would overflow the right edge. When there is no
/// room below, it flips above the anchor; when neither side fits, it takes
/// the side with strictly more space and shrinks to that space.
pub fn compute_position(anchor: Rectangle, panel: Size, viewport: Size) -> PanelPlacement {
    let available_width = viewport.width.min(panel.width).max(0.0);
    let mut available_height = viewport.height.min(panel.height).max(0.0);

    let x = if anchor.left() + available_width > viewport.width {
        viewport.width - available_width
    } else {
        anchor.left()
    };

    let mut y = anchor.bottom();
    if anchor.bottom() + panel.height > viewport.height {
        if anchor.top() - panel.height < 0.0 {
            let above = anchor.top();
            let below = viewport.height - anchor.bottom();
            if above > below {
                available_height = above.max(0.0);
                y = 0.0;
            } else {
                available_height = below.max(0.0);
            }
        } else {
            y = anchor.top() - available_height;
        }
    }

    PanelPlacement {
        x,
        y,
        available_width,
        available_height,
    }
}

/// Keeps the panel's top edge within the editor while it scrolls.
pub fn clamp_to_surface(placement: PanelPlacement, surface: Rectangle) -> PanelPlacement {
    PanelPlacement {
        y: placement.y.clamp(surface.top(), surface.bottom().max(surface.top())),
        ..placement
    }
}

/// Applies the configured maximum sizes; an unset cap falls back to the
/// available space.
pub fn apply_caps(p: PanelPlacement, max_width: Option<f32>, max_height: Option<f32>) -> PanelGeometry {
    let max_width = max_width.unwrap_or(p.available_width);
    let max_height = max_height.unwrap_or(p.available_height);
    PanelGeometry {
        left: p.x,
        top: p.y,
        width: p.available_width.min(max_width),
        height: p.available_height.min(max_height),
        max_width,
        max_height,
    }
}
