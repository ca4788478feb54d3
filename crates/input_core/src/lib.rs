//! # input_core
//!
//! UI-agnostic editable surface for the mentions engine.
//!
//! This crate provides the building blocks below the widget layer:
//! - [`Surface`]: inline nodes (text, mention tokens, trigger placeholder,
//!   line breaks) plus a DOM-style [`Selection`]
//! - [`capture_selection`] / [`restore_selection`]: selection snapshots
//! - [`reconcile_after_removal`]: boundary mapping when an inline node goes away
//! - position and UTF-8 text helpers
//!
//! ## Design Principles
//!
//! Nothing here knows about a host UI. Markup is the only exchange format,
//! and it goes through the `html` crate.

mod position;
mod reconcile;
mod selection;
mod snapshot;
mod surface;
mod text;
mod token;

pub use position::{compare_order, is_after, is_empty_text, mention_at};
pub use reconcile::{Neighbor, Placement, Removal, placement, reconcile_after_removal};
pub use selection::{Boundary, NodePath, Selection};
pub use snapshot::{SelectionSnapshot, capture_selection, restore_selection};
pub use surface::{Surface, SurfaceNode};
pub use token::{MarkupClasses, MentionToken, TokenDisplay, TriggerPlaceholder, mention_attrs};

pub use text::{
    byte_index, char_len, clamp_to_char_boundary, filter_single_line, insert_at_char,
    normalize_newlines, remove_char_range, split_off_at_char,
};
