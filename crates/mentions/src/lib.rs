//! Mentions widget engine.
//!
//! A [`Mentions`] instance owns an editable [`input_core::Surface`], a
//! dropdown session and its configuration. The host forwards raw editor and
//! dropdown events, drains [`RenderInstruction`]s, and subscribes to
//! `change`, `open`, `close` and `mentions-change`.

pub mod codec;
mod config;
mod dropdown;
mod editing;
mod error;
mod events;
mod layout;
mod listeners;
mod option;
pub mod position;
mod render;
mod widget;

pub use codec::{Segment, decode, encode, encode_surface, mention_length, render, scan_mentions, value_length};
pub use config::{
    ConfigFile, DomClasses, FetchFn, FetchFuture, FilterFn, Formatter, KindName, LengthFn, MarkerFn,
    MentionsConfig, MentionsConfigBuilder, OptionRenderFn, StatisticsFn,
};
pub use dropdown::{Action, CloseReason, Direction, DropdownState, Effect, Mode};
pub use error::{ConfigError, FetchError, SetError};
pub use events::{DropdownEvent, EditorEvent, EventKind, InputKind, Key, MentionsEvent, Outcome};
pub use layout::{FixedLayout, LayoutHost};
pub use listeners::{Hook, ListenerRegistry, ListenerTarget};
pub use option::{MentionOption, filter_options, normalize_options};
pub use position::{PanelGeometry, PanelPlacement, compute_position};
pub use render::{DropdownView, OptionRow, RenderInstruction, dropdown_view};
pub use widget::{Mentions, SetKey};

pub use core_types::{EditorKind, ListenerId, Rectangle, Size};
