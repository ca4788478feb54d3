//! Host-to-widget input events and widget-to-subscriber notifications.

use crate::option::MentionOption;
use input_core::Selection;

/// The `inputType` of a before-input event, reduced to what the widget
/// distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    InsertText,
    InsertFromPaste,
    InsertReplacementText,
    InsertCompositionText,
    InsertLineBreak,
    InsertParagraph,
    DeleteContentBackward,
    DeleteContentForward,
    DeleteByCut,
    /// Anything else (formatting, history, drag and drop).
    Other,
}

impl InputKind {
    pub fn inserts(self) -> bool {
        matches!(
            self,
            InputKind::InsertText
                | InputKind::InsertFromPaste
                | InputKind::InsertReplacementText
                | InputKind::InsertCompositionText
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
}

/// Raw events the host forwards from the editable surface.
///
/// The widget performs the default action itself; the host must not apply
/// an edit the widget reports as handled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditorEvent {
    BeforeInput { kind: InputKind, data: Option<String> },
    KeyDown(Key),
    MouseDown,
    /// Mouse released; carries the selection the press produced.
    MouseUp(Selection),
    /// The caret or selection moved by other means (keyboard navigation).
    SelectionChange(Selection),
    Click,
    Scroll,
    Focus,
    Blur,
    CompositionStart,
    CompositionEnd(String),
}

/// Raw events the host forwards from the dropdown panel and the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropdownEvent {
    OptionHover(usize),
    OptionPress(usize),
    CancelButton,
    MultipleButton,
    /// A click that hit neither the editor nor the dropdown.
    OutsideClick,
    /// The observer reports the active option outside the visible list.
    ActiveOptionObscured,
}

/// Whether the host should suppress its own default handling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    pub prevent_default: bool,
}

impl Outcome {
    pub const IGNORED: Outcome = Outcome {
        prevent_default: false,
    };
    pub const HANDLED: Outcome = Outcome {
        prevent_default: true,
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Change,
    Open,
    Close,
    MentionsChange,
}

/// Payload delivered to subscribers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MentionsEvent {
    Change { value: String, previous: String },
    Open,
    Close,
    MentionsChange {
        mentions: Vec<MentionOption>,
        previous: Vec<MentionOption>,
    },
}

impl MentionsEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            MentionsEvent::Change { .. } => EventKind::Change,
            MentionsEvent::Open => EventKind::Open,
            MentionsEvent::Close => EventKind::Close,
            MentionsEvent::MentionsChange { .. } => EventKind::MentionsChange,
        }
    }
}
