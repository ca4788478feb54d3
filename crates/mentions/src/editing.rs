//! Event coordination: routes host events through the pre-insertion check,
//! the default edit and the post-insertion check, and drives the dropdown.

use crate::codec;
use crate::dropdown::{Action, CloseReason, Direction};
use crate::events::{DropdownEvent, EditorEvent, InputKind, Key, MentionsEvent, Outcome};
use crate::listeners::{Hook, ListenerTarget};
use crate::option::MentionOption;
use crate::render::RenderInstruction;
use crate::widget::Mentions;
use input_core::{
    Boundary, Selection, Surface, SurfaceNode, TriggerPlaceholder, capture_selection, char_len,
    filter_single_line, is_after, mention_at, normalize_newlines, restore_selection,
};

fn hook_of(event: &EditorEvent) -> (ListenerTarget, Hook) {
    let hook = match event {
        EditorEvent::BeforeInput { .. } => Hook::BeforeInput,
        EditorEvent::KeyDown(_) => Hook::KeyDown,
        EditorEvent::MouseDown => Hook::MouseDown,
        EditorEvent::MouseUp(_) => return (ListenerTarget::Document, Hook::MouseUp),
        EditorEvent::SelectionChange(_) => Hook::SelectionChange,
        EditorEvent::Click => Hook::Click,
        EditorEvent::Scroll => Hook::Scroll,
        EditorEvent::Focus => Hook::Focus,
        EditorEvent::Blur => Hook::Blur,
        EditorEvent::CompositionStart | EditorEvent::CompositionEnd(_) => Hook::Composition,
    };
    (ListenerTarget::Surface, hook)
}

/// Inserts plain text at the caret; in a multi-line surface `\n` becomes a
/// line break.
fn insert_plain(surface: &mut Surface, text: &str, multiline: bool) {
    if !multiline {
        surface.insert_text(text);
        return;
    }
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            surface.insert_line_break();
        }
        surface.insert_text(line);
    }
}

impl Mentions {
    fn editable(&self) -> bool {
        !self.disabled && !self.readonly
    }

    /// Whether inserting `extra` units at the caret stays under the length
    /// limit. A selected range is replaced by the insertion, so its weight
    /// is not counted.
    fn fits(&self, extra: usize) -> bool {
        if self.max_length == 0 {
            return true;
        }
        let base = if self.surface.is_collapsed() {
            codec::value_length(&self.value, &self.config)
        } else {
            let mut rest = self.surface.clone();
            rest.delete_selection();
            codec::value_length(&codec::encode_surface(&rest, &self.config), &self.config)
        };
        base + extra <= self.max_length
    }

    /// Handles one event from the editable surface.
    ///
    /// Events for hooks that are not attached (before mount, after destroy,
    /// or a mouse-up without a press) are ignored.
    pub fn handle_event(&mut self, event: EditorEvent) -> Outcome {
        let (target, hook) = hook_of(&event);
        if !self.listeners.is_attached(target, hook) {
            log::trace!(target: "mentions.events", "ignored {event:?}: {target:?}/{hook:?} not attached");
            return Outcome::IGNORED;
        }
        match event {
            EditorEvent::BeforeInput { kind, data } => self.before_input(kind, data.as_deref().unwrap_or("")),
            EditorEvent::KeyDown(key) => self.key_down(key),
            EditorEvent::MouseDown => {
                self.listeners.attach(ListenerTarget::Document, Hook::MouseUp);
                Outcome::IGNORED
            }
            EditorEvent::MouseUp(selection) => {
                self.listeners.detach(ListenerTarget::Document, Hook::MouseUp);
                self.select_atomic(selection);
                Outcome::IGNORED
            }
            EditorEvent::SelectionChange(selection) => {
                self.surface.set_selection(selection);
                Outcome::IGNORED
            }
            EditorEvent::Click => {
                if self.dropdown.visible {
                    self.hide(CloseReason::EditorClick);
                }
                Outcome::IGNORED
            }
            EditorEvent::Scroll => {
                if self.dropdown.visible && self.config.kind().is_multiline() {
                    self.reposition(true);
                }
                Outcome::IGNORED
            }
            EditorEvent::Focus => {
                self.focused = true;
                self.record = capture_selection(&self.surface);
                self.push(RenderInstruction::Focused(true));
                Outcome::IGNORED
            }
            EditorEvent::Blur => {
                self.focused = false;
                self.push(RenderInstruction::Focused(false));
                Outcome::IGNORED
            }
            EditorEvent::CompositionStart => {
                self.composing = true;
                Outcome::IGNORED
            }
            EditorEvent::CompositionEnd(text) => {
                self.composing = false;
                self.before_input(InputKind::InsertText, &text)
            }
        }
    }

    /// Handles one event from the dropdown panel or the document while the
    /// dropdown is open.
    pub fn handle_dropdown_event(&mut self, event: DropdownEvent) -> Outcome {
        let (target, hook) = match event {
            DropdownEvent::OptionHover(_) => (ListenerTarget::Dropdown, Hook::MouseOver),
            DropdownEvent::OptionPress(_) | DropdownEvent::CancelButton | DropdownEvent::MultipleButton => {
                (ListenerTarget::Dropdown, Hook::MouseDown)
            }
            DropdownEvent::OutsideClick => (ListenerTarget::Document, Hook::Click),
            DropdownEvent::ActiveOptionObscured => (ListenerTarget::Observer, Hook::Intersection),
        };
        if !self.listeners.is_attached(target, hook) {
            log::trace!(target: "mentions.events", "ignored {event:?}: dropdown listeners not attached");
            return Outcome::IGNORED;
        }
        match event {
            DropdownEvent::OptionHover(i) => self.apply_dropdown(Action::Hover(i)),
            DropdownEvent::OptionPress(i) => self.apply_dropdown(Action::Press(i)),
            DropdownEvent::CancelButton => self.apply_dropdown(Action::CancelButton),
            DropdownEvent::MultipleButton => self.apply_dropdown(Action::MultipleButton),
            DropdownEvent::OutsideClick => self.hide(CloseReason::OutsideClick),
            DropdownEvent::ActiveOptionObscured => {
                if let Some(&i) = self.dropdown.selected.first() {
                    self.push(RenderInstruction::ScrollIntoView(i));
                }
            }
        }
        // Presses must not move focus out of the editor.
        Outcome::HANDLED
    }

    fn key_down(&mut self, key: Key) -> Outcome {
        if self.dropdown.visible && self.listeners.is_attached(ListenerTarget::Document, Hook::KeyDown) {
            return match key {
                Key::ArrowUp => {
                    self.apply_dropdown(Action::Navigate(Direction::Up));
                    Outcome::HANDLED
                }
                Key::ArrowDown => {
                    self.apply_dropdown(Action::Navigate(Direction::Down));
                    Outcome::HANDLED
                }
                Key::Enter => {
                    self.apply_dropdown(Action::Submit);
                    Outcome::HANDLED
                }
                Key::ArrowLeft | Key::ArrowRight | Key::Home | Key::End | Key::Escape => {
                    self.hide(CloseReason::Cancelled);
                    Outcome {
                        prevent_default: key == Key::Escape,
                    }
                }
            };
        }
        match key {
            Key::Enter => {
                if self.editable() && self.config.kind().is_multiline() && self.fits(1) {
                    self.edit(|s| {
                        s.insert_line_break();
                    });
                }
                Outcome::HANDLED
            }
            _ => Outcome::IGNORED,
        }
    }

    fn before_input(&mut self, kind: InputKind, data: &str) -> Outcome {
        if !self.editable() {
            return Outcome::HANDLED;
        }
        if self.composing && kind == InputKind::InsertCompositionText {
            return Outcome::IGNORED;
        }
        if self.dropdown.visible {
            self.filter_input(kind, data);
            return Outcome::HANDLED;
        }

        let multiline = self.config.kind().is_multiline();
        match kind {
            InputKind::InsertText if data == self.config.prefix() => {
                if self.surface.trigger_index().is_some() {
                    log::debug!(target: "mentions.events", "trigger already present; ignored");
                } else if self.fits(1) {
                    self.open_trigger();
                }
            }
            k if k.inserts() => {
                let text = if multiline {
                    normalize_newlines(data).into_owned()
                } else {
                    filter_single_line(data).into_owned()
                };
                if !text.is_empty() && self.fits(char_len(&text)) {
                    self.edit(|s| insert_plain(s, &text, multiline));
                }
            }
            InputKind::InsertLineBreak | InputKind::InsertParagraph => {
                if multiline && self.fits(1) {
                    self.edit(|s| {
                        s.insert_line_break();
                    });
                }
            }
            InputKind::DeleteContentBackward => self.edit(|s| {
                s.delete_backward();
            }),
            InputKind::DeleteContentForward => self.edit(|s| {
                s.delete_forward();
            }),
            InputKind::DeleteByCut => self.edit(|s| {
                s.delete_selection();
            }),
            _ => {}
        }
        Outcome::HANDLED
    }

    /// Runs a default edit between a snapshot and the post-insertion length
    /// check. An edit that ends up over the limit and longer than before is
    /// rolled back; edits that shrink over-long content always go through.
    fn edit(&mut self, f: impl FnOnce(&mut Surface)) {
        self.record = capture_selection(&self.surface);
        f(&mut self.surface);
        if self.max_length > 0 {
            let before = codec::value_length(&self.value, &self.config);
            let value = codec::encode_surface(&self.surface, &self.config);
            let after = codec::value_length(&value, &self.config);
            if after > self.max_length && after > before {
                restore_selection(&mut self.surface, &self.record);
                log::debug!(target: "mentions.events", "edit exceeds max length {}; restored", self.max_length);
                self.push_surface();
                return;
            }
        }
        self.commit();
    }

    /// Inserts the trigger placeholder at the caret and opens the dropdown.
    fn open_trigger(&mut self) {
        self.record = capture_selection(&self.surface);
        let index = self
            .surface
            .insert_node(SurfaceNode::Trigger(TriggerPlaceholder::new(self.config.trigger())));
        self.caret_to_trigger_end(index);
        self.commit();
        self.apply_dropdown(Action::Show {
            remote: self.config.has_remote_options(),
        });
    }

    fn caret_to_trigger_end(&mut self, index: usize) {
        let len = self.surface.nodes().get(index).map_or(0, SurfaceNode::unit_len);
        self.surface.set_caret(Boundary::child(index, len));
    }

    /// Typing while the dropdown is open edits the filter, mirrored into the
    /// placeholder.
    fn filter_input(&mut self, kind: InputKind, data: &str) {
        match kind {
            k if k.inserts() => {
                let text = filter_single_line(data).into_owned();
                if text.is_empty() || !self.fits(char_len(&text)) {
                    return;
                }
                for c in text.chars() {
                    self.apply_dropdown(Action::FilterPush(c));
                }
                self.sync_trigger();
            }
            InputKind::DeleteContentBackward => {
                self.apply_dropdown(Action::FilterPop);
                if self.dropdown.visible {
                    self.sync_trigger();
                }
            }
            _ => {}
        }
    }

    fn sync_trigger(&mut self) {
        let text = format!("{}{}", self.config.trigger(), self.dropdown.filter);
        if !self.surface.set_trigger_text(&text) {
            return;
        }
        if let Some(index) = self.surface.trigger_index() {
            self.caret_to_trigger_end(index);
        }
        self.commit();
    }

    /// Closes the dropdown and disposes of the placeholder according to
    /// `reason`: deleted outright, or folded back into plain text. Only a
    /// click on the editor keeps the caret where the click put it.
    pub(crate) fn hide(&mut self, reason: CloseReason) {
        if !self.dropdown.visible {
            return;
        }
        if let Some(index) = self.surface.trigger_index() {
            match reason {
                CloseReason::TriggerDeleted => {
                    self.surface.remove_node(index);
                }
                CloseReason::EditorClick => {
                    self.surface.unwrap_placeholder(index);
                }
                _ => {
                    self.caret_to_trigger_end(index);
                    self.surface.unwrap_placeholder(index);
                }
            }
        }
        log::debug!(target: "mentions.dropdown", "hide: {reason:?}");
        self.apply_dropdown(Action::Hide);
        self.commit();
    }

    /// Replaces the placeholder with the picked options, in list order.
    /// Disabled options and options that would exceed the length limit are
    /// skipped.
    pub(crate) fn submit(&mut self, picked: &[usize], current: &[MentionOption]) {
        if let Some(index) = self.surface.trigger_index() {
            let start = self.surface.linear_offset(Boundary::root(index));
            self.surface.remove_node(index);
            let at = self.surface.boundary_at(start);
            self.surface.set_caret(at);
        }
        for &i in picked {
            let Some(option) = current.get(i) else { continue };
            if option.disabled {
                continue;
            }
            if self.max_length > 0 {
                let now = codec::value_length(&codec::encode_surface(&self.surface, &self.config), &self.config);
                let weight = codec::mention_length(option, &self.config);
                if now + weight > self.max_length {
                    log::debug!(
                        target: "mentions.events",
                        "skipping {:?}: {now} + {weight} exceeds {}",
                        option.label,
                        self.max_length
                    );
                    continue;
                }
            }
            let token = codec::token_for(option, &self.config);
            self.surface.insert_node(SurfaceNode::Mention(token));
        }
        self.hide(CloseReason::Submitted);
    }

    /// Expands a pointer selection so that no endpoint sits inside a token:
    /// the start moves before it, the end after it. A click inside a token
    /// selects the token.
    fn select_atomic(&mut self, selection: Selection) {
        let (start, end) = if is_after(&self.surface, selection.focus, selection.anchor) {
            (selection.focus, selection.anchor)
        } else {
            (selection.anchor, selection.focus)
        };
        let start = match mention_at(&self.surface, start) {
            Some(j) => Boundary::root(j),
            None => start,
        };
        let end = match mention_at(&self.surface, end) {
            Some(j) => Boundary::root(j + 1),
            None => end,
        };
        self.surface.set_selection(Selection::new(start, end));
        self.push(RenderInstruction::Selection(self.surface.selection()));
    }

    /// Re-derives the value from the surface and notifies subscribers when
    /// it changed.
    pub(crate) fn commit(&mut self) {
        self.push_surface();
        let value = codec::encode_surface(&self.surface, &self.config);
        if value == self.value {
            return;
        }
        let previous = std::mem::replace(&mut self.value, value.clone());
        self.emit(MentionsEvent::Change { value, previous });
        self.refresh_mentions();
        self.push_statistics();
    }
}
