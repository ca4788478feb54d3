//! The widget instance: owns the surface, the dropdown session and the
//! configuration, and exposes the instance API.
//!
//! Input arrives through [`Mentions::handle_event`] and
//! [`Mentions::handle_dropdown_event`] (see `editing.rs`); output leaves as
//! [`RenderInstruction`]s and as events on the subscription surface.

use crate::codec;
use crate::config::{FetchFuture, MentionsConfig};
use crate::dropdown::{Action, CloseReason, DropdownState, Effect};
use crate::error::{FetchError, SetError};
use crate::events::{EventKind, MentionsEvent};
use crate::layout::LayoutHost;
use crate::listeners::{DROPDOWN_HOOKS, ListenerRegistry, ListenerTarget, SURFACE_HOOKS};
use crate::option::{MentionOption, filter_options, normalize_options};
use crate::position::{apply_caps, clamp_to_surface, compute_position};
use crate::render::{RenderInstruction, dropdown_view};
use bus::Emitter;
use core_types::ListenerId;
use input_core::{SelectionSnapshot, Surface};
use serde_json::Value;
use std::str::FromStr;

/// Keys accepted by [`Mentions::set`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetKey {
    Value,
    Options,
    MaxLength,
    Disabled,
    Readonly,
}

impl FromStr for SetKey {
    type Err = SetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "value" => Ok(SetKey::Value),
            "options" => Ok(SetKey::Options),
            "max-length" | "maxLength" => Ok(SetKey::MaxLength),
            "disabled" => Ok(SetKey::Disabled),
            "readonly" => Ok(SetKey::Readonly),
            other => Err(SetError::UnknownKey(other.to_string())),
        }
    }
}

pub struct Mentions {
    pub(crate) config: MentionsConfig,
    pub(crate) surface: Surface,
    pub(crate) value: String,
    pub(crate) mentions: Vec<MentionOption>,
    local_options: Vec<MentionOption>,
    remote_options: Vec<MentionOption>,
    pub(crate) dropdown: DropdownState,
    pub(crate) record: SelectionSnapshot,
    pub(crate) listeners: ListenerRegistry,
    emitter: Emitter<EventKind, MentionsEvent>,
    host: Option<Box<dyn LayoutHost>>,
    pending_fetch: Option<FetchFuture>,
    fetch_calls: usize,
    pub(crate) disabled: bool,
    pub(crate) readonly: bool,
    pub(crate) max_length: usize,
    pub(crate) focused: bool,
    pub(crate) composing: bool,
    mounted: bool,
    instructions: Vec<RenderInstruction>,
}

impl Mentions {
    /// Creates an unmounted widget. With a remote supplier in immediate
    /// mode, the fetch starts here.
    pub fn new(config: MentionsConfig) -> Self {
        let surface = codec::render(config.initial_value(), &config);
        let value = codec::encode_surface(&surface, &config);
        let mentions = codec::scan_mentions(&value, &config);
        let local_options = normalize_options(
            &config.options,
            &config.label_field_name,
            &config.value_field_name,
        );
        let mut widget = Self {
            disabled: config.disabled,
            readonly: config.readonly,
            max_length: config.max_length,
            config,
            surface,
            value,
            mentions,
            local_options,
            remote_options: Vec::new(),
            dropdown: DropdownState::default(),
            record: SelectionSnapshot::default(),
            listeners: ListenerRegistry::new(),
            emitter: Emitter::new(),
            host: None,
            pending_fetch: None,
            fetch_calls: 0,
            focused: false,
            composing: false,
            mounted: false,
            instructions: Vec::new(),
        };
        if widget.config.has_remote_options() && widget.config.is_immediate() {
            widget.apply_dropdown(Action::FetchStarted);
            widget.start_fetch();
        }
        widget
    }

    pub fn config(&self) -> &MentionsConfig {
        &self.config
    }

    /// The current canonical value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Mentions referenced by the current value.
    pub fn mentions(&self) -> &[MentionOption] {
        &self.mentions
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn dropdown(&self) -> &DropdownState {
        &self.dropdown
    }

    pub fn is_open(&self) -> bool {
        self.dropdown.visible
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    /// How many times the remote supplier has been called.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls
    }

    pub fn take_render_instructions(&mut self) -> Vec<RenderInstruction> {
        std::mem::take(&mut self.instructions)
    }

    /// Options offered for the current filter.
    pub fn current_options(&self) -> Vec<MentionOption> {
        let source = if self.config.has_remote_options() {
            &self.remote_options
        } else {
            &self.local_options
        };
        filter_options(source, &self.dropdown.filter, self.config.filter_option.as_ref())
    }

    /// Attaches the widget to its host. A second call is a no-op and
    /// returns `false`.
    pub fn mount(&mut self, host: Box<dyn LayoutHost>) -> bool {
        if self.mounted {
            log::debug!(target: "mentions.widget", "mount ignored: already mounted");
            return false;
        }
        self.mounted = true;
        self.host = Some(host);
        for hook in SURFACE_HOOKS {
            self.listeners.attach(ListenerTarget::Surface, hook);
        }
        let classes = self.config.classes();
        self.instructions.push(RenderInstruction::Mount {
            container_class: classes.container.clone(),
            surface_class: classes.input.clone(),
            markup: self.surface.to_markup(),
        });
        if self.disabled {
            self.instructions.push(RenderInstruction::Disabled(true));
        }
        if self.readonly {
            self.instructions.push(RenderInstruction::Readonly(true));
        }
        self.push_statistics();
        log::debug!(target: "mentions.widget", "mounted");
        true
    }

    /// Closes the dropdown, releases every listener and drops subscribers.
    pub fn destroy(&mut self) {
        if !self.mounted {
            return;
        }
        self.hide(CloseReason::Reset);
        if self.dropdown.loading {
            // A result that arrives later is rejected as not in flight.
            log::debug!(target: "mentions.fetch", "fetch abandoned on destroy");
            self.apply_dropdown(Action::FetchFinished { ok: false });
        }
        for target in [
            ListenerTarget::Surface,
            ListenerTarget::Dropdown,
            ListenerTarget::Document,
            ListenerTarget::Observer,
        ] {
            self.listeners.detach_target(target);
        }
        self.pending_fetch = None;
        self.emitter.clear();
        self.host = None;
        self.mounted = false;
        self.instructions.push(RenderInstruction::Unmount);
        log::debug!(target: "mentions.widget", "destroyed");
    }

    pub fn on(&mut self, kind: EventKind, callback: impl FnMut(&MentionsEvent) + 'static) -> ListenerId {
        self.emitter.on(kind, callback)
    }

    pub fn once(&mut self, kind: EventKind, callback: impl FnMut(&MentionsEvent) + 'static) -> ListenerId {
        self.emitter.once(kind, callback)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.emitter.off(id)
    }

    /// Removes every subscriber of `kind`.
    pub fn off_kind(&mut self, kind: EventKind) {
        self.emitter.off_kind(kind);
    }

    pub fn clear(&mut self) {
        self.emitter.clear();
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.emitter.count(kind)
    }

    /// Changes one of the runtime-settable keys.
    ///
    /// Setting the value replaces the content and emits `mentions-change`
    /// when the referenced mentions differ; it does not emit `change`.
    pub fn set(&mut self, key: SetKey, value: Value) -> Result<(), SetError> {
        match key {
            SetKey::Value => {
                let v = value.as_str().ok_or(SetError::WrongType {
                    key: "value",
                    expected: "a string",
                })?;
                self.hide(CloseReason::Reset);
                self.surface = codec::render(v, &self.config);
                self.value = codec::encode_surface(&self.surface, &self.config);
                self.push_surface();
                self.refresh_mentions();
                self.push_statistics();
            }
            SetKey::Options => {
                let records = value.as_array().ok_or(SetError::WrongType {
                    key: "options",
                    expected: "an array of records",
                })?;
                self.hide(CloseReason::Reset);
                self.local_options = normalize_options(
                    records,
                    &self.config.label_field_name,
                    &self.config.value_field_name,
                );
                if self.config.has_remote_options() {
                    self.remote_options.clear();
                    self.dropdown.fetched = false;
                }
            }
            SetKey::MaxLength => {
                let n = value.as_u64().ok_or(SetError::WrongType {
                    key: "max-length",
                    expected: "a non-negative integer",
                })?;
                self.max_length = usize::try_from(n).unwrap_or(usize::MAX);
            }
            SetKey::Disabled | SetKey::Readonly => {
                let flag = value.as_bool().ok_or(SetError::WrongType {
                    key: if key == SetKey::Disabled { "disabled" } else { "readonly" },
                    expected: "a boolean",
                })?;
                if flag {
                    self.hide(CloseReason::Reset);
                }
                if key == SetKey::Disabled {
                    self.disabled = flag;
                    self.instructions.push(RenderInstruction::Disabled(flag));
                } else {
                    self.readonly = flag;
                    self.instructions.push(RenderInstruction::Readonly(flag));
                }
            }
        }
        log::debug!(target: "mentions.widget", "set {key:?}");
        Ok(())
    }

    /// Hands the in-flight options fetch to the host, which awaits it and
    /// reports back through [`Mentions::finish_fetch`].
    pub fn take_pending_fetch(&mut self) -> Option<FetchFuture> {
        self.pending_fetch.take()
    }

    /// Applies a completed fetch.
    ///
    /// The options are cached whether or not the dropdown is still open; the
    /// list is only redrawn and repositioned when it is.
    pub fn finish_fetch(&mut self, result: Result<Vec<Value>, FetchError>) -> Result<(), FetchError> {
        if !self.dropdown.loading {
            return Err(FetchError::NotInFlight);
        }
        match result {
            Ok(records) => {
                self.remote_options = normalize_options(
                    &records,
                    &self.config.label_field_name,
                    &self.config.value_field_name,
                );
                log::debug!(
                    target: "mentions.fetch",
                    "fetched {} option(s); visible={}",
                    self.remote_options.len(),
                    self.dropdown.visible
                );
                self.apply_dropdown(Action::FetchFinished { ok: true });
                Ok(())
            }
            Err(e) => {
                log::warn!(target: "mentions.fetch", "{e}");
                self.apply_dropdown(Action::FetchFinished { ok: false });
                Err(e)
            }
        }
    }

    fn start_fetch(&mut self) {
        let Some(fetch) = self.config.options_fetch_api.clone() else {
            return;
        };
        self.fetch_calls += 1;
        self.pending_fetch = Some(fetch());
        log::debug!(target: "mentions.fetch", "fetch #{} started", self.fetch_calls);
    }

    /// Runs one dropdown transition and carries out its effects.
    pub(crate) fn apply_dropdown(&mut self, action: Action) {
        let current = self.current_options();
        let (next, effects) = self.dropdown.apply(action, &current);
        self.dropdown = next;
        for effect in effects {
            match effect {
                Effect::Redraw => {
                    if self.dropdown.visible {
                        let view = dropdown_view(&self.dropdown, &self.current_options(), &self.config);
                        self.instructions.push(RenderInstruction::DropdownUpdate(view));
                        self.reposition(false);
                    }
                }
                Effect::Fetch => self.start_fetch(),
                Effect::ScrollIntoView(i) => self.instructions.push(RenderInstruction::ScrollIntoView(i)),
                Effect::Submit(picked) => self.submit(&picked, &current),
                Effect::Close(reason) => self.hide(reason),
                Effect::Opened => {
                    for (target, hook) in DROPDOWN_HOOKS {
                        self.listeners.attach(target, hook);
                    }
                    let view = dropdown_view(&self.dropdown, &self.current_options(), &self.config);
                    self.instructions.push(RenderInstruction::DropdownOpen(view));
                    self.reposition(false);
                    log::debug!(target: "mentions.dropdown", "opened");
                    self.emit(MentionsEvent::Open);
                }
                Effect::Closed => {
                    for target in [ListenerTarget::Dropdown, ListenerTarget::Document, ListenerTarget::Observer] {
                        self.listeners.detach_target(target);
                    }
                    self.instructions.push(RenderInstruction::DropdownClose);
                    log::debug!(target: "mentions.dropdown", "closed");
                    self.emit(MentionsEvent::Close);
                }
            }
        }
    }

    /// Places the dropdown under the trigger placeholder. While scrolling a
    /// textarea the panel is also kept within the surface.
    pub(crate) fn reposition(&mut self, scrolling: bool) {
        let Some(host) = &self.host else { return };
        let Some(anchor) = host.trigger_rect() else {
            log::trace!(target: "mentions.position", "trigger not laid out; skipping");
            return;
        };
        let mut placement = compute_position(anchor, host.panel_size(), host.viewport());
        if scrolling {
            placement = clamp_to_surface(placement, host.surface_rect());
        }
        let geometry = apply_caps(
            placement,
            self.config.dropdown_max_width,
            self.config.dropdown_max_height,
        );
        self.instructions.push(RenderInstruction::DropdownPosition(geometry));
    }

    pub(crate) fn push(&mut self, instruction: RenderInstruction) {
        self.instructions.push(instruction);
    }

    pub(crate) fn push_surface(&mut self) {
        self.instructions.push(RenderInstruction::Content {
            markup: self.surface.to_markup(),
        });
        self.instructions
            .push(RenderInstruction::Selection(self.surface.selection()));
    }

    pub(crate) fn push_statistics(&mut self) {
        if let Some(f) = &self.config.show_statistics {
            let line = f(&self.mentions);
            self.instructions.push(RenderInstruction::Statistics(line));
        }
    }

    pub(crate) fn emit(&mut self, event: MentionsEvent) {
        let n = self.emitter.emit(event.kind(), &event);
        log::trace!(target: "mentions.widget", "{:?} delivered to {n} subscriber(s)", event.kind());
    }

    /// Re-scans the value and emits `mentions-change` when the list differs.
    pub(crate) fn refresh_mentions(&mut self) {
        let mentions = codec::scan_mentions(&self.value, &self.config);
        if mentions != self.mentions {
            let previous = std::mem::replace(&mut self.mentions, mentions.clone());
            self.emit(MentionsEvent::MentionsChange { mentions, previous });
        }
    }
}

impl std::fmt::Debug for Mentions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mentions")
            .field("value", &self.value)
            .field("dropdown", &self.dropdown)
            .field("mounted", &self.mounted)
            .field("listeners", &self.listeners.total())
            .finish_non_exhaustive()
    }
}
