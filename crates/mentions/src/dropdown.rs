//! Dropdown state machine.
//!
//! [`DropdownState::apply`] is pure: it takes the current option list and an
//! [`Action`] and returns the next state plus the [`Effect`]s the widget has
//! to carry out. Nothing here touches the surface or the host.

use crate::option::MentionOption;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// One pick submits immediately.
    #[default]
    Single,
    /// Picks toggle; the header button submits them all.
    Multiple,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseReason {
    /// Cancel button, or a caret key that leaves the trigger.
    Cancelled,
    /// Backspace with an empty filter.
    TriggerDeleted,
    /// Options were inserted.
    Submitted,
    /// Click elsewhere on the editor.
    EditorClick,
    /// Click outside editor and dropdown.
    OutsideClick,
    /// Content, options or disabled/readonly state changed underneath.
    Reset,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Open with a fresh filter. `remote` says whether options come from the
    /// remote supplier.
    Show { remote: bool },
    Hide,
    FilterPush(char),
    FilterPop,
    Navigate(Direction),
    Hover(usize),
    Press(usize),
    /// Enter.
    Submit,
    CancelButton,
    MultipleButton,
    FetchStarted,
    FetchFinished { ok: bool },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// List, selection, mode or loading changed.
    Redraw,
    /// Start a remote fetch.
    Fetch,
    ScrollIntoView(usize),
    /// Insert these options (indices into the current list, list order).
    Submit(Vec<usize>),
    /// The widget should close the dropdown.
    Close(CloseReason),
    Opened,
    Closed,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DropdownState {
    pub visible: bool,
    pub filter: String,
    pub mode: Mode,
    /// Highlighted (single) or ticked (multiple) indices into the current list.
    pub selected: Vec<usize>,
    pub loading: bool,
    pub fetched: bool,
}

impl DropdownState {
    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn apply(&self, action: Action, current: &[MentionOption]) -> (DropdownState, Vec<Effect>) {
        let mut next = self.clone();
        let mut effects = Vec::new();
        match action {
            Action::Show { remote } => {
                next.visible = true;
                next.filter.clear();
                next.selected.clear();
                next.mode = Mode::Single;
                if remote && !next.fetched && !next.loading {
                    next.loading = true;
                    effects.push(Effect::Fetch);
                }
                effects.push(Effect::Opened);
            }
            Action::Hide => {
                if self.visible {
                    next.visible = false;
                    next.filter.clear();
                    next.selected.clear();
                    next.mode = Mode::Single;
                    effects.push(Effect::Closed);
                }
            }
            _ if !self.visible => {
                if let Action::FetchStarted = action {
                    next.loading = true;
                } else if let Action::FetchFinished { ok } = action {
                    next.loading = false;
                    next.fetched = ok;
                }
            }
            Action::FilterPush(c) => {
                next.filter.push(c);
                next.selected.clear();
                effects.push(Effect::Redraw);
            }
            Action::FilterPop => {
                if next.filter.pop().is_some() {
                    next.selected.clear();
                    effects.push(Effect::Redraw);
                } else {
                    effects.push(Effect::Close(CloseReason::TriggerDeleted));
                }
            }
            Action::Navigate(dir) => {
                if self.mode == Mode::Single
                    && let Some(i) = step(current, self.selected.first().copied(), dir)
                {
                    next.selected = vec![i];
                    effects.push(Effect::Redraw);
                    effects.push(Effect::ScrollIntoView(i));
                }
            }
            Action::Hover(i) => {
                if self.mode == Mode::Single && selectable(current, i) && self.selected != [i] {
                    next.selected = vec![i];
                    effects.push(Effect::Redraw);
                }
            }
            Action::Press(i) => {
                if selectable(current, i) {
                    match self.mode {
                        Mode::Single => {
                            next.selected = vec![i];
                            effects.push(Effect::Redraw);
                            effects.push(Effect::Submit(vec![i]));
                        }
                        Mode::Multiple => {
                            if let Some(pos) = next.selected.iter().position(|&s| s == i) {
                                next.selected.remove(pos);
                            } else {
                                next.selected.push(i);
                            }
                            effects.push(Effect::Redraw);
                        }
                    }
                }
            }
            Action::Submit => {
                if let Some(picked) = submission(current, &self.selected) {
                    effects.push(Effect::Submit(picked));
                }
            }
            Action::CancelButton => match self.mode {
                Mode::Single => effects.push(Effect::Close(CloseReason::Cancelled)),
                Mode::Multiple => {
                    next.mode = Mode::Single;
                    next.selected.clear();
                    effects.push(Effect::Redraw);
                }
            },
            Action::MultipleButton => match self.mode {
                Mode::Single => {
                    next.mode = Mode::Multiple;
                    next.selected.clear();
                    effects.push(Effect::Redraw);
                }
                Mode::Multiple => {
                    if let Some(picked) = submission(current, &self.selected) {
                        effects.push(Effect::Submit(picked));
                    }
                }
            },
            Action::FetchStarted => {
                next.loading = true;
                effects.push(Effect::Redraw);
            }
            Action::FetchFinished { ok } => {
                next.loading = false;
                next.fetched = ok;
                next.selected.clear();
                effects.push(Effect::Redraw);
            }
        }
        log::trace!(target: "mentions.dropdown", "{:?} -> {:?}", self, effects);
        (next, effects)
    }
}

fn selectable(current: &[MentionOption], i: usize) -> bool {
    current.get(i).is_some_and(|o| !o.disabled)
}

/// Valid selected indices in list order, or `None` when nothing is left.
fn submission(current: &[MentionOption], selected: &[usize]) -> Option<Vec<usize>> {
    let mut picked: Vec<usize> = selected
        .iter()
        .copied()
        .filter(|&i| selectable(current, i))
        .collect();
    picked.sort_unstable();
    picked.dedup();
    (!picked.is_empty()).then_some(picked)
}

/// Next enabled index in `dir`, wrapping at both ends. Without a current
/// index, Down lands on the first enabled option and Up on the last.
fn step(current: &[MentionOption], from: Option<usize>, dir: Direction) -> Option<usize> {
    let len = current.len();
    if len == 0 {
        return None;
    }
    let candidates: Box<dyn Iterator<Item = usize>> = match (from, dir) {
        (None, Direction::Down) => Box::new(0..len),
        (None, Direction::Up) => Box::new((0..len).rev()),
        (Some(i), Direction::Down) => Box::new((1..=len).map(move |d| (i + d) % len)),
        (Some(i), Direction::Up) => Box::new((1..=len).map(move |d| (i + len - d % len) % len)),
    };
    candidates.into_iter().find(|&j| !current[j].disabled)
}
