//! Render instructions: what the host has to change on screen.

use crate::config::MentionsConfig;
use crate::dropdown::{DropdownState, Mode};
use crate::option::MentionOption;
use crate::position::PanelGeometry;
use input_core::Selection;

#[derive(Clone, Debug, PartialEq)]
pub enum RenderInstruction {
    /// Create the container and the surface with initial markup.
    Mount {
        container_class: String,
        surface_class: String,
        markup: String,
    },
    /// Replace the surface markup.
    Content { markup: String },
    Selection(Selection),
    Focused(bool),
    Disabled(bool),
    Readonly(bool),
    DropdownOpen(DropdownView),
    DropdownUpdate(DropdownView),
    DropdownPosition(PanelGeometry),
    ScrollIntoView(usize),
    DropdownClose,
    Statistics(String),
    Unmount,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionRow {
    pub index: usize,
    pub class: String,
    pub value: String,
    pub label: String,
    /// Row markup: the custom renderer's output or the escaped label.
    pub content: String,
    pub active: bool,
    pub disabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropdownView {
    pub class: String,
    pub mode: Mode,
    pub loading: bool,
    pub filter: String,
    pub rows: Vec<OptionRow>,
}

impl DropdownView {
    /// No rows and nothing loading: the host shows the empty state.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && !self.loading
    }
}

pub fn dropdown_view(state: &DropdownState, current: &[MentionOption], config: &MentionsConfig) -> DropdownView {
    let classes = config.classes();
    let mut class = classes.dropdown.clone();
    if state.mode == Mode::Multiple {
        class.push(' ');
        class.push_str(&classes.dropdown_multiple_mode);
    }

    let rows = if state.loading {
        Vec::new()
    } else {
        current
            .iter()
            .enumerate()
            .map(|(index, option)| {
                let active = state.is_selected(index);
                let mut row_class = classes.dropdown_list_option.clone();
                if active {
                    row_class.push(' ');
                    row_class.push_str(&classes.dropdown_list_option_active);
                }
                if option.disabled {
                    row_class.push(' ');
                    row_class.push_str(&classes.dropdown_list_option_disabled);
                }
                let content = match &config.option_render {
                    Some(f) => f(option, index),
                    None => {
                        let mut out = String::new();
                        html::escape_text_into(&mut out, &option.label);
                        out
                    }
                };
                OptionRow {
                    index,
                    class: row_class,
                    value: option.value.clone(),
                    label: option.label.clone(),
                    content,
                    active,
                    disabled: option.disabled,
                }
            })
            .collect()
    };

    DropdownView {
        class,
        mode: state.mode,
        loading: state.loading,
        filter: state.filter.clone(),
        rows,
    }
}
