//! Widget configuration.
//!
//! A [`MentionsConfig`] is produced once by [`MentionsConfigBuilder::build`]
//! and is immutable afterwards; only the keys accepted by
//! [`Mentions::set`](crate::Mentions::set) change at runtime. Plain settings
//! can also be loaded from TOML or JSON through [`ConfigFile`].

use crate::error::{ConfigError, FetchError};
use crate::option::MentionOption;
use core_types::EditorKind;
use futures::future::LocalBoxFuture;
use input_core::MarkupClasses;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::rc::Rc;

pub const DEFAULT_PREFIX: &str = "@";
pub const DEFAULT_SUFFIX: &str = " ";
pub const DEFAULT_DROPDOWN_MAX_HEIGHT: f32 = 200.0;
pub const DEFAULT_CLASS_PREFIX: &str = "mentions__";

/// Weight of one mention towards the length limit.
pub type LengthFn = Rc<dyn Fn(&MentionOption) -> usize>;
/// Renders the statistics line from the current mentions.
pub type StatisticsFn = Rc<dyn Fn(&[MentionOption]) -> String>;
/// `(option, filter) -> keep`.
pub type FilterFn = Rc<dyn Fn(&MentionOption, &str) -> bool>;
/// Markup for one dropdown row: `(option, index) -> markup`.
pub type OptionRenderFn = Rc<dyn Fn(&MentionOption, usize) -> String>;
/// `(key, label) -> string`, used by both halves of a [`Formatter`].
pub type MarkerFn = Rc<dyn Fn(&str, &str) -> String>;

pub type FetchFuture = LocalBoxFuture<'static, Result<Vec<Value>, FetchError>>;
/// Remote option supplier. Each call starts one fetch.
pub type FetchFn = Rc<dyn Fn() -> FetchFuture>;

/// Custom marker syntax.
///
/// `pattern` finds markers in a canonical value; capture groups named
/// `label` and `value` are used when present, otherwise groups 1 and 2.
/// `render` produces the token's display markup and `parser` the marker
/// string written back into the value.
#[derive(Clone)]
pub struct Formatter {
    pub pattern: Regex,
    pub render: MarkerFn,
    pub parser: MarkerFn,
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Formatter")
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

/// Class names of every widget element, all sharing one prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomClasses {
    pub container: String,
    pub at: String,
    pub input: String,
    pub mention: String,
    pub dropdown: String,
    pub dropdown_container: String,
    pub dropdown_multiple_mode: String,
    pub dropdown_header: String,
    pub dropdown_btn_cancel: String,
    pub dropdown_btn_multiple: String,
    pub dropdown_list: String,
    pub dropdown_list_option: String,
    pub dropdown_list_option_active: String,
    pub dropdown_list_option_disabled: String,
    pub dropdown_empty: String,
    pub dropdown_loading: String,
    pub focused: String,
    pub disabled: String,
    pub readonly: String,
}

impl DomClasses {
    pub fn new(prefix: &str) -> Self {
        let c = |name: &str| format!("{prefix}{name}");
        Self {
            container: c("container"),
            at: c("at"),
            input: c("input"),
            mention: c("mention"),
            dropdown: c("dropdown"),
            dropdown_container: c("dropdown-container"),
            dropdown_multiple_mode: c("dropdown-multiple-mode"),
            dropdown_header: c("dropdown-header"),
            dropdown_btn_cancel: c("dropdown-btn-cancel"),
            dropdown_btn_multiple: c("dropdown-btn-multiple"),
            dropdown_list: c("dropdown-list"),
            dropdown_list_option: c("dropdown-list-option"),
            dropdown_list_option_active: c("dropdown-list-option-active"),
            dropdown_list_option_disabled: c("dropdown-list-option-disabled"),
            dropdown_empty: c("dropdown-empty"),
            dropdown_loading: c("dropdown-loading"),
            focused: c("focused"),
            disabled: c("disabled"),
            readonly: c("readonly"),
        }
    }

    /// Classes the surface model uses to write and recognise its markup.
    pub fn markup(&self) -> MarkupClasses {
        MarkupClasses {
            mention: self.mention.clone(),
            trigger: self.at.clone(),
        }
    }
}

impl Default for DomClasses {
    fn default() -> Self {
        Self::new(DEFAULT_CLASS_PREFIX)
    }
}

#[derive(Clone)]
pub struct MentionsConfig {
    pub(crate) kind: EditorKind,
    pub(crate) value: String,
    pub(crate) disabled: bool,
    pub(crate) readonly: bool,
    pub(crate) prefix: String,
    pub(crate) suffix: String,
    pub(crate) max_length: usize,
    pub(crate) get_mention_length: Option<LengthFn>,
    pub(crate) show_statistics: Option<StatisticsFn>,
    pub(crate) formatter: Option<Formatter>,
    pub(crate) options: Vec<Value>,
    pub(crate) label_field_name: String,
    pub(crate) value_field_name: String,
    pub(crate) marker_label_key: String,
    pub(crate) marker_value_key: String,
    pub(crate) options_fetch_api: Option<FetchFn>,
    pub(crate) immediate: bool,
    pub(crate) filter_option: Option<FilterFn>,
    pub(crate) option_render: Option<OptionRenderFn>,
    pub(crate) dropdown_max_width: Option<f32>,
    pub(crate) dropdown_max_height: Option<f32>,
    pub(crate) classes: DomClasses,
    pub(crate) marker_pattern: Regex,
}

impl MentionsConfig {
    pub fn builder() -> MentionsConfigBuilder {
        MentionsConfigBuilder::default()
    }

    pub fn kind(&self) -> EditorKind {
        self.kind
    }

    pub fn initial_value(&self) -> &str {
        &self.value
    }

    /// The trigger character. Always the single char of the prefix.
    pub fn trigger(&self) -> char {
        self.prefix.chars().next().unwrap_or('@')
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// `0` means unlimited.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn classes(&self) -> &DomClasses {
        &self.classes
    }

    pub fn formatter(&self) -> Option<&Formatter> {
        self.formatter.as_ref()
    }

    pub fn has_remote_options(&self) -> bool {
        self.options_fetch_api.is_some()
    }

    pub fn is_immediate(&self) -> bool {
        self.immediate
    }

    pub fn dropdown_max_width(&self) -> Option<f32> {
        self.dropdown_max_width
    }

    pub fn dropdown_max_height(&self) -> Option<f32> {
        self.dropdown_max_height
    }

    /// Regex matching mention markers in a canonical value.
    pub fn mention_pattern(&self) -> &Regex {
        match &self.formatter {
            Some(f) => &f.pattern,
            None => &self.marker_pattern,
        }
    }

    /// Canonical marker for one mention.
    pub fn marker(&self, key: &str, label: &str) -> String {
        match &self.formatter {
            Some(f) => (f.parser)(key, label),
            None => format!(
                "#{{{}:{label},{}:{key}}}",
                self.marker_label_key, self.marker_value_key
            ),
        }
    }
}

impl fmt::Debug for MentionsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MentionsConfig")
            .field("kind", &self.kind)
            .field("value", &self.value)
            .field("disabled", &self.disabled)
            .field("readonly", &self.readonly)
            .field("prefix", &self.prefix)
            .field("suffix", &self.suffix)
            .field("max_length", &self.max_length)
            .field("formatter", &self.formatter)
            .field("options", &self.options.len())
            .field("remote", &self.options_fetch_api.is_some())
            .field("immediate", &self.immediate)
            .finish_non_exhaustive()
    }
}

/// Collects settings for a [`MentionsConfig`].
///
/// `initial_value` is an alias of `value`; when both are given, `value` wins.
pub struct MentionsConfigBuilder {
    kind: EditorKind,
    value: Option<String>,
    initial_value: Option<String>,
    disabled: bool,
    readonly: bool,
    prefix: String,
    suffix: String,
    max_length: usize,
    get_mention_length: Option<LengthFn>,
    show_statistics: Option<StatisticsFn>,
    formatter: Option<Formatter>,
    options: Vec<Value>,
    label_field_name: String,
    value_field_name: String,
    marker_label_key: String,
    marker_value_key: String,
    options_fetch_api: Option<FetchFn>,
    immediate: bool,
    filter_option: Option<FilterFn>,
    option_render: Option<OptionRenderFn>,
    dropdown_max_width: Option<f32>,
    dropdown_max_height: Option<f32>,
    class_prefix: String,
}

impl Default for MentionsConfigBuilder {
    fn default() -> Self {
        Self {
            kind: EditorKind::default(),
            value: None,
            initial_value: None,
            disabled: false,
            readonly: false,
            prefix: DEFAULT_PREFIX.to_string(),
            suffix: DEFAULT_SUFFIX.to_string(),
            max_length: 0,
            get_mention_length: None,
            show_statistics: None,
            formatter: None,
            options: Vec::new(),
            label_field_name: "label".to_string(),
            value_field_name: "value".to_string(),
            marker_label_key: "name".to_string(),
            marker_value_key: "id".to_string(),
            options_fetch_api: None,
            immediate: false,
            filter_option: None,
            option_render: None,
            dropdown_max_width: None,
            dropdown_max_height: Some(DEFAULT_DROPDOWN_MAX_HEIGHT),
            class_prefix: DEFAULT_CLASS_PREFIX.to_string(),
        }
    }
}

impl MentionsConfigBuilder {
    pub fn kind(mut self, kind: EditorKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn initial_value(mut self, value: impl Into<String>) -> Self {
        self.initial_value = Some(value.into());
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn get_mention_length(mut self, f: impl Fn(&MentionOption) -> usize + 'static) -> Self {
        self.get_mention_length = Some(Rc::new(f));
        self
    }

    pub fn show_statistics(mut self, f: impl Fn(&[MentionOption]) -> String + 'static) -> Self {
        self.show_statistics = Some(Rc::new(f));
        self
    }

    pub fn formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    pub fn options(mut self, records: Vec<Value>) -> Self {
        self.options = records;
        self
    }

    pub fn label_field_name(mut self, name: impl Into<String>) -> Self {
        self.label_field_name = name.into();
        self
    }

    pub fn value_field_name(mut self, name: impl Into<String>) -> Self {
        self.value_field_name = name.into();
        self
    }

    /// Keys written into the default `#{name:..,id:..}` marker.
    pub fn marker_keys(mut self, label_key: impl Into<String>, value_key: impl Into<String>) -> Self {
        self.marker_label_key = label_key.into();
        self.marker_value_key = value_key.into();
        self
    }

    pub fn options_fetch_api(mut self, f: impl Fn() -> FetchFuture + 'static) -> Self {
        self.options_fetch_api = Some(Rc::new(f));
        self
    }

    pub fn immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    pub fn filter_option(mut self, f: impl Fn(&MentionOption, &str) -> bool + 'static) -> Self {
        self.filter_option = Some(Rc::new(f));
        self
    }

    pub fn option_render(mut self, f: impl Fn(&MentionOption, usize) -> String + 'static) -> Self {
        self.option_render = Some(Rc::new(f));
        self
    }

    pub fn dropdown_max_width(mut self, width: Option<f32>) -> Self {
        self.dropdown_max_width = width;
        self
    }

    pub fn dropdown_max_height(mut self, height: Option<f32>) -> Self {
        self.dropdown_max_height = height;
        self
    }

    pub fn class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = prefix.into();
        self
    }

    pub fn build(self) -> Result<MentionsConfig, ConfigError> {
        if self.prefix.chars().count() != 1 {
            return Err(ConfigError::InvalidPrefix(self.prefix));
        }
        for (field, v) in [
            ("labelFieldName", &self.label_field_name),
            ("valueFieldName", &self.value_field_name),
            ("markerLabelKey", &self.marker_label_key),
            ("markerValueKey", &self.marker_value_key),
        ] {
            if v.is_empty() {
                return Err(ConfigError::EmptyField(field));
            }
        }

        let marker_pattern = Regex::new(&format!(
            r"#\{{{}:([^{{}}]+?),{}:([^{{}}]+?)\}}",
            regex::escape(&self.marker_label_key),
            regex::escape(&self.marker_value_key),
        ))?;
        if let Some(f) = &self.formatter {
            let groups = f.pattern.captures_len() - 1;
            if groups < 2 {
                log::warn!(
                    target: "mentions.config",
                    "formatter pattern has {groups} capture group(s); no mentions will be recognised"
                );
            }
        }

        let classes = DomClasses::new(&self.class_prefix);
        log::debug!(
            target: "mentions.config",
            "built config: kind={:?} max_length={} remote={} immediate={}",
            self.kind,
            self.max_length,
            self.options_fetch_api.is_some(),
            self.immediate
        );
        Ok(MentionsConfig {
            kind: self.kind,
            value: self.value.or(self.initial_value).unwrap_or_default(),
            disabled: self.disabled,
            readonly: self.readonly,
            prefix: self.prefix,
            suffix: self.suffix,
            max_length: self.max_length,
            get_mention_length: self.get_mention_length,
            show_statistics: self.show_statistics,
            formatter: self.formatter,
            options: self.options,
            label_field_name: self.label_field_name,
            value_field_name: self.value_field_name,
            marker_label_key: self.marker_label_key,
            marker_value_key: self.marker_value_key,
            options_fetch_api: self.options_fetch_api,
            immediate: self.immediate,
            filter_option: self.filter_option,
            option_render: self.option_render,
            dropdown_max_width: self.dropdown_max_width,
            dropdown_max_height: self.dropdown_max_height,
            classes,
            marker_pattern,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindName {
    #[default]
    Input,
    Textarea,
}

impl From<KindName> for EditorKind {
    fn from(k: KindName) -> Self {
        match k {
            KindName::Input => EditorKind::Input,
            KindName::Textarea => EditorKind::Textarea,
        }
    }
}

/// The data-only subset of the configuration, as read from a file.
///
/// Callbacks (formatter, filters, fetch) cannot be expressed in a file and
/// are added on the returned builder.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct ConfigFile {
    #[serde(rename = "type")]
    pub kind: KindName,
    pub value: Option<String>,
    pub initial_value: Option<String>,
    pub disabled: bool,
    pub readonly: bool,
    pub prefix: String,
    pub suffix: String,
    pub max_length: usize,
    pub options: Vec<Value>,
    pub label_field_name: String,
    pub value_field_name: String,
    pub marker_label_key: String,
    pub marker_value_key: String,
    pub immediate: bool,
    pub dropdown_max_width: Option<f32>,
    pub dropdown_max_height: Option<f32>,
    pub class_prefix: String,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            kind: KindName::default(),
            value: None,
            initial_value: None,
            disabled: false,
            readonly: false,
            prefix: DEFAULT_PREFIX.to_string(),
            suffix: DEFAULT_SUFFIX.to_string(),
            max_length: 0,
            options: Vec::new(),
            label_field_name: "label".to_string(),
            value_field_name: "value".to_string(),
            marker_label_key: "name".to_string(),
            marker_value_key: "id".to_string(),
            immediate: false,
            dropdown_max_width: None,
            dropdown_max_height: Some(DEFAULT_DROPDOWN_MAX_HEIGHT),
            class_prefix: DEFAULT_CLASS_PREFIX.to_string(),
        }
    }
}

impl ConfigFile {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Reads a `.json` file as JSON and anything else as TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        log::debug!(target: "mentions.config", "loading {}", path.display());
        if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_toml_str(&contents)
        }
    }

    pub fn into_builder(self) -> MentionsConfigBuilder {
        let mut b = MentionsConfig::builder()
            .kind(self.kind.into())
            .disabled(self.disabled)
            .readonly(self.readonly)
            .prefix(self.prefix)
            .suffix(self.suffix)
            .max_length(self.max_length)
            .options(self.options)
            .label_field_name(self.label_field_name)
            .value_field_name(self.value_field_name)
            .marker_keys(self.marker_label_key, self.marker_value_key)
            .immediate(self.immediate)
            .dropdown_max_width(self.dropdown_max_width)
            .dropdown_max_height(self.dropdown_max_height)
            .class_prefix(self.class_prefix);
        if let Some(v) = self.value {
            b = b.value(v);
        }
        if let Some(v) = self.initial_value {
            b = b.initial_value(v);
        }
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_widget_conventions() {
        let cfg = MentionsConfig::builder().build().unwrap();
        assert_eq!(cfg.trigger(), '@');
        assert_eq!(cfg.suffix(), " ");
        assert_eq!(cfg.max_length(), 0);
        assert_eq!(cfg.dropdown_max_height(), Some(200.0));
        assert_eq!(cfg.classes().mention, "mentions__mention");
        assert_eq!(cfg.classes().dropdown_list_option_active, "mentions__dropdown-list-option-active");
        assert_eq!(cfg.marker("42", "Alice"), "#{name:Alice,id:42}");
    }

    #[test]
    fn multi_char_prefix_is_rejected() {
        let err = MentionsConfig::builder().prefix("@@").build().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPrefix(p) if p == "@@"));
        assert!(MentionsConfig::builder().prefix("").build().is_err());
    }

    #[test]
    fn value_wins_over_initial_value() {
        let cfg = MentionsConfig::builder()
            .initial_value("a")
            .value("b")
            .build()
            .unwrap();
        assert_eq!(cfg.initial_value(), "b");
        let cfg = MentionsConfig::builder().initial_value("a").build().unwrap();
        assert_eq!(cfg.initial_value(), "a");
    }

    #[test]
    fn custom_marker_keys_change_pattern() {
        let cfg = MentionsConfig::builder().marker_keys("n", "k").build().unwrap();
        assert_eq!(cfg.marker("1", "A"), "#{n:A,k:1}");
        assert!(cfg.mention_pattern().is_match("#{n:A,k:1}"));
        assert!(!cfg.mention_pattern().is_match("#{name:A,id:1}"));
    }

    #[test]
    fn toml_file_maps_onto_builder() {
        let file = ConfigFile::from_toml_str(
            r##"
            type = "textarea"
            maxLength = 40
            prefix = "#"
            initialValue = "hi"
            options = [{ label = "Alice", value = "1" }]
            "##,
        )
        .unwrap();
        let cfg = file.into_builder().build().unwrap();
        assert_eq!(cfg.kind(), EditorKind::Textarea);
        assert_eq!(cfg.max_length(), 40);
        assert_eq!(cfg.trigger(), '#');
        assert_eq!(cfg.initial_value(), "hi");
        assert_eq!(cfg.options.len(), 1);
    }

    #[test]
    fn json_file_rejects_unknown_fields() {
        assert!(ConfigFile::from_json_str(r#"{"maxLength": 3}"#).is_ok());
        let err = ConfigFile::from_json_str(r#"{"nope": 1}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
