//! Typed settings registry: metadata, validation, change tracking, and prefs persistence.

use std::collections::BTreeMap;

use notes_platform_host::{load_setting_value, save_setting_value, PrefsError, PrefsStore};
use serde_json::{json, Value};
use thiserror::Error;

use crate::model::SettingsSnapshot;

/// Setting keys understood by the shell.
pub mod keys {
    pub const LOCALE: &str = "locale";
    pub const PROFILE_DIR: &str = "profileDir";
    pub const TEMPLATE_DIR: &str = "templateDir";
    pub const LAYOUT_BUTTON_SEQUENCE: &str = "layoutButtonSequence";
    pub const NOTES_SORT_FIELD: &str = "notes.sortOrder.field";
    pub const NOTES_SORT_REVERSE: &str = "notes.sortOrder.reverse";
    pub const FOLDERS_SORT_FIELD: &str = "folders.sortOrder.field";
    pub const FOLDERS_SORT_REVERSE: &str = "folders.sortOrder.reverse";
    pub const SHOW_NOTE_COUNTS: &str = "showNoteCounts";
    pub const UNCOMPLETED_TODOS_ON_TOP: &str = "uncompletedTodosOnTop";
    pub const SHOW_COMPLETED_TODOS: &str = "showCompletedTodos";
    pub const WINDOW_CONTENT_ZOOM_FACTOR: &str = "windowContentZoomFactor";
    pub const SHOW_TRAY_ICON: &str = "showTrayIcon";
    pub const EDITOR_FONT_FAMILY: &str = "style.editor.fontFamily";
    pub const THEME: &str = "theme";
    pub const THEME_AUTO_DETECT: &str = "themeAutoDetect";
    pub const PREFERRED_LIGHT_THEME: &str = "preferredLightTheme";
    pub const PREFERRED_DARK_THEME: &str = "preferredDarkTheme";
    pub const NOTE_VISIBLE_PANES: &str = "noteVisiblePanes";
    pub const SIDEBAR_VISIBILITY: &str = "sidebarVisibility";
    pub const NOTE_LIST_VISIBILITY: &str = "noteListVisibility";
    pub const FLAG_OPEN_DEV_TOOLS: &str = "flagOpenDevTools";
    pub const AUTO_UPDATE_INCLUDE_PRE_RELEASES: &str = "autoUpdate.includePreReleases";
}

/// Sort field value that puts notes in manual (drag and drop) order.
pub const MANUAL_NOTE_ORDER: &str = "order";

/// One selectable value of an enum setting.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumOption {
    pub value: Value,
    pub label: String,
}

impl EnumOption {
    fn new(value: Value, label: &str) -> Self {
        Self {
            value,
            label: label.to_string(),
        }
    }

    /// Stable token for the option, used in menu node ids.
    pub fn token(&self) -> String {
        match &self.value {
            Value::String(raw) => raw.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingKind {
    Bool,
    Int { min: i64, max: i64, step: i64 },
    Text,
    Enum(Vec<EnumOption>),
    List,
}

impl SettingKind {
    fn expected(&self) -> &'static str {
        match self {
            Self::Bool => "a boolean",
            Self::Int { .. } => "an integer in range",
            Self::Text => "a string",
            Self::Enum(_) => "one of the enum options",
            Self::List => "an array",
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Bool => value.is_boolean(),
            Self::Int { min, max, .. } => value
                .as_i64()
                .is_some_and(|number| (*min..=*max).contains(&number)),
            Self::Text => value.is_string(),
            Self::Enum(options) => options.iter().any(|option| option.value == *value),
            Self::List => value.is_array(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SettingMetadata {
    pub key: &'static str,
    pub label: &'static str,
    pub default: Value,
    pub kind: SettingKind,
}

impl SettingMetadata {
    fn new(key: &'static str, label: &'static str, default: Value, kind: SettingKind) -> Self {
        Self {
            key,
            label,
            default,
            kind,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SettingsError {
    #[error("unknown setting `{0}`")]
    UnknownKey(String),
    #[error("invalid value {value} for setting `{key}`: expected {expected}")]
    InvalidValue {
        key: String,
        value: Value,
        expected: &'static str,
    },
    #[error(transparent)]
    Storage(#[from] PrefsError),
}

fn builtin_metadata() -> Vec<SettingMetadata> {
    use SettingKind::{Bool, Enum, Int, List, Text};

    let themes = || {
        Enum(vec![
            EnumOption::new(json!(1), "Light"),
            EnumOption::new(json!(2), "Dark"),
            EnumOption::new(json!(3), "Solarised Light"),
            EnumOption::new(json!(4), "Solarised Dark"),
        ])
    };
    vec![
        SettingMetadata::new(keys::LOCALE, "Language", json!("en_GB"), Text),
        SettingMetadata::new(
            keys::PROFILE_DIR,
            "Profile directory",
            json!("~/.config/notes-desktop"),
            Text,
        ),
        SettingMetadata::new(
            keys::TEMPLATE_DIR,
            "Template directory",
            json!("~/.config/notes-desktop/templates"),
            Text,
        ),
        SettingMetadata::new(
            keys::LAYOUT_BUTTON_SEQUENCE,
            "Layout button sequence",
            json!(0),
            Enum(vec![
                EnumOption::new(json!(0), "Editor / Viewer / Split View"),
                EnumOption::new(json!(1), "Editor / Viewer"),
                EnumOption::new(json!(2), "Editor / Split View"),
                EnumOption::new(json!(3), "Viewer / Split View"),
            ]),
        ),
        SettingMetadata::new(
            keys::NOTES_SORT_FIELD,
            "Sort notes by",
            json!("user_updated_time"),
            Enum(vec![
                EnumOption::new(json!("user_updated_time"), "Updated date"),
                EnumOption::new(json!("user_created_time"), "Created date"),
                EnumOption::new(json!("title"), "Title"),
                EnumOption::new(json!(MANUAL_NOTE_ORDER), "Custom order"),
            ]),
        ),
        SettingMetadata::new(
            keys::NOTES_SORT_REVERSE,
            "Reverse sort order",
            json!(true),
            Bool,
        ),
        SettingMetadata::new(
            keys::FOLDERS_SORT_FIELD,
            "Sort notebooks by",
            json!("title"),
            Enum(vec![
                EnumOption::new(json!("title"), "Title"),
                EnumOption::new(json!("last_note_user_updated_time"), "Updated date"),
            ]),
        ),
        SettingMetadata::new(
            keys::FOLDERS_SORT_REVERSE,
            "Reverse sort order",
            json!(false),
            Bool,
        ),
        SettingMetadata::new(keys::SHOW_NOTE_COUNTS, "Show note counts", json!(true), Bool),
        SettingMetadata::new(
            keys::UNCOMPLETED_TODOS_ON_TOP,
            "Uncompleted to-dos on top",
            json!(true),
            Bool,
        ),
        SettingMetadata::new(
            keys::SHOW_COMPLETED_TODOS,
            "Show completed to-dos",
            json!(true),
            Bool,
        ),
        SettingMetadata::new(
            keys::WINDOW_CONTENT_ZOOM_FACTOR,
            "Global zoom percentage",
            json!(100),
            Int {
                min: 30,
                max: 300,
                step: 10,
            },
        ),
        SettingMetadata::new(keys::SHOW_TRAY_ICON, "Show tray icon", json!(true), Bool),
        SettingMetadata::new(keys::EDITOR_FONT_FAMILY, "Editor font family", json!(""), Text),
        SettingMetadata::new(keys::THEME, "Theme", json!(1), themes()),
        SettingMetadata::new(
            keys::THEME_AUTO_DETECT,
            "Automatically switch theme to match system theme",
            json!(false),
            Bool,
        ),
        SettingMetadata::new(
            keys::PREFERRED_LIGHT_THEME,
            "Preferred light theme",
            json!(1),
            themes(),
        ),
        SettingMetadata::new(
            keys::PREFERRED_DARK_THEME,
            "Preferred dark theme",
            json!(2),
            themes(),
        ),
        SettingMetadata::new(
            keys::NOTE_VISIBLE_PANES,
            "Visible panes",
            json!(["editor", "viewer"]),
            List,
        ),
        SettingMetadata::new(keys::SIDEBAR_VISIBILITY, "Sidebar visibility", json!(true), Bool),
        SettingMetadata::new(
            keys::NOTE_LIST_VISIBILITY,
            "Note list visibility",
            json!(true),
            Bool,
        ),
        SettingMetadata::new(
            keys::FLAG_OPEN_DEV_TOOLS,
            "Open developer tools on startup",
            json!(false),
            Bool,
        ),
        SettingMetadata::new(
            keys::AUTO_UPDATE_INCLUDE_PRE_RELEASES,
            "Get pre-releases when checking for updates",
            json!(false),
            Bool,
        ),
    ]
}

/// Settings registry. Holds the metadata of every known key and the values that differ from
/// their defaults, and records which keys changed since the last [`Settings::take_changes`].
#[derive(Debug, Clone)]
pub struct Settings {
    metadata: BTreeMap<&'static str, SettingMetadata>,
    values: BTreeMap<String, Value>,
    changes: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

impl Settings {
    /// Registry with every built-in setting at its default value.
    pub fn new() -> Self {
        Self::with_metadata(builtin_metadata())
    }

    pub fn with_metadata(metadata: Vec<SettingMetadata>) -> Self {
        Self {
            metadata: metadata.into_iter().map(|meta| (meta.key, meta)).collect(),
            values: BTreeMap::new(),
            changes: Vec::new(),
        }
    }

    pub fn metadata(&self, key: &str) -> Option<&SettingMetadata> {
        self.metadata.get(key)
    }

    /// Display label; the key itself when the setting is unknown.
    pub fn label<'a>(&'a self, key: &'a str) -> &'a str {
        self.metadata(key).map_or(key, |meta| meta.label)
    }

    /// Effective value: the stored value, or the default.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values
            .get(key)
            .or_else(|| self.metadata(key).map(|meta| &meta.default))
    }

    pub fn bool(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn int(&self, key: &str) -> i64 {
        self.get(key).and_then(Value::as_i64).unwrap_or(0)
    }

    pub fn text(&self, key: &str) -> &str {
        self.get(key).and_then(Value::as_str).unwrap_or("")
    }

    /// Increment used by stepper controls of an integer setting.
    pub fn step(&self, key: &str) -> Option<i64> {
        match self.metadata(key)?.kind {
            SettingKind::Int { step, .. } => Some(step),
            _ => None,
        }
    }

    pub fn enum_options(&self, key: &str) -> Option<&[EnumOption]> {
        match &self.metadata(key)?.kind {
            SettingKind::Enum(options) => Some(options),
            _ => None,
        }
    }

    fn validate(&self, key: &str, value: &Value) -> Result<(), SettingsError> {
        let meta = self
            .metadata(key)
            .ok_or_else(|| SettingsError::UnknownKey(key.to_string()))?;
        if meta.kind.accepts(value) {
            Ok(())
        } else {
            Err(SettingsError::InvalidValue {
                key: key.to_string(),
                value: value.clone(),
                expected: meta.kind.expected(),
            })
        }
    }

    /// Stores a value. Returns whether the effective value changed.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] for unknown keys and values the setting kind rejects.
    pub fn set(&mut self, key: &str, value: Value) -> Result<bool, SettingsError> {
        self.validate(key, &value)?;
        if self.get(key) == Some(&value) {
            return Ok(false);
        }
        self.values.insert(key.to_string(), value);
        if !self.changes.iter().any(|changed| changed == key) {
            self.changes.push(key.to_string());
        }
        Ok(true)
    }

    /// Flips a boolean setting.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the key is unknown or not boolean.
    pub fn toggle(&mut self, key: &str) -> Result<bool, SettingsError> {
        let current = self.bool(key);
        self.set(key, Value::Bool(!current))
    }

    /// Adds `delta` to an integer setting, clamping to its range. `None` resets to the default.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the key is unknown or not an integer setting.
    pub fn increment(&mut self, key: &str, delta: Option<i64>) -> Result<bool, SettingsError> {
        let meta = self
            .metadata(key)
            .ok_or_else(|| SettingsError::UnknownKey(key.to_string()))?;
        let SettingKind::Int { min, max, .. } = meta.kind else {
            return Err(SettingsError::InvalidValue {
                key: key.to_string(),
                value: self.get(key).cloned().unwrap_or(Value::Null),
                expected: "an integer setting",
            });
        };
        let next = match delta {
            Some(delta) => self.int(key).saturating_add(delta).clamp(min, max),
            None => meta.default.as_i64().unwrap_or(min),
        };
        self.set(key, json!(next))
    }

    /// Drains the keys changed since the last call, in change order.
    pub fn take_changes(&mut self) -> Vec<String> {
        std::mem::take(&mut self.changes)
    }

    /// Effective value of every known setting.
    pub fn snapshot(&self) -> SettingsSnapshot {
        self.metadata
            .keys()
            .filter_map(|key| Some((key.to_string(), self.get(key)?.clone())))
            .collect()
    }

    /// Loads persisted values for every known key. Keys that fail to load or validate keep their
    /// defaults; the failures are returned as messages.
    pub async fn hydrate<S: PrefsStore + ?Sized>(&mut self, store: &S) -> Vec<String> {
        let mut failures = Vec::new();
        let keys: Vec<&'static str> = self.metadata.keys().copied().collect();
        for key in keys {
            match load_setting_value(store, key).await {
                Ok(Some(value)) => match self.validate(key, &value) {
                    Ok(()) => {
                        self.values.insert(key.to_string(), value);
                    }
                    Err(err) => failures.push(err.to_string()),
                },
                Ok(None) => {}
                Err(err) => failures.push(err.to_string()),
            }
        }
        failures
    }

    /// Saves the effective value of `key`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::UnknownKey`] for undeclared keys and [`SettingsError::Storage`]
    /// when the store rejects the write.
    pub async fn persist<S: PrefsStore + ?Sized>(
        &self,
        store: &S,
        key: &str,
    ) -> Result<(), SettingsError> {
        let value = self
            .get(key)
            .ok_or_else(|| SettingsError::UnknownKey(key.to_string()))?;
        save_setting_value(store, key, value).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use notes_platform_host::MemoryPrefsStore;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_are_reported_until_set() {
        let mut settings = Settings::new();
        assert_eq!(settings.text(keys::LOCALE), "en_GB");
        assert_eq!(settings.int(keys::WINDOW_CONTENT_ZOOM_FACTOR), 100);
        assert!(settings.bool(keys::NOTES_SORT_REVERSE));

        assert_eq!(settings.set(keys::LOCALE, json!("fr_FR")), Ok(true));
        assert_eq!(settings.set(keys::LOCALE, json!("fr_FR")), Ok(false));
        assert_eq!(settings.take_changes(), vec![keys::LOCALE.to_string()]);
        assert!(settings.take_changes().is_empty());
    }

    #[test]
    fn values_are_validated_against_their_kind() {
        let mut settings = Settings::new();
        assert_eq!(
            settings.set("nope", json!(1)),
            Err(SettingsError::UnknownKey("nope".to_string()))
        );
        assert!(matches!(
            settings.set(keys::SHOW_TRAY_ICON, json!("yes")),
            Err(SettingsError::InvalidValue { .. })
        ));
        assert!(matches!(
            settings.set(keys::NOTES_SORT_FIELD, json!("size")),
            Err(SettingsError::InvalidValue { .. })
        ));
        assert!(matches!(
            settings.set(keys::WINDOW_CONTENT_ZOOM_FACTOR, json!(1000)),
            Err(SettingsError::InvalidValue { .. })
        ));
        assert_eq!(settings.set(keys::NOTES_SORT_FIELD, json!("order")), Ok(true));
    }

    #[test]
    fn increment_clamps_and_resets() {
        let mut settings = Settings::new();
        settings
            .increment(keys::WINDOW_CONTENT_ZOOM_FACTOR, Some(10))
            .expect("zoom in");
        assert_eq!(settings.int(keys::WINDOW_CONTENT_ZOOM_FACTOR), 110);

        settings
            .increment(keys::WINDOW_CONTENT_ZOOM_FACTOR, Some(-1000))
            .expect("zoom out");
        assert_eq!(settings.int(keys::WINDOW_CONTENT_ZOOM_FACTOR), 30);

        settings
            .increment(keys::WINDOW_CONTENT_ZOOM_FACTOR, None)
            .expect("reset");
        assert_eq!(settings.int(keys::WINDOW_CONTENT_ZOOM_FACTOR), 100);

        assert!(settings.increment(keys::LOCALE, Some(1)).is_err());
    }

    #[test]
    fn enum_option_tokens_are_plain_strings() {
        let settings = Settings::new();
        let tokens: Vec<String> = settings
            .enum_options(keys::NOTES_SORT_FIELD)
            .expect("options")
            .iter()
            .map(EnumOption::token)
            .collect();
        assert_eq!(
            tokens,
            vec!["user_updated_time", "user_created_time", "title", "order"]
        );
        let layout: Vec<String> = settings
            .enum_options(keys::LAYOUT_BUTTON_SEQUENCE)
            .expect("options")
            .iter()
            .map(EnumOption::token)
            .collect();
        assert_eq!(layout, vec!["0", "1", "2", "3"]);
        assert!(settings.enum_options(keys::LOCALE).is_none());
    }

    #[test]
    fn hydrate_and_persist_round_trip_through_prefs() {
        let store = MemoryPrefsStore::with_entries([
            ("settings.locale", "\"de_DE\""),
            ("settings.showTrayIcon", "\"not a bool\""),
        ]);
        let mut settings = Settings::new();
        let failures = block_on(settings.hydrate(&store));

        assert_eq!(settings.text(keys::LOCALE), "de_DE");
        assert!(settings.bool(keys::SHOW_TRAY_ICON));
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains(keys::SHOW_TRAY_ICON));
        assert!(settings.take_changes().is_empty());

        settings.set(keys::THEME, json!(2)).expect("theme");
        block_on(settings.persist(&store, keys::THEME)).expect("persist");
        assert_eq!(store.raw("settings.theme").as_deref(), Some("2"));
    }

    #[test]
    fn persist_reports_store_failures() {
        let store = MemoryPrefsStore::default();
        store.fail_saves("read-only profile");
        let settings = Settings::new();

        assert!(matches!(
            block_on(settings.persist(&store, keys::LOCALE)),
            Err(SettingsError::Storage(PrefsError::Store { key, .. })) if key == keys::LOCALE
        ));
        assert_eq!(
            block_on(settings.persist(&store, "nope")),
            Err(SettingsError::UnknownKey("nope".to_string()))
        );
    }

    #[test]
    fn snapshot_covers_every_known_key() {
        let settings = Settings::new();
        let snapshot = settings.snapshot();
        assert_eq!(snapshot.get(keys::THEME), Some(&json!(1)));
        assert_eq!(
            snapshot.get(keys::NOTE_VISIBLE_PANES),
            Some(&json!(["editor", "viewer"]))
        );
        assert_eq!(snapshot.len(), builtin_metadata().len());
    }
}
