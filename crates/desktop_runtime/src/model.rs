use std::collections::{BTreeMap, BTreeSet};

use notes_command_contract::ScreenId;
use notes_platform_host::NoteTemplate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::settings::{keys, Settings};

pub const DEFAULT_WINDOW_WIDTH: u32 = 800;
pub const DEFAULT_WINDOW_HEIGHT: u32 = 600;

/// Setting values mirrored into application state, keyed by setting name.
pub type SettingsSnapshot = BTreeMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pane {
    Editor,
    Viewer,
}

/// Classified pane layout used by the layout toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneLayout {
    Editor,
    Viewer,
    Both,
}

impl PaneLayout {
    /// Two shown panes classify as [`PaneLayout::Both`], otherwise the first pane names the
    /// layout. An empty pane list has no layout.
    pub fn classify(panes: &[Pane]) -> Option<Self> {
        if panes.len() == 2 {
            return Some(Self::Both);
        }
        panes.first().map(|pane| match pane {
            Pane::Editor => Self::Editor,
            Pane::Viewer => Self::Viewer,
        })
    }

    pub fn panes(self) -> Vec<Pane> {
        match self {
            Self::Editor => vec![Pane::Editor],
            Self::Viewer => vec![Pane::Viewer],
            Self::Both => vec![Pane::Editor, Pane::Viewer],
        }
    }
}

/// Which layouts the layout button cycles through (`layoutButtonSequence` setting).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutButtonSequence {
    All,
    EditorViewer,
    EditorSplit,
    ViewerSplit,
}

impl LayoutButtonSequence {
    pub const VARIANTS: [LayoutButtonSequence; 4] = [
        Self::All,
        Self::EditorViewer,
        Self::EditorSplit,
        Self::ViewerSplit,
    ];

    /// Reads the stored setting value. Anything unrecognized falls back to [`Self::All`].
    pub fn from_setting(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_i64) {
            Some(1) => Self::EditorViewer,
            Some(2) => Self::EditorSplit,
            Some(3) => Self::ViewerSplit,
            _ => Self::All,
        }
    }

    pub fn setting_value(self) -> i64 {
        match self {
            Self::All => 0,
            Self::EditorViewer => 1,
            Self::EditorSplit => 2,
            Self::ViewerSplit => 3,
        }
    }

    pub fn layouts(self) -> &'static [PaneLayout] {
        match self {
            Self::All => &[PaneLayout::Editor, PaneLayout::Viewer, PaneLayout::Both],
            Self::EditorViewer => &[PaneLayout::Editor, PaneLayout::Viewer],
            Self::EditorSplit => &[PaneLayout::Editor, PaneLayout::Both],
            Self::ViewerSplit => &[PaneLayout::Viewer, PaneLayout::Both],
        }
    }
}

/// Navigation target: a screen id plus free-form parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub kind: ScreenId,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
}

impl Route {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: ScreenId::new(kind),
            params: Map::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }
}

impl Default for Route {
    fn default() -> Self {
        Self::new(ScreenId::MAIN)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowContentSize {
    pub width: u32,
    pub height: u32,
}

impl Default for WindowContentSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedResource {
    pub title: String,
}

/// Immutable application state. Every action produces a new value (or hands back the same
/// `Rc` when nothing changed).
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationState {
    pub route: Route,
    pub nav_history: Vec<Route>,
    pub note_visible_panes: Vec<Pane>,
    pub sidebar_visibility: bool,
    pub note_list_visibility: bool,
    pub dev_tools_visible: bool,
    pub selected_note_ids: Vec<String>,
    pub window_content_size: WindowContentSize,
    pub watched_note_files: BTreeSet<String>,
    pub last_editor_scroll_percents: BTreeMap<String, f64>,
    pub watched_resources: BTreeMap<String, WatchedResource>,
    pub settings: SettingsSnapshot,
    pub templates: Vec<NoteTemplate>,
}

impl Default for ApplicationState {
    fn default() -> Self {
        Self {
            route: Route::default(),
            nav_history: Vec::new(),
            note_visible_panes: PaneLayout::Both.panes(),
            sidebar_visibility: true,
            note_list_visibility: true,
            dev_tools_visible: false,
            selected_note_ids: Vec::new(),
            window_content_size: WindowContentSize::default(),
            watched_note_files: BTreeSet::new(),
            last_editor_scroll_percents: BTreeMap::new(),
            watched_resources: BTreeMap::new(),
            settings: SettingsSnapshot::new(),
            templates: Vec::new(),
        }
    }
}

impl ApplicationState {
    /// Initial state seeded from persisted layout settings.
    pub fn hydrated(settings: &Settings) -> Self {
        let panes = settings
            .get(keys::NOTE_VISIBLE_PANES)
            .cloned()
            .and_then(|raw| serde_json::from_value::<Vec<Pane>>(raw).ok())
            .filter(|panes| !panes.is_empty())
            .unwrap_or_else(|| PaneLayout::Both.panes());
        Self {
            note_visible_panes: panes,
            sidebar_visibility: settings.bool(keys::SIDEBAR_VISIBILITY),
            note_list_visibility: settings.bool(keys::NOTE_LIST_VISIBILITY),
            settings: settings.snapshot(),
            ..Self::default()
        }
    }

    pub fn route_kind(&self) -> &ScreenId {
        &self.route.kind
    }

    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    pub fn layout_button_sequence(&self) -> LayoutButtonSequence {
        LayoutButtonSequence::from_setting(self.setting(keys::LAYOUT_BUTTON_SEQUENCE))
    }

    /// The selected note when exactly one is selected.
    pub fn single_selected_note(&self) -> Option<&str> {
        match self.selected_note_ids.as_slice() {
            [id] => Some(id.as_str()),
            _ => None,
        }
    }

    pub fn notes_sort_field(&self) -> Option<&str> {
        self.setting(keys::NOTES_SORT_FIELD).and_then(Value::as_str)
    }

    /// Current value of a setting that mirrors a piece of UI state.
    pub fn mirrored_setting(&self, key: &str) -> Option<Value> {
        match key {
            keys::NOTE_VISIBLE_PANES => serde_json::to_value(&self.note_visible_panes).ok(),
            keys::SIDEBAR_VISIBILITY => Some(Value::Bool(self.sidebar_visibility)),
            keys::NOTE_LIST_VISIBILITY => Some(Value::Bool(self.note_list_visibility)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn pane_layout_classification() {
        assert_eq!(
            PaneLayout::classify(&[Pane::Editor, Pane::Viewer]),
            Some(PaneLayout::Both)
        );
        assert_eq!(
            PaneLayout::classify(&[Pane::Viewer, Pane::Editor]),
            Some(PaneLayout::Both)
        );
        assert_eq!(
            PaneLayout::classify(&[Pane::Viewer]),
            Some(PaneLayout::Viewer)
        );
        assert_eq!(PaneLayout::classify(&[]), None);
    }

    #[test]
    fn layout_sequence_falls_back_to_all() {
        assert_eq!(
            LayoutButtonSequence::from_setting(Some(&json!(2))),
            LayoutButtonSequence::EditorSplit
        );
        assert_eq!(
            LayoutButtonSequence::from_setting(Some(&json!("nonsense"))),
            LayoutButtonSequence::All
        );
        assert_eq!(
            LayoutButtonSequence::from_setting(None),
            LayoutButtonSequence::All
        );
    }

    #[test]
    fn hydrated_state_reads_layout_settings() {
        let mut settings = Settings::new();
        settings
            .set(keys::NOTE_VISIBLE_PANES, json!(["viewer"]))
            .expect("panes");
        settings
            .set(keys::SIDEBAR_VISIBILITY, json!(false))
            .expect("sidebar");

        let state = ApplicationState::hydrated(&settings);
        assert_eq!(state.note_visible_panes, vec![Pane::Viewer]);
        assert!(!state.sidebar_visibility);
        assert!(state.note_list_visibility);
        assert_eq!(
            state.mirrored_setting(keys::NOTE_VISIBLE_PANES),
            Some(json!(["viewer"]))
        );
        assert_eq!(state.route_kind().as_str(), ScreenId::MAIN);
    }
}
