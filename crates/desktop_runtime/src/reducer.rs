//! Application actions and the core UI-state transition logic.

mod base;
mod resource_watch;

use std::rc::Rc;

use notes_platform_host::NoteTemplate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::model::{
    ApplicationState, LayoutButtonSequence, Pane, PaneLayout, Route, SettingsSnapshot,
    WindowContentSize,
};

pub use base::reduce_base;
pub use resource_watch::reduce_resource_edit_watcher;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
/// Actions accepted by the reducer pipeline. The serialized form is `{ "type": "NAV_GO", ... }`.
pub enum AppAction {
    /// Navigate to a route, pushing the current one on the history stack.
    NavGo {
        /// Target route.
        route: Route,
    },
    /// Return to the most recent route whose screen differs from the current one.
    NavBack,
    /// Record the window content size.
    WindowContentSizeSet {
        /// New size.
        size: WindowContentSize,
    },
    /// Advance the pane layout along the configured layout sequence.
    NoteVisiblePanesToggle,
    /// Replace the visible panes.
    NoteVisiblePanesSet {
        /// Panes to show.
        panes: Vec<Pane>,
    },
    /// Flip the sidebar visibility.
    SidebarVisibilityToggle,
    /// Set the sidebar visibility.
    SidebarVisibilitySet {
        /// New visibility.
        visibility: bool,
    },
    /// Flip the note list visibility.
    NotelistVisibilityToggle,
    /// Set the note list visibility.
    NotelistVisibilitySet {
        /// New visibility.
        visibility: bool,
    },
    /// Start watching a note file opened in an external editor.
    NoteFileWatcherAdd {
        /// Note id.
        id: String,
    },
    /// Stop watching a note file.
    NoteFileWatcherRemove {
        /// Note id.
        id: String,
    },
    /// Stop watching every note file.
    NoteFileWatcherClear,
    /// Select a note, or clear the selection when `id` is absent.
    NoteSelect {
        /// Note id.
        #[serde(default)]
        id: Option<String>,
    },
    /// Remember the editor scroll position for a note.
    EditorScrollPercentSet {
        /// Note id.
        #[serde(rename = "noteId")]
        note_id: String,
        /// Scroll fraction in `0.0..=1.0`.
        percent: f64,
    },
    /// Flip the developer tools visibility.
    NoteDevtoolsToggle,
    /// Set the developer tools visibility.
    NoteDevtoolsSet {
        /// New visibility.
        value: bool,
    },
    /// Start (or retitle) watching a resource opened in an external editor.
    ResourceEditWatcherSet {
        /// Resource id.
        id: String,
        /// Resource title.
        title: String,
    },
    /// Stop watching a resource.
    ResourceEditWatcherRemove {
        /// Resource id.
        id: String,
    },
    /// Stop watching every resource.
    ResourceEditWatcherClear,
    /// One setting changed.
    SettingUpdateOne {
        /// Setting key.
        key: String,
        /// New value.
        value: Value,
    },
    /// Every setting was (re)loaded.
    SettingUpdateAll {
        /// Full settings snapshot.
        settings: SettingsSnapshot,
    },
    /// Templates were (re)loaded from the template directory.
    TemplateUpdateAll {
        /// Loaded templates.
        templates: Vec<NoteTemplate>,
    },
    /// Any action type this shell does not handle. Passes through unchanged.
    #[serde(other)]
    Unknown,
}

impl AppAction {
    /// Wire type tag, e.g. `NAV_GO`.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::NavGo { .. } => "NAV_GO",
            Self::NavBack => "NAV_BACK",
            Self::WindowContentSizeSet { .. } => "WINDOW_CONTENT_SIZE_SET",
            Self::NoteVisiblePanesToggle => "NOTE_VISIBLE_PANES_TOGGLE",
            Self::NoteVisiblePanesSet { .. } => "NOTE_VISIBLE_PANES_SET",
            Self::SidebarVisibilityToggle => "SIDEBAR_VISIBILITY_TOGGLE",
            Self::SidebarVisibilitySet { .. } => "SIDEBAR_VISIBILITY_SET",
            Self::NotelistVisibilityToggle => "NOTELIST_VISIBILITY_TOGGLE",
            Self::NotelistVisibilitySet { .. } => "NOTELIST_VISIBILITY_SET",
            Self::NoteFileWatcherAdd { .. } => "NOTE_FILE_WATCHER_ADD",
            Self::NoteFileWatcherRemove { .. } => "NOTE_FILE_WATCHER_REMOVE",
            Self::NoteFileWatcherClear => "NOTE_FILE_WATCHER_CLEAR",
            Self::NoteSelect { .. } => "NOTE_SELECT",
            Self::EditorScrollPercentSet { .. } => "EDITOR_SCROLL_PERCENT_SET",
            Self::NoteDevtoolsToggle => "NOTE_DEVTOOLS_TOGGLE",
            Self::NoteDevtoolsSet { .. } => "NOTE_DEVTOOLS_SET",
            Self::ResourceEditWatcherSet { .. } => "RESOURCE_EDIT_WATCHER_SET",
            Self::ResourceEditWatcherRemove { .. } => "RESOURCE_EDIT_WATCHER_REMOVE",
            Self::ResourceEditWatcherClear => "RESOURCE_EDIT_WATCHER_CLEAR",
            Self::SettingUpdateOne { .. } => "SETTING_UPDATE_ONE",
            Self::SettingUpdateAll { .. } => "SETTING_UPDATE_ALL",
            Self::TemplateUpdateAll { .. } => "TEMPLATE_UPDATE_ALL",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Parses an action from its wire form. Unrecognized `type` values become
    /// [`AppAction::Unknown`].
    ///
    /// # Errors
    ///
    /// Returns the serde error when a recognized action has malformed fields.
    pub fn from_wire(raw: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(raw)
    }

    /// Serializes the action to its wire form.
    pub fn to_wire(&self) -> Value {
        // Every payload is string-keyed, so serialization cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Reducer failures. The offending action is carried in serialized form for diagnostics.
pub enum ReducerError {
    /// The action could not be applied to the current state.
    #[error("in reducer: {reason} (action: {action})")]
    Transition {
        /// What went wrong.
        reason: String,
        /// Serialized action.
        action: String,
    },
}

impl ReducerError {
    pub(crate) fn transition(reason: impl Into<String>, action: &AppAction) -> Self {
        Self::Transition {
            reason: reason.into(),
            action: action.to_wire().to_string(),
        }
    }
}

/// Applies `apply` to a copy-on-write clone of `state`.
pub(crate) fn update(
    state: &Rc<ApplicationState>,
    apply: impl FnOnce(&mut ApplicationState),
) -> Rc<ApplicationState> {
    let mut next = Rc::clone(state);
    apply(Rc::make_mut(&mut next));
    next
}

/// Applies an [`AppAction`] to the UI state owned by the shell.
///
/// Actions this stage does not handle return the input `Rc` unchanged, which callers can detect
/// with [`Rc::ptr_eq`].
///
/// # Errors
///
/// Returns [`ReducerError::Transition`] when the action carries an invalid payload (for example
/// a non-finite scroll percent).
pub fn reduce_app(
    state: &Rc<ApplicationState>,
    action: &AppAction,
) -> Result<Rc<ApplicationState>, ReducerError> {
    let next = match action {
        AppAction::NavGo { route } => update(state, |s| {
            let previous = std::mem::replace(&mut s.route, route.clone());
            s.nav_history.push(previous);
        }),
        AppAction::NavBack => navigate_back(state),
        AppAction::WindowContentSizeSet { size } => {
            if state.window_content_size == *size {
                Rc::clone(state)
            } else {
                update(state, |s| s.window_content_size = *size)
            }
        }
        AppAction::NoteVisiblePanesToggle => {
            let panes = next_pane_layout(&state.note_visible_panes, state.layout_button_sequence());
            update(state, |s| s.note_visible_panes = panes)
        }
        AppAction::NoteVisiblePanesSet { panes } => {
            update(state, |s| s.note_visible_panes = panes.clone())
        }
        AppAction::SidebarVisibilityToggle => {
            update(state, |s| s.sidebar_visibility = !s.sidebar_visibility)
        }
        AppAction::SidebarVisibilitySet { visibility } => {
            update(state, |s| s.sidebar_visibility = *visibility)
        }
        AppAction::NotelistVisibilityToggle => {
            update(state, |s| s.note_list_visibility = !s.note_list_visibility)
        }
        AppAction::NotelistVisibilitySet { visibility } => {
            update(state, |s| s.note_list_visibility = *visibility)
        }
        AppAction::NoteFileWatcherAdd { id } => {
            if state.watched_note_files.contains(id) {
                Rc::clone(state)
            } else {
                update(state, |s| {
                    s.watched_note_files.insert(id.clone());
                })
            }
        }
        AppAction::NoteFileWatcherRemove { id } => {
            if state.watched_note_files.contains(id) {
                update(state, |s| {
                    s.watched_note_files.remove(id);
                })
            } else {
                Rc::clone(state)
            }
        }
        AppAction::NoteFileWatcherClear => {
            if state.watched_note_files.is_empty() {
                Rc::clone(state)
            } else {
                update(state, |s| s.watched_note_files.clear())
            }
        }
        AppAction::NoteSelect { id } => {
            let selected: Vec<String> = id.iter().cloned().collect();
            if state.selected_note_ids == selected {
                Rc::clone(state)
            } else {
                update(state, |s| s.selected_note_ids = selected)
            }
        }
        AppAction::EditorScrollPercentSet { note_id, percent } => {
            if !percent.is_finite() {
                return Err(ReducerError::transition(
                    format!("scroll percent must be finite, got {percent}"),
                    action,
                ));
            }
            let percent = percent.clamp(0.0, 1.0);
            update(state, |s| {
                s.last_editor_scroll_percents
                    .insert(note_id.clone(), percent);
            })
        }
        AppAction::NoteDevtoolsToggle => {
            update(state, |s| s.dev_tools_visible = !s.dev_tools_visible)
        }
        AppAction::NoteDevtoolsSet { value } => update(state, |s| s.dev_tools_visible = *value),
        _ => Rc::clone(state),
    };
    Ok(next)
}

/// Pops history until an entry on a different screen is found.
///
/// When no entry differs from the current screen the state is left untouched.
fn navigate_back(state: &Rc<ApplicationState>) -> Rc<ApplicationState> {
    let Some(index) = state
        .nav_history
        .iter()
        .rposition(|entry| entry.kind != state.route.kind)
    else {
        return Rc::clone(state);
    };
    update(state, |s| {
        s.route = s.nav_history[index].clone();
        s.nav_history.truncate(index);
    })
}

/// Next pane set when cycling through `sequence`. Layouts outside the sequence restart it.
pub fn next_pane_layout(panes: &[Pane], sequence: LayoutButtonSequence) -> Vec<Pane> {
    let layouts = sequence.layouts();
    let next_index = PaneLayout::classify(panes)
        .and_then(|current| layouts.iter().position(|layout| *layout == current))
        .map_or(0, |index| (index + 1) % layouts.len());
    layouts[next_index].panes()
}
