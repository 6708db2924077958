//! Trigger table mapping dispatched actions and changed settings to shell side effects.

use crate::{reducer::AppAction, settings::keys};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Side effects requested after an action has been reduced.
pub enum ShellEffect {
    /// Rebuild the menu for the current route's screen.
    UpdateMenuForRoute,
    /// Rebuild the menu even if the screen did not change.
    RefreshMenu,
    /// Refresh enabled and checked flags on the installed menu.
    SyncMenuStates,
    /// Copy a UI-state field into its mirrored setting and persist it.
    PersistSetting(&'static str),
    /// Push the dev tools visibility to the window.
    ToggleDevTools,
    /// Push the current locale to the host.
    ApplyLocale,
    /// Show or hide the tray icon.
    UpdateTray,
    /// Re-inject the editor font CSS.
    UpdateEditorFont,
    /// Push the zoom factor to the window.
    ApplyZoomFactor,
    /// Pick the preferred light or dark theme when auto-detection is on.
    ThemeAutoDetect,
}

/// Effects per setting key, in table order.
pub const SETTING_TRIGGERS: &[(&str, &[ShellEffect])] = &[
    (
        keys::LOCALE,
        &[ShellEffect::ApplyLocale, ShellEffect::RefreshMenu],
    ),
    (keys::SHOW_TRAY_ICON, &[ShellEffect::UpdateTray]),
    (keys::EDITOR_FONT_FAMILY, &[ShellEffect::UpdateEditorFont]),
    (keys::WINDOW_CONTENT_ZOOM_FACTOR, &[ShellEffect::ApplyZoomFactor]),
    (keys::THEME_AUTO_DETECT, &[ShellEffect::ThemeAutoDetect]),
    (keys::THEME, &[ShellEffect::ThemeAutoDetect]),
    (keys::PREFERRED_LIGHT_THEME, &[ShellEffect::ThemeAutoDetect]),
    (keys::PREFERRED_DARK_THEME, &[ShellEffect::ThemeAutoDetect]),
    (keys::LAYOUT_BUTTON_SEQUENCE, &[ShellEffect::SyncMenuStates]),
    (keys::NOTES_SORT_FIELD, &[ShellEffect::SyncMenuStates]),
    (keys::NOTES_SORT_REVERSE, &[ShellEffect::SyncMenuStates]),
    (keys::FOLDERS_SORT_FIELD, &[ShellEffect::SyncMenuStates]),
    (keys::FOLDERS_SORT_REVERSE, &[ShellEffect::SyncMenuStates]),
    (keys::SHOW_NOTE_COUNTS, &[ShellEffect::SyncMenuStates]),
    (keys::UNCOMPLETED_TODOS_ON_TOP, &[ShellEffect::SyncMenuStates]),
    (keys::SHOW_COMPLETED_TODOS, &[ShellEffect::SyncMenuStates]),
];

/// Effects triggered by a change of `key`.
pub fn setting_effects(key: &str) -> &'static [ShellEffect] {
    SETTING_TRIGGERS
        .iter()
        .find(|(trigger, _)| *trigger == key)
        .map(|(_, effects)| *effects)
        .unwrap_or(&[])
}

/// Effects for `action`, deduplicated and in first-seen order.
pub fn effects_for(action: &AppAction) -> Vec<ShellEffect> {
    let mut effects = Vec::new();
    let mut push = |effect: ShellEffect| {
        if !effects.contains(&effect) {
            effects.push(effect);
        }
    };

    match action {
        AppAction::NavGo { .. } | AppAction::NavBack => push(ShellEffect::UpdateMenuForRoute),
        AppAction::NoteVisiblePanesToggle | AppAction::NoteVisiblePanesSet { .. } => {
            push(ShellEffect::PersistSetting(keys::NOTE_VISIBLE_PANES))
        }
        AppAction::SidebarVisibilityToggle | AppAction::SidebarVisibilitySet { .. } => {
            push(ShellEffect::PersistSetting(keys::SIDEBAR_VISIBILITY))
        }
        AppAction::NotelistVisibilityToggle | AppAction::NotelistVisibilitySet { .. } => {
            push(ShellEffect::PersistSetting(keys::NOTE_LIST_VISIBILITY))
        }
        AppAction::NoteDevtoolsToggle | AppAction::NoteDevtoolsSet { .. } => {
            push(ShellEffect::ToggleDevTools)
        }
        AppAction::SettingUpdateOne { key, .. } => {
            setting_effects(key).iter().copied().for_each(&mut push)
        }
        AppAction::SettingUpdateAll { .. } => SETTING_TRIGGERS
            .iter()
            .flat_map(|(_, effects)| effects.iter().copied())
            .for_each(&mut push),
        _ => {}
    }
    effects
}
