//! Pushes command enablement and setting-backed check marks onto the installed menu.

use notes_command_contract::{CommandService, EnabledStateMap, MenuCommand, MenuNode};
use notes_platform_host::MenuHost;
use tracing::trace;

use crate::{commands::when_context, model::ApplicationState, settings::MANUAL_NOTE_ORDER};

/// Reverse toggle of the notes sort order; meaningless under manual ordering.
pub const NOTES_SORT_REVERSE_ID: &str = "sort:notes:reverse";

/// Updates enabled and checked flags of the installed menu in place.
///
/// Returns the enablement map that was applied, or `None` when no menu is installed. Node ids
/// missing from the installed menu are skipped.
pub fn sync_menu_states(
    menu: &dyn MenuHost,
    commands: &dyn CommandService,
    state: &ApplicationState,
    previous: Option<&EnabledStateMap>,
) -> Option<EnabledStateMap> {
    let installed = menu.installed_menu()?;

    let enabled = commands.enabled_states(&when_context(state), previous);
    for (id, value) in &enabled {
        if !menu.set_node_enabled(id.as_str(), *value) {
            trace!(command = %id, "command has no menu node");
        }
    }
    menu.set_node_enabled(
        NOTES_SORT_REVERSE_ID,
        state.notes_sort_field() != Some(MANUAL_NOTE_ORDER),
    );

    let mut checks = Vec::new();
    installed.walk(&mut |node: &MenuNode| {
        if let Some(checked) = setting_check(node, state) {
            if let Some(id) = &node.id {
                checks.push((id.clone(), checked));
            }
        }
    });
    for (id, checked) in checks {
        menu.set_node_checked(&id, checked);
    }

    Some(enabled)
}

fn setting_check(node: &MenuNode, state: &ApplicationState) -> Option<bool> {
    node.checked?;
    match node.command.as_ref()? {
        MenuCommand::ToggleSetting { key } => {
            Some(state.setting(key).and_then(|value| value.as_bool()) == Some(true))
        }
        MenuCommand::SetSetting { key, value } => Some(state.setting(key) == Some(value)),
        _ => None,
    }
}
