//! Base reducer stage: mirrors settings and templates into application state.

use std::rc::Rc;

use crate::{
    model::ApplicationState,
    reducer::{update, AppAction, ReducerError},
};

/// Handles `SETTING_UPDATE_ONE`, `SETTING_UPDATE_ALL`, and `TEMPLATE_UPDATE_ALL`.
pub fn reduce_base(
    state: &Rc<ApplicationState>,
    action: &AppAction,
) -> Result<Rc<ApplicationState>, ReducerError> {
    let next = match action {
        AppAction::SettingUpdateOne { key, value } => {
            if key.is_empty() {
                return Err(ReducerError::transition("setting key is empty", action));
            }
            if state.settings.get(key) == Some(value) {
                Rc::clone(state)
            } else {
                update(state, |s| {
                    s.settings.insert(key.clone(), value.clone());
                })
            }
        }
        AppAction::SettingUpdateAll { settings } => {
            update(state, |s| s.settings = settings.clone())
        }
        AppAction::TemplateUpdateAll { templates } => {
            update(state, |s| s.templates = templates.clone())
        }
        _ => Rc::clone(state),
    };
    Ok(next)
}
