//! Reducer stage tracking resources opened in an external editor.

use std::rc::Rc;

use crate::{
    model::{ApplicationState, WatchedResource},
    reducer::{update, AppAction, ReducerError},
};

/// Handles the `RESOURCE_EDIT_WATCHER_*` actions; everything else passes through.
pub fn reduce_resource_edit_watcher(
    state: &Rc<ApplicationState>,
    action: &AppAction,
) -> Result<Rc<ApplicationState>, ReducerError> {
    let next = match action {
        AppAction::ResourceEditWatcherSet { id, title } => {
            let unchanged = state
                .watched_resources
                .get(id)
                .is_some_and(|watched| watched.title == *title);
            if unchanged {
                Rc::clone(state)
            } else {
                update(state, |s| {
                    s.watched_resources.insert(
                        id.clone(),
                        WatchedResource {
                            title: title.clone(),
                        },
                    );
                })
            }
        }
        AppAction::ResourceEditWatcherRemove { id } if state.watched_resources.contains_key(id) => {
            update(state, |s| {
                s.watched_resources.remove(id);
            })
        }
        AppAction::ResourceEditWatcherClear if !state.watched_resources.is_empty() => {
            update(state, |s| s.watched_resources.clear())
        }
        _ => Rc::clone(state),
    };
    Ok(next)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn set_remove_and_clear_watched_resources() {
        let state = Rc::new(ApplicationState::default());
        let set = |state: &Rc<ApplicationState>, id: &str, title: &str| {
            reduce_resource_edit_watcher(
                state,
                &AppAction::ResourceEditWatcherSet {
                    id: id.to_string(),
                    title: title.to_string(),
                },
            )
            .expect("set")
        };

        let one = set(&state, "r1", "photo.png");
        let same = set(&one, "r1", "photo.png");
        assert!(Rc::ptr_eq(&one, &same));

        let two = set(&one, "r2", "doc.pdf");
        assert_eq!(two.watched_resources.len(), 2);

        let removed = reduce_resource_edit_watcher(
            &two,
            &AppAction::ResourceEditWatcherRemove {
                id: "r1".to_string(),
            },
        )
        .expect("remove");
        assert_eq!(
            removed.watched_resources.keys().collect::<Vec<_>>(),
            vec!["r2"]
        );

        let cleared =
            reduce_resource_edit_watcher(&removed, &AppAction::ResourceEditWatcherClear)
                .expect("clear");
        assert!(cleared.watched_resources.is_empty());

        let cleared_again =
            reduce_resource_edit_watcher(&cleared, &AppAction::ResourceEditWatcherClear)
                .expect("clear");
        assert!(Rc::ptr_eq(&cleared, &cleared_again));
    }

    #[test]
    fn unrelated_actions_pass_through() {
        let state = Rc::new(ApplicationState::default());
        let next = reduce_resource_edit_watcher(&state, &AppAction::NavBack).expect("reduce");
        assert!(Rc::ptr_eq(&state, &next));
    }
}
