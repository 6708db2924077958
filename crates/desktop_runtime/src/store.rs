//! Ordered reducer pipeline and the state store that owns the current application state.

use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use tracing::trace;

use crate::{
    model::ApplicationState,
    reducer::{reduce_app, reduce_base, reduce_resource_edit_watcher, AppAction, ReducerError},
};

/// One reducer stage.
pub type ReducerFn =
    Rc<dyn Fn(&Rc<ApplicationState>, &AppAction) -> Result<Rc<ApplicationState>, ReducerError>>;

/// Read-only stage that observes the state produced by the stages before it.
pub type StateObserver = Rc<dyn Fn(&ApplicationState)>;

/// Listener notified after every dispatched action.
pub type Subscriber = Box<dyn FnMut(&AppAction, &Rc<ApplicationState>)>;

/// Actions queued for dispatch after the one in flight.
pub type ActionQueue = Rc<RefCell<VecDeque<AppAction>>>;

enum Stage {
    Reduce { name: &'static str, reducer: ReducerFn },
    Observe {
        name: &'static str,
        observer: StateObserver,
    },
}

impl Stage {
    fn name(&self) -> &'static str {
        match self {
            Self::Reduce { name, .. } | Self::Observe { name, .. } => *name,
        }
    }
}

/// Reducer stages applied in order to every action.
#[derive(Default)]
pub struct ReducerPipeline {
    stages: Vec<Stage>,
}

impl ReducerPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard shell pipeline: core UI state, resource watchers, the command enablement hook,
    /// then the settings/templates base stage.
    pub fn standard(enablement_hook: StateObserver) -> Self {
        Self::new()
            .reduce_with("app", Rc::new(reduce_app))
            .reduce_with("resource-edit-watcher", Rc::new(reduce_resource_edit_watcher))
            .observe_with("command-enablement", enablement_hook)
            .reduce_with("base", Rc::new(reduce_base))
    }

    pub fn reduce_with(mut self, name: &'static str, reducer: ReducerFn) -> Self {
        self.stages.push(Stage::Reduce { name, reducer });
        self
    }

    pub fn observe_with(mut self, name: &'static str, observer: StateObserver) -> Self {
        self.stages.push(Stage::Observe { name, observer });
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(Stage::name).collect()
    }

    /// Runs every stage. The first failing stage aborts the action.
    ///
    /// # Errors
    ///
    /// Returns the failing stage's [`ReducerError`].
    pub fn run(
        &self,
        state: &Rc<ApplicationState>,
        action: &AppAction,
    ) -> Result<Rc<ApplicationState>, ReducerError> {
        let mut current = Rc::clone(state);
        for stage in &self.stages {
            match stage {
                Stage::Reduce { name, reducer } => {
                    let next = reducer(&current, action)?;
                    if !Rc::ptr_eq(&next, &current) {
                        trace!(stage = *name, action = action.type_tag(), "state changed");
                    }
                    current = next;
                }
                Stage::Observe { observer, .. } => observer(&current),
            }
        }
        Ok(current)
    }
}

/// Holds the current state and applies actions through a [`ReducerPipeline`].
pub struct Store {
    state: Rc<ApplicationState>,
    pipeline: ReducerPipeline,
    subscribers: Vec<Subscriber>,
}

impl Store {
    pub fn new(initial: Rc<ApplicationState>, pipeline: ReducerPipeline) -> Self {
        Self {
            state: initial,
            pipeline,
            subscribers: Vec::new(),
        }
    }

    pub fn state(&self) -> Rc<ApplicationState> {
        Rc::clone(&self.state)
    }

    /// Replaces the state without running reducers or notifying subscribers.
    pub fn reset(&mut self, state: Rc<ApplicationState>) {
        self.state = state;
    }

    pub fn subscribe(&mut self, subscriber: Subscriber) {
        self.subscribers.push(subscriber);
    }

    /// Applies `action` and notifies subscribers. On error the state is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns the pipeline's [`ReducerError`].
    pub fn dispatch(&mut self, action: &AppAction) -> Result<Rc<ApplicationState>, ReducerError> {
        let next = self.pipeline.run(&self.state, action)?;
        self.state = Rc::clone(&next);
        for subscriber in &mut self.subscribers {
            subscriber(action, &next);
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn standard_pipeline_runs_stages_in_order() {
        let pipeline = ReducerPipeline::standard(Rc::new(|_state: &ApplicationState| {}));
        assert_eq!(
            pipeline.stage_names(),
            vec!["app", "resource-edit-watcher", "command-enablement", "base"]
        );
    }

    #[test]
    fn observer_sees_state_from_earlier_stages_only() {
        let observed = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&observed);
        let pipeline = ReducerPipeline::standard(Rc::new(move |state: &ApplicationState| {
            sink.borrow_mut()
                .push((state.sidebar_visibility, state.setting("locale").cloned()));
        }));
        let state = Rc::new(ApplicationState::default());

        let state = pipeline
            .run(&state, &AppAction::SidebarVisibilityToggle)
            .expect("toggle");
        pipeline
            .run(
                &state,
                &AppAction::SettingUpdateOne {
                    key: "locale".to_string(),
                    value: json!("fr_FR"),
                },
            )
            .expect("setting");

        // The base stage runs after the hook, so the setting is not visible to it yet.
        assert_eq!(*observed.borrow(), vec![(false, None), (false, None)]);
    }

    #[test]
    fn store_notifies_subscribers_and_keeps_state_on_error() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut store = Store::new(
            Rc::new(ApplicationState::default()),
            ReducerPipeline::standard(Rc::new(|_state: &ApplicationState| {})),
        );
        store.subscribe(Box::new(move |_action, _state| counter.set(counter.get() + 1)));

        store
            .dispatch(&AppAction::NotelistVisibilityToggle)
            .expect("toggle");
        assert!(!store.state().note_list_visibility);
        assert_eq!(calls.get(), 1);

        let before = store.state();
        let result = store.dispatch(&AppAction::EditorScrollPercentSet {
            note_id: "n".to_string(),
            percent: f64::INFINITY,
        });
        assert!(result.is_err());
        assert!(Rc::ptr_eq(&before, &store.state()));
        assert_eq!(calls.get(), 1);
    }
}
