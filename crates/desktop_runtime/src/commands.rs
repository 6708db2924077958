//! Command registry: declarations, runtimes, enablement evaluation, and menu materialization.

use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use notes_command_contract::{
    CommandDeclaration, CommandError, CommandId, CommandService, EnabledStateMap, EnabledWhen,
    MenuCommand, MenuNode, ScreenId, WhenContext,
};
use serde_json::Value;
use tracing::{debug, trace};

use crate::{
    keymap::Keymap,
    model::{ApplicationState, Pane},
    reducer::AppAction,
    settings::MANUAL_NOTE_ORDER,
    store::ActionQueue,
};

/// Context flag names produced by [`when_context`].
pub mod flags {
    pub const MAIN_SCREEN: &str = "mainScreen";
    pub const EDITOR_VISIBLE: &str = "editorVisible";
    pub const VIEWER_VISIBLE: &str = "viewerVisible";
    pub const SIDEBAR_VISIBLE: &str = "sidebarVisible";
    pub const NOTE_LIST_VISIBLE: &str = "noteListVisible";
    pub const DEV_TOOLS_VISIBLE: &str = "devToolsVisible";
    pub const HAS_WATCHED_NOTE_FILES: &str = "hasWatchedNoteFiles";
    pub const HAS_WATCHED_RESOURCES: &str = "hasWatchedResources";
    pub const HAS_TEMPLATES: &str = "hasTemplates";
    pub const ONE_NOTE_SELECTED: &str = "oneNoteSelected";
    pub const MANUAL_NOTE_ORDER: &str = "manualNoteOrder";
}

/// Handler bound to a declared command.
pub type CommandRuntime = Rc<dyn Fn(Value) -> Result<(), String>>;

/// Derives the enablement context from application state.
pub fn when_context(state: &ApplicationState) -> WhenContext {
    WhenContext::new()
        .with(flags::MAIN_SCREEN, state.route_kind().as_str() == ScreenId::MAIN)
        .with(
            flags::EDITOR_VISIBLE,
            state.note_visible_panes.contains(&Pane::Editor),
        )
        .with(
            flags::VIEWER_VISIBLE,
            state.note_visible_panes.contains(&Pane::Viewer),
        )
        .with(flags::SIDEBAR_VISIBLE, state.sidebar_visibility)
        .with(flags::NOTE_LIST_VISIBLE, state.note_list_visibility)
        .with(flags::DEV_TOOLS_VISIBLE, state.dev_tools_visible)
        .with(
            flags::HAS_WATCHED_NOTE_FILES,
            !state.watched_note_files.is_empty(),
        )
        .with(
            flags::HAS_WATCHED_RESOURCES,
            !state.watched_resources.is_empty(),
        )
        .with(flags::HAS_TEMPLATES, !state.templates.is_empty())
        .with(
            flags::ONE_NOTE_SELECTED,
            state.single_selected_note().is_some(),
        )
        .with(
            flags::MANUAL_NOTE_ORDER,
            state.notes_sort_field() == Some(MANUAL_NOTE_ORDER),
        )
}

fn on_main() -> EnabledWhen {
    EnabledWhen::flag(flags::MAIN_SCREEN)
}

fn on_main_and(flag: &str) -> EnabledWhen {
    EnabledWhen::All(vec![on_main(), EnabledWhen::flag(flag)])
}

/// Declarations of every command the shell menus reference.
pub fn builtin_declarations() -> Vec<CommandDeclaration> {
    fn decl(id: &str, label: &str) -> CommandDeclaration {
        CommandDeclaration::new(id, label)
    }

    vec![
        // Global commands.
        decl("historyBackward", "Back"),
        decl("historyForward", "Forward"),
        decl("synchronize", "Synchronise").accelerator("CommandOrControl+S"),
        decl("startExternalEditing", "Edit in external editor")
            .accelerator("CommandOrControl+E")
            .enabled_when(on_main_and(flags::ONE_NOTE_SELECTED)),
        decl("stopExternalEditing", "Stop external editing")
            .enabled_when(EnabledWhen::flag(flags::HAS_WATCHED_NOTE_FILES)),
        // Main screen commands.
        decl("newNote", "New note")
            .accelerator("CommandOrControl+N")
            .enabled_when(on_main()),
        decl("newTodo", "New to-do")
            .accelerator("CommandOrControl+T")
            .enabled_when(on_main()),
        decl("newNotebook", "New notebook").enabled_when(on_main()),
        decl("print", "Print")
            .accelerator("CommandOrControl+P")
            .enabled_when(on_main()),
        decl("exportPdf", "PDF - PDF File").enabled_when(on_main()),
        decl("selectTemplate", "Templates").enabled_when(EnabledWhen::All(vec![
            on_main(),
            EnabledWhen::flag(flags::HAS_TEMPLATES),
        ])),
        decl("setTags", "Tags")
            .accelerator("CommandOrControl+Alt+T")
            .enabled_when(on_main()),
        decl("showNoteContentProperties", "Statistics...").enabled_when(on_main()),
        decl("showNoteProperties", "Note properties").enabled_when(on_main()),
        decl("toggleSidebar", "Toggle sidebar")
            .accelerator("F10")
            .enabled_when(on_main()),
        decl("toggleNoteList", "Toggle note list").enabled_when(on_main()),
        decl("toggleVisiblePanes", "Toggle editor layout")
            .accelerator("CommandOrControl+L")
            .enabled_when(on_main()),
        decl("focusSearch", "Search in all the notes")
            .accelerator("F6")
            .enabled_when(on_main()),
        decl("showLocalSearch", "Search in current note")
            .accelerator("CommandOrControl+F")
            .enabled_when(on_main()),
        decl("focusElementSideBar", "Sidebar")
            .accelerator("CommandOrControl+Shift+S")
            .enabled_when(on_main_and(flags::SIDEBAR_VISIBLE)),
        decl("focusElementNoteList", "Note list")
            .accelerator("CommandOrControl+Shift+L")
            .enabled_when(on_main_and(flags::NOTE_LIST_VISIBLE)),
        decl("focusElementNoteTitle", "Note title")
            .accelerator("CommandOrControl+Shift+N")
            .enabled_when(on_main()),
        decl("focusElementNoteBody", "Note body")
            .accelerator("CommandOrControl+Shift+B")
            .enabled_when(on_main_and(flags::EDITOR_VISIBLE)),
        // Editor commands.
        decl("textCopy", "Copy").accelerator("CommandOrControl+C"),
        decl("textCut", "Cut").accelerator("CommandOrControl+X"),
        decl("textPaste", "Paste").accelerator("CommandOrControl+V"),
        decl("textSelectAll", "Select all").accelerator("CommandOrControl+A"),
        decl("textBold", "Bold")
            .accelerator("CommandOrControl+B")
            .enabled_when(on_main_and(flags::EDITOR_VISIBLE)),
        decl("textItalic", "Italic")
            .accelerator("CommandOrControl+I")
            .enabled_when(on_main_and(flags::EDITOR_VISIBLE)),
        decl("textLink", "Hyperlink")
            .accelerator("CommandOrControl+K")
            .enabled_when(on_main_and(flags::EDITOR_VISIBLE)),
        decl("textCode", "Code")
            .accelerator("CommandOrControl+`")
            .enabled_when(on_main_and(flags::EDITOR_VISIBLE)),
        decl("insertDateTime", "Insert Date Time")
            .accelerator("CommandOrControl+Shift+T")
            .enabled_when(on_main_and(flags::EDITOR_VISIBLE)),
        decl("attachFile", "Attach file").enabled_when(on_main_and(flags::EDITOR_VISIBLE)),
    ]
}

#[derive(Default)]
struct RegistryState {
    declarations: BTreeMap<CommandId, CommandDeclaration>,
    runtimes: BTreeMap<CommandId, CommandRuntime>,
    keymap: Keymap,
    evaluated: Option<(WhenContext, EnabledStateMap)>,
    evaluations: u64,
    notified: Option<EnabledStateMap>,
    enabled_changed: bool,
}

impl RegistryState {
    fn evaluate(&mut self, context: &WhenContext) -> EnabledStateMap {
        if let Some((cached_context, cached)) = &self.evaluated {
            if cached_context == context {
                return cached.clone();
            }
        }
        let enabled: EnabledStateMap = self
            .declarations
            .values()
            .map(|decl| (decl.id.clone(), decl.enabled_when.evaluate(context)))
            .collect();
        self.evaluations += 1;
        self.evaluated = Some((context.clone(), enabled.clone()));
        enabled
    }
}

/// Shared command registry. Clones refer to the same registry.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    state: Rc<RefCell<RegistryState>>,
}

impl CommandRegistry {
    /// Registry holding [`builtin_declarations`] and the menu keymap defaults.
    pub fn with_builtin_declarations() -> Self {
        let registry = Self::default();
        registry.state.borrow_mut().keymap = Keymap::with_menu_defaults();
        for declaration in builtin_declarations() {
            registry.register_declaration(declaration);
        }
        registry
    }

    /// Adds (or replaces) a declaration and seeds its default accelerator in the keymap.
    pub fn register_declaration(&self, declaration: CommandDeclaration) {
        let mut state = self.state.borrow_mut();
        state.keymap.register_default(
            declaration.id.as_str(),
            declaration.default_accelerator.clone(),
        );
        state
            .declarations
            .insert(declaration.id.clone(), declaration);
        state.evaluated = None;
    }

    /// Binds a runtime to a declared command.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::NotFound`] when the command was never declared.
    pub fn register_runtime(
        &self,
        id: impl Into<CommandId>,
        runtime: CommandRuntime,
    ) -> Result<(), CommandError> {
        let id = id.into();
        let mut state = self.state.borrow_mut();
        if !state.declarations.contains_key(&id) {
            return Err(CommandError::NotFound(id));
        }
        state.runtimes.insert(id, runtime);
        Ok(())
    }

    pub fn declared_ids(&self) -> Vec<CommandId> {
        self.state.borrow().declarations.keys().cloned().collect()
    }

    pub fn keymap(&self) -> Keymap {
        self.state.borrow().keymap.clone()
    }

    pub fn set_keymap(&self, keymap: Keymap) {
        self.state.borrow_mut().keymap = keymap;
    }

    /// Recomputes enablement for `state` and marks a pending change notification when the result
    /// differs from the last notified map. Runs as an observer stage of the reducer pipeline.
    pub fn schedule_enablement(&self, state: &ApplicationState) {
        let context = when_context(state);
        let mut registry = self.state.borrow_mut();
        let enabled = registry.evaluate(&context);
        if registry.notified.as_ref() != Some(&enabled) {
            trace!("command enablement changed");
            registry.notified = Some(enabled);
            registry.enabled_changed = true;
        }
    }

    /// Consumes the pending enablement-change notification.
    pub fn take_enabled_state_change(&self) -> bool {
        std::mem::take(&mut self.state.borrow_mut().enabled_changed)
    }

    /// Number of full enablement evaluations performed (memoized lookups excluded).
    pub fn evaluation_count(&self) -> u64 {
        self.state.borrow().evaluations
    }
}

impl CommandService for CommandRegistry {
    fn declaration(&self, id: &CommandId) -> Option<CommandDeclaration> {
        self.state.borrow().declarations.get(id).cloned()
    }

    fn enabled_states(
        &self,
        context: &WhenContext,
        _previous: Option<&EnabledStateMap>,
    ) -> EnabledStateMap {
        // Memoized on the context.
        self.state.borrow_mut().evaluate(context)
    }

    fn command_to_menu_item(&self, id: &CommandId) -> Result<MenuNode, CommandError> {
        let state = self.state.borrow();
        let declaration = state
            .declarations
            .get(id)
            .ok_or_else(|| CommandError::NotFound(id.clone()))?;
        Ok(MenuNode::leaf(declaration.label.clone())
            .with_id(id.as_str())
            .with_accelerator(state.keymap.accelerator(id.as_str()))
            .with_command(MenuCommand::Execute {
                command: id.clone(),
                args: Value::Null,
            }))
    }

    fn accelerator(&self, name: &str) -> Option<String> {
        self.state.borrow().keymap.accelerator(name)
    }

    fn execute(&self, id: &CommandId, args: Value) -> Result<(), CommandError> {
        let runtime = {
            let state = self.state.borrow();
            if !state.declarations.contains_key(id) {
                return Err(CommandError::NotFound(id.clone()));
            }
            state
                .runtimes
                .get(id)
                .cloned()
                .ok_or_else(|| CommandError::NoRuntime(id.clone()))?
        };
        debug!(command = %id, "executing command");
        runtime(args).map_err(|message| CommandError::Failed {
            command: id.clone(),
            message,
        })
    }
}

fn note_id_arg(args: &Value) -> Option<String> {
    args.get("noteId")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Arguments a menu click passes to a command declared without explicit ones: the single
/// selected note, when there is one.
pub fn default_command_args(state: &ApplicationState) -> Value {
    match state.single_selected_note() {
        Some(id) => serde_json::json!({ "noteId": id }),
        None => Value::Null,
    }
}

/// Binds the commands whose behavior is a plain state transition. Runtimes enqueue their action
/// on `queue`; the shell drains it after the current dispatch.
///
/// # Errors
///
/// Returns [`CommandError::NotFound`] when a bound command is not declared.
pub fn register_shell_runtimes(
    registry: &CommandRegistry,
    queue: &ActionQueue,
) -> Result<(), CommandError> {
    let simple: [(&str, AppAction); 4] = [
        ("historyBackward", AppAction::NavBack),
        ("toggleSidebar", AppAction::SidebarVisibilityToggle),
        ("toggleNoteList", AppAction::NotelistVisibilityToggle),
        ("toggleVisiblePanes", AppAction::NoteVisiblePanesToggle),
    ];
    for (id, action) in simple {
        let queue = Rc::clone(queue);
        registry.register_runtime(
            id,
            Rc::new(move |_args| {
                queue.borrow_mut().push_back(action.clone());
                Ok(())
            }),
        )?;
    }

    let start_queue = Rc::clone(queue);
    registry.register_runtime(
        "startExternalEditing",
        Rc::new(move |args| {
            let id = note_id_arg(&args).ok_or_else(|| "no note to edit".to_string())?;
            start_queue
                .borrow_mut()
                .push_back(AppAction::NoteFileWatcherAdd { id });
            Ok(())
        }),
    )?;

    let stop_queue = Rc::clone(queue);
    registry.register_runtime(
        "stopExternalEditing",
        Rc::new(move |args| {
            let action = match note_id_arg(&args) {
                Some(id) => AppAction::NoteFileWatcherRemove { id },
                None => AppAction::NoteFileWatcherClear,
            };
            stop_queue.borrow_mut().push_back(action);
            Ok(())
        }),
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::Route;

    #[test]
    fn builtin_accelerators_are_unique() {
        let registry = CommandRegistry::with_builtin_declarations();
        assert!(registry.keymap().validate().is_ok());
        assert_eq!(
            registry.accelerator("newNote").as_deref(),
            Some("CommandOrControl+N")
        );
        assert_eq!(registry.accelerator("quit").as_deref(), Some("CommandOrControl+Q"));
    }

    #[test]
    fn enablement_follows_screen_and_panes() {
        let registry = CommandRegistry::with_builtin_declarations();
        let mut state = ApplicationState::default();

        let main = registry.enabled_states(&when_context(&state), None);
        assert_eq!(main.get(&CommandId::new("newNote")), Some(&true));
        assert_eq!(main.get(&CommandId::new("textBold")), Some(&true));
        assert_eq!(main.get(&CommandId::new("stopExternalEditing")), Some(&false));
        assert_eq!(main.get(&CommandId::new("startExternalEditing")), Some(&false));

        state.selected_note_ids = vec!["n1".to_string()];
        let selected = registry.enabled_states(&when_context(&state), Some(&main));
        assert_eq!(selected.get(&CommandId::new("startExternalEditing")), Some(&true));
        assert_eq!(
            default_command_args(&state),
            json!({ "noteId": "n1" })
        );
        state.selected_note_ids.clear();

        state.note_visible_panes = vec![Pane::Viewer];
        let viewer_only = registry.enabled_states(&when_context(&state), Some(&main));
        assert_eq!(viewer_only.get(&CommandId::new("textBold")), Some(&false));

        state.route = Route::new(ScreenId::CONFIG);
        let config = registry.enabled_states(&when_context(&state), Some(&viewer_only));
        assert_eq!(config.get(&CommandId::new("newNote")), Some(&false));
        assert_eq!(config.get(&CommandId::new("textCopy")), Some(&true));
    }

    #[test]
    fn enablement_is_memoized_on_context() {
        let registry = CommandRegistry::with_builtin_declarations();
        let context = when_context(&ApplicationState::default());
        let first = registry.enabled_states(&context, None);
        let second = registry.enabled_states(&context, Some(&first));
        assert_eq!(first, second);
        assert_eq!(registry.evaluation_count(), 1);
    }

    #[test]
    fn schedule_enablement_flags_only_real_changes() {
        let registry = CommandRegistry::with_builtin_declarations();
        let state = ApplicationState::default();

        registry.schedule_enablement(&state);
        assert!(registry.take_enabled_state_change());
        registry.schedule_enablement(&state);
        assert!(!registry.take_enabled_state_change());

        let mut config = state.clone();
        config.route = Route::new(ScreenId::CONFIG);
        registry.schedule_enablement(&config);
        assert!(registry.take_enabled_state_change());
    }

    #[test]
    fn menu_items_carry_label_accelerator_and_command() {
        let registry = CommandRegistry::with_builtin_declarations();
        let item = registry
            .command_to_menu_item(&CommandId::new("print"))
            .expect("menu item");
        assert_eq!(item.id.as_deref(), Some("print"));
        assert_eq!(item.label, "Print");
        assert_eq!(item.accelerator.as_deref(), Some("CommandOrControl+P"));
        assert_eq!(
            registry.command_to_menu_item(&CommandId::new("missing")),
            Err(CommandError::NotFound(CommandId::new("missing")))
        );
    }

    #[test]
    fn shell_runtimes_enqueue_actions() {
        let registry = CommandRegistry::with_builtin_declarations();
        let queue = ActionQueue::default();
        register_shell_runtimes(&registry, &queue).expect("register");

        registry
            .execute(&CommandId::new("toggleSidebar"), Value::Null)
            .expect("toggle");
        registry
            .execute(
                &CommandId::new("startExternalEditing"),
                json!({ "noteId": "n1" }),
            )
            .expect("start editing");
        assert_eq!(
            queue.borrow().iter().cloned().collect::<Vec<_>>(),
            vec![
                AppAction::SidebarVisibilityToggle,
                AppAction::NoteFileWatcherAdd {
                    id: "n1".to_string()
                },
            ]
        );

        assert!(matches!(
            registry.execute(&CommandId::new("startExternalEditing"), Value::Null),
            Err(CommandError::Failed { .. })
        ));
        queue.borrow_mut().clear();
        registry
            .execute(&CommandId::new("stopExternalEditing"), Value::Null)
            .expect("stop all");
        registry
            .execute(
                &CommandId::new("stopExternalEditing"),
                json!({ "noteId": "n1" }),
            )
            .expect("stop one");
        assert_eq!(
            queue.borrow().iter().cloned().collect::<Vec<_>>(),
            vec![
                AppAction::NoteFileWatcherClear,
                AppAction::NoteFileWatcherRemove {
                    id: "n1".to_string()
                },
            ]
        );
        assert_eq!(
            registry.execute(&CommandId::new("print"), Value::Null),
            Err(CommandError::NoRuntime(CommandId::new("print")))
        );
    }
}
