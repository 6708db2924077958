//! Shell orchestrator: owns the store, command registry, settings, and installed menu, and routes
//! dispatched actions to their side effects.

use std::rc::Rc;

use notes_command_contract::{
    CommandService, EnabledStateMap, HostRequest, MenuCommand, MenuNode, Platform,
    PluginMenuItem, ScreenId,
};
use notes_platform_host::HostServices;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    commands::{default_command_args, register_shell_runtimes, CommandRegistry},
    error::{CollaboratorIoError, ShellError},
    menu::{build_menu, sync_menu_states, MenuBuildInput, MenuBuildState},
    model::ApplicationState,
    reducer::AppAction,
    settings::{keys, Settings},
    store::{ActionQueue, ReducerPipeline, Store, Subscriber},
    triggers::effects_for,
};

const KEYMAP_FILE_NAME: &str = "keymap-desktop.json";

/// The desktop shell core.
///
/// Actions are processed one at a time from a FIFO queue. Effects and command runtimes append
/// follow-up actions to the queue instead of dispatching recursively; the public entry points
/// ([`Application::dispatch`], [`Application::set_setting`], [`Application::handle_menu_click`])
/// drain it before returning.
pub struct Application {
    platform: Platform,
    pub(crate) services: HostServices,
    store: Store,
    commands: CommandRegistry,
    pub(crate) settings: Settings,
    plugin_items: Vec<PluginMenuItem>,
    menu_build: MenuBuildState,
    previous_enabled: Option<EnabledStateMap>,
    pending: ActionQueue,
}

impl Application {
    /// Creates the shell with the builtin command declarations and runtimes.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::Command`] when a shell runtime targets an undeclared command.
    pub fn new(platform: Platform, services: HostServices) -> Result<Self, ShellError> {
        let commands = CommandRegistry::with_builtin_declarations();
        let pending = ActionQueue::default();
        register_shell_runtimes(&commands, &pending)?;

        let hook_registry = commands.clone();
        let pipeline = ReducerPipeline::standard(Rc::new(move |state: &ApplicationState| {
            hook_registry.schedule_enablement(state)
        }));
        let settings = Settings::new();
        let store = Store::new(Rc::new(ApplicationState::hydrated(&settings)), pipeline);

        Ok(Self {
            platform,
            services,
            store,
            commands,
            settings,
            plugin_items: Vec::new(),
            menu_build: MenuBuildState::default(),
            previous_enabled: None,
            pending,
        })
    }

    /// Startup sequence: hydrate settings, load the custom keymap, build the Main menu, publish
    /// every setting, load templates, apply the dev tools flag, and synchronize the menu.
    ///
    /// Collaborator failures are reported to the user and never abort startup.
    pub async fn start(&mut self) {
        let prefs = Rc::clone(&self.services.prefs);
        for failure in self.settings.hydrate(&*prefs).await {
            warn!(error = %failure, "setting kept its default");
        }
        self.settings.take_changes();

        if let Err(err) = self.load_keymap().await {
            self.report(&err);
        }
        self.store
            .reset(Rc::new(ApplicationState::hydrated(&self.settings)));
        self.update_menu(&ScreenId::main()).await;

        self.queue(AppAction::SettingUpdateAll {
            settings: self.settings.snapshot(),
        });
        self.reload_templates().await;
        self.queue(AppAction::NoteDevtoolsSet {
            value: self.settings.bool(keys::FLAG_OPEN_DEV_TOOLS),
        });
        if let Err(err) = self.drain_pending().await {
            warn!(error = %err, "startup action failed");
        }

        self.update_menu_item_states();
        info!(platform = self.platform.as_str(), "shell started");
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn state(&self) -> Rc<ApplicationState> {
        self.store.state()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn menu_build_state(&self) -> &MenuBuildState {
        &self.menu_build
    }

    pub fn subscribe(&mut self, subscriber: Subscriber) {
        self.store.subscribe(subscriber);
    }

    /// Dispatches `action` and every follow-up action it triggers.
    ///
    /// # Errors
    ///
    /// Returns the first failure among the processed actions. Later actions still run.
    pub async fn dispatch(&mut self, action: AppAction) -> Result<Rc<ApplicationState>, ShellError> {
        self.queue(action);
        self.drain_pending().await?;
        Ok(self.store.state())
    }

    /// Dispatches an action in its wire form.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::MalformedAction`] when a recognized action has malformed fields, or
    /// any error from [`Application::dispatch`].
    pub async fn dispatch_wire(&mut self, raw: Value) -> Result<Rc<ApplicationState>, ShellError> {
        let action = AppAction::from_wire(raw)
            .map_err(|err| ShellError::MalformedAction(err.to_string()))?;
        self.dispatch(action).await
    }

    /// Sets and persists a setting, then runs its triggers. Returns whether the value changed.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::Settings`] for unknown keys or invalid values.
    pub async fn set_setting(&mut self, key: &str, value: Value) -> Result<bool, ShellError> {
        let changed = self.queue_setting(key, value).await?;
        self.drain_pending().await?;
        Ok(changed)
    }

    /// Replaces plugin-contributed menu items and rebuilds the menu.
    pub async fn set_plugin_items(&mut self, items: Vec<PluginMenuItem>) {
        self.plugin_items = items;
        self.refresh_menu().await;
    }

    /// Reloads the custom keymap and rebuilds the menu so new accelerators show up.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::Collaborator`] when the keymap file cannot be read and
    /// [`ShellError::Keymap`] when it is invalid. The previous keymap stays in effect.
    pub async fn reload_keymap(&mut self) -> Result<(), ShellError> {
        self.load_keymap().await?;
        self.refresh_menu().await;
        Ok(())
    }

    /// Builds and installs the menu for `screen` unless it is already installed.
    pub async fn update_menu(&mut self, screen: &ScreenId) {
        if self.menu_build.is_current(screen) {
            debug!(screen = %screen, "menu is current");
            return;
        }

        let template_dir = self.settings.text(keys::TEMPLATE_DIR).to_string();
        let profile = Rc::clone(&self.services.profile);
        let template_dir_exists = profile.exists(&template_dir).await;
        let modules = self.services.interop.modules();

        let input = MenuBuildInput {
            screen,
            platform: self.platform,
            commands: &self.commands,
            settings: &self.settings,
            interop_modules: &modules,
            template_dir_exists,
            plugin_items: &self.plugin_items,
        };
        let (next, menu) = build_menu(std::mem::take(&mut self.menu_build), &input);
        self.menu_build = next;

        if let Some(menu) = menu {
            self.services.menu.install_menu(menu);
            // Fresh nodes are all enabled; push the full map again.
            self.previous_enabled = None;
            self.update_menu_item_states();
        }
    }

    /// Rebuilds the menu for the last built screen (or the current route) even if unchanged.
    pub async fn refresh_menu(&mut self) {
        let screen = self
            .menu_build
            .last_screen()
            .cloned()
            .unwrap_or_else(|| self.store.state().route_kind().clone());
        self.menu_build.invalidate();
        self.update_menu(&screen).await;
    }

    /// Refreshes enabled and checked flags on the installed menu.
    pub fn update_menu_item_states(&mut self) {
        let state = self.store.state();
        if let Some(applied) = sync_menu_states(
            &*self.services.menu,
            &self.commands,
            &state,
            self.previous_enabled.as_ref(),
        ) {
            self.previous_enabled = Some(applied);
        }
    }

    /// Runs the command attached to a menu node (installed menu first, then the tray menu).
    /// Disabled nodes and nodes without a command are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::UnknownMenuItem`] for ids in neither menu, and command, setting, or
    /// action errors raised by the node's command.
    pub async fn handle_menu_click(&mut self, node_id: &str) -> Result<(), ShellError> {
        let node = self
            .services
            .menu
            .installed_menu()
            .and_then(|menu| menu.find(node_id).cloned())
            .or_else(|| tray_menu().find(node_id).cloned())
            .ok_or_else(|| ShellError::UnknownMenuItem(node_id.to_string()))?;
        if !node.enabled {
            debug!(node = node_id, "ignoring click on disabled menu item");
            return Ok(());
        }
        let Some(command) = node.command else {
            return Ok(());
        };

        let result = self.run_menu_command(command).await;
        if let Err(err) = &result {
            warn!(node = node_id, error = %err, "menu command failed");
        }
        let drained = self.drain_pending().await;
        result.and(drained)
    }

    async fn run_menu_command(&mut self, command: MenuCommand) -> Result<(), ShellError> {
        match command {
            MenuCommand::Execute { command, args } => {
                let args = if args.is_null() {
                    default_command_args(&self.state())
                } else {
                    args
                };
                self.commands.execute(&command, args)?;
            }
            MenuCommand::Dispatch { action } => {
                let action = AppAction::from_wire(action)
                    .map_err(|err| ShellError::MalformedAction(err.to_string()))?;
                self.queue(action);
            }
            MenuCommand::SetSetting { key, value } => {
                self.queue_setting(&key, value).await?;
            }
            MenuCommand::ToggleSetting { key } => {
                self.settings.toggle(&key)?;
                self.flush_setting_changes().await;
            }
            MenuCommand::IncrementSetting { key, delta } => {
                self.settings.increment(&key, delta)?;
                self.flush_setting_changes().await;
            }
            MenuCommand::Host { request } => self.run_host_request(&request).await,
        }
        Ok(())
    }

    async fn run_host_request(&mut self, request: &HostRequest) {
        if matches!(request, HostRequest::RefreshTemplates) {
            self.reload_templates().await;
            return;
        }
        let shell = Rc::clone(&self.services.shell);
        if let Err(message) = shell.run_request(request).await {
            self.report(&CollaboratorIoError::new("host request", message).into());
        }
    }

    pub(crate) fn queue(&self, action: AppAction) {
        self.pending.borrow_mut().push_back(action);
    }

    async fn drain_pending(&mut self) -> Result<(), ShellError> {
        let mut first_error = None;
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(action) = next else {
                break;
            };
            if let Err(err) = self.apply(action).await {
                warn!(error = %err, "action failed");
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    async fn apply(&mut self, action: AppAction) -> Result<(), ShellError> {
        debug!(action = action.type_tag(), "dispatching");
        self.store.dispatch(&action)?;
        self.run_effects(&effects_for(&action)).await;
        if self.commands.take_enabled_state_change() {
            self.update_menu_item_states();
        }
        Ok(())
    }

    /// Sets a setting and queues its change notification without draining the queue.
    pub(crate) async fn queue_setting(
        &mut self,
        key: &str,
        value: Value,
    ) -> Result<bool, ShellError> {
        let changed = self.settings.set(key, value)?;
        self.flush_setting_changes().await;
        Ok(changed)
    }

    /// Persists every changed setting and queues a `SETTING_UPDATE_ONE` per key.
    pub(crate) async fn flush_setting_changes(&mut self) {
        let prefs = Rc::clone(&self.services.prefs);
        for key in self.settings.take_changes() {
            if let Err(err) = self.settings.persist(&*prefs, &key).await {
                warn!(key = %key, error = %err, "failed to persist setting");
            }
            if let Some(value) = self.settings.get(&key).cloned() {
                self.queue(AppAction::SettingUpdateOne { key, value });
            }
        }
    }

    async fn reload_templates(&mut self) {
        let dir = self.settings.text(keys::TEMPLATE_DIR).to_string();
        let profile = Rc::clone(&self.services.profile);
        match profile.load_templates(&dir).await {
            Ok(templates) => {
                debug!(dir = %dir, count = templates.len(), "templates loaded");
                self.queue(AppAction::TemplateUpdateAll { templates });
            }
            Err(message) => self.report(&CollaboratorIoError::new(dir, message).into()),
        }
    }

    fn keymap_path(&self) -> String {
        let profile_dir = self.settings.text(keys::PROFILE_DIR).trim_end_matches('/');
        format!("{profile_dir}/{KEYMAP_FILE_NAME}")
    }

    async fn load_keymap(&mut self) -> Result<(), ShellError> {
        let path = self.keymap_path();
        let profile = Rc::clone(&self.services.profile);
        let raw = profile
            .read_text(&path)
            .await
            .map_err(|message| CollaboratorIoError::new(&path, message))?;
        let Some(raw) = raw else {
            debug!(path = %path, "no custom keymap");
            return Ok(());
        };
        let mut keymap = self.commands.keymap();
        let changed = keymap
            .apply_overrides_json(&raw)
            .map_err(|source| ShellError::Keymap {
                path: path.clone(),
                source,
            })?;
        info!(path = %path, changed, "custom keymap loaded");
        self.commands.set_keymap(keymap);
        Ok(())
    }

    /// Logs `error` and shows it to the user.
    pub(crate) fn report(&self, error: &ShellError) {
        warn!(error = %error, "collaborator failed");
        self.services.shell.show_error_message_box(&error.to_string());
    }
}

/// Tray icon menu.
pub fn tray_menu() -> MenuNode {
    MenuNode::submenu(
        "",
        vec![
            MenuNode::leaf("Open Notes")
                .with_id("tray:open")
                .with_command(MenuCommand::Host {
                    request: HostRequest::ShowWindow,
                }),
            MenuNode::separator(),
            MenuNode::leaf("Exit")
                .with_id("tray:exit")
                .with_command(MenuCommand::Host {
                    request: HostRequest::Quit,
                }),
        ],
    )
    .with_id("tray")
}
