//! Menu template assembly for a screen and platform.

use notes_command_contract::{
    CommandId, CommandService, HostRequest, ImportSource, MenuCommand, MenuNode, Platform,
    PluginMenuItem, ScreenId,
};
use notes_platform_host::{InteropModule, InteropModuleKind};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::{
    keymap::entries,
    menu::prune::filter_menu,
    model::Route,
    reducer::AppAction,
    settings::{keys, Settings},
};

pub const ROOT_MENU_ID: &str = "root";

const WEBSITE_URL: &str = "https://joplinapp.org";
const FORUM_URL: &str = "https://discourse.joplinapp.org";
const DONATE_URL: &str = "https://joplinapp.org/donate/";

/// Remembers the screen the installed menu was built for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuBuildState {
    last_screen: Option<ScreenId>,
    build_count: u64,
}

impl MenuBuildState {
    pub fn last_screen(&self) -> Option<&ScreenId> {
        self.last_screen.as_ref()
    }

    /// Number of menus built so far.
    pub fn build_count(&self) -> u64 {
        self.build_count
    }

    pub fn is_current(&self, screen: &ScreenId) -> bool {
        self.last_screen.as_ref() == Some(screen)
    }

    /// Forgets the last screen so the next build runs even for the same screen.
    pub fn invalidate(&mut self) {
        self.last_screen = None;
    }
}

/// Everything the builder reads.
pub struct MenuBuildInput<'a> {
    pub screen: &'a ScreenId,
    pub platform: Platform,
    pub commands: &'a dyn CommandService,
    pub settings: &'a Settings,
    pub interop_modules: &'a [InteropModule],
    pub template_dir_exists: bool,
    pub plugin_items: &'a [PluginMenuItem],
}

/// Builds the menu tree for `input.screen`.
///
/// Returns `None` (and the unchanged state) when the last build was for the same screen; call
/// [`MenuBuildState::invalidate`] first to force a rebuild.
pub fn build_menu(
    mut state: MenuBuildState,
    input: &MenuBuildInput<'_>,
) -> (MenuBuildState, Option<MenuNode>) {
    if state.is_current(input.screen) {
        debug!(screen = %input.screen, "menu already built for screen");
        return (state, None);
    }

    let mut roots = RootMenus::assemble(input);
    for plugin in input.plugin_items {
        roots
            .parent_mut(&plugin.parent, input.platform)
            .children
            .push(plugin.item.clone());
    }
    let items = filter_menu(roots.into_items(), input.screen, input.platform);

    state.last_screen = Some(input.screen.clone());
    state.build_count += 1;
    debug!(
        screen = %input.screen,
        platform = input.platform.as_str(),
        build = state.build_count,
        "menu built"
    );
    (
        state,
        Some(MenuNode::submenu("", items).with_id(ROOT_MENU_ID)),
    )
}

struct RootMenus {
    primary: MenuNode,
    mac_file: MenuNode,
    edit: MenuNode,
    view: MenuNode,
    note: MenuNode,
    tools: MenuNode,
    help: MenuNode,
}

impl RootMenus {
    fn assemble(input: &MenuBuildInput<'_>) -> Self {
        let (primary_label, primary_id) = if input.platform.has_unified_app_menu() {
            ("&Notes", "menu:app")
        } else {
            ("&File", "menu:file")
        };
        Self {
            primary: MenuNode::submenu(primary_label, primary_items(input)).with_id(primary_id),
            mac_file: MenuNode::submenu("&File", mac_file_items(input))
                .with_id("menu:file")
                .on_platforms([Platform::Darwin]),
            edit: MenuNode::submenu("&Edit", edit_items(input)).with_id("menu:edit"),
            view: MenuNode::submenu("&View", view_items(input)).with_id("menu:view"),
            note: MenuNode::submenu("&Note", note_items(input)).with_id("menu:note"),
            tools: MenuNode::submenu("&Tools", tools_items(input)).with_id("menu:tools"),
            help: MenuNode::submenu("&Help", help_items(input))
                .with_id("menu:help")
                .with_role("help"),
        }
    }

    fn parent_mut(&mut self, key: &str, platform: Platform) -> &mut MenuNode {
        match key {
            "file" if platform.has_unified_app_menu() => &mut self.mac_file,
            "file" => &mut self.primary,
            "edit" => &mut self.edit,
            "view" => &mut self.view,
            "note" => &mut self.note,
            "tools" => &mut self.tools,
            "help" => &mut self.help,
            other => {
                warn!(parent = other, "unknown plugin menu parent, using tools");
                &mut self.tools
            }
        }
    }

    fn into_items(self) -> Vec<MenuNode> {
        vec![
            self.primary,
            self.mac_file,
            self.edit,
            self.view,
            self.note,
            self.tools,
            self.help,
        ]
    }
}

fn command_item(input: &MenuBuildInput<'_>, id: &str) -> MenuNode {
    match input.commands.command_to_menu_item(&CommandId::new(id)) {
        Ok(node) => node,
        Err(err) => {
            warn!(command = id, error = %err, "menu references an undeclared command");
            MenuNode::leaf(id).with_id(id).visible(false)
        }
    }
}

fn host(request: HostRequest) -> MenuCommand {
    MenuCommand::Host { request }
}

fn dispatch(action: AppAction) -> MenuCommand {
    MenuCommand::Dispatch {
        action: action.to_wire(),
    }
}

fn navigate(screen: &str) -> MenuCommand {
    dispatch(AppAction::NavGo {
        route: Route::new(screen),
    })
}

fn main_only(node: MenuNode) -> MenuNode {
    node.on_screens([ScreenId::MAIN])
}

fn main_separator() -> MenuNode {
    main_only(MenuNode::separator())
}

fn on_mac(node: MenuNode) -> MenuNode {
    node.on_platforms([Platform::Darwin])
}

fn off_mac(node: MenuNode) -> MenuNode {
    node.on_platforms(Platform::without_unified_app_menu())
}

fn sync_status_item() -> MenuNode {
    MenuNode::leaf("Synchronisation Status")
        .with_id("sync:status")
        .with_command(navigate(ScreenId::STATUS))
}

fn primary_items(input: &MenuBuildInput<'_>) -> Vec<MenuNode> {
    let accelerator = |name: &str| input.commands.accelerator(name);
    vec![
        on_mac(
            MenuNode::leaf("About Notes")
                .with_id("app:about")
                .with_command(host(HostRequest::About)),
        ),
        on_mac(MenuNode::separator()),
        on_mac(
            MenuNode::leaf("Preferences...")
                .with_id("app:preferences")
                .with_accelerator(accelerator(entries::CONFIG))
                .with_command(navigate(ScreenId::CONFIG)),
        ),
        on_mac(
            MenuNode::leaf("Check for updates...")
                .with_id("app:checkForUpdates")
                .with_command(host(HostRequest::CheckForUpdates)),
        ),
        on_mac(MenuNode::separator()),
        off_mac(command_item(input, "newNote")),
        off_mac(command_item(input, "newTodo")),
        off_mac(command_item(input, "newNotebook")),
        off_mac(MenuNode::separator()),
        off_mac(templates_menu(input)),
        off_mac(MenuNode::separator()),
        off_mac(import_menu(input)),
        off_mac(export_menu(input)),
        MenuNode::separator(),
        command_item(input, "synchronize"),
        on_mac(sync_status_item()),
        off_mac(MenuNode::separator()),
        off_mac(command_item(input, "print")),
        on_mac(MenuNode::separator()),
        on_mac(
            MenuNode::leaf("Hide Notes")
                .with_id("app:hide")
                .with_accelerator(accelerator(entries::HIDE_APP))
                .with_command(host(HostRequest::HideApp)),
        ),
        MenuNode::separator(),
        MenuNode::leaf("Quit")
            .with_id("app:quit")
            .with_accelerator(accelerator(entries::QUIT))
            .with_command(host(HostRequest::Quit)),
    ]
}

fn mac_file_items(input: &MenuBuildInput<'_>) -> Vec<MenuNode> {
    vec![
        command_item(input, "newNote"),
        command_item(input, "newTodo"),
        command_item(input, "newNotebook"),
        MenuNode::leaf("Close Window")
            .with_id("file:closeWindow")
            .with_accelerator(input.commands.accelerator(entries::CLOSE_WINDOW))
            .with_command(host(HostRequest::CloseWindow)),
        MenuNode::separator(),
        templates_menu(input),
        MenuNode::separator(),
        import_menu(input),
        export_menu(input),
        MenuNode::separator(),
        command_item(input, "print"),
    ]
}

fn templates_menu(input: &MenuBuildInput<'_>) -> MenuNode {
    let exists = input.template_dir_exists;
    let select = |args: Value| MenuCommand::Execute {
        command: CommandId::new("selectTemplate"),
        args,
    };
    MenuNode::submenu(
        "Templates",
        vec![
            MenuNode::leaf("Create note from template")
                .with_id("templates:newNote")
                .visible(exists)
                .with_command(select(json!({ "noteType": "note" }))),
            MenuNode::leaf("Create to-do from template")
                .with_id("templates:newTodo")
                .visible(exists)
                .with_command(select(json!({ "noteType": "todo" }))),
            MenuNode::leaf("Insert template")
                .with_id("templates:insert")
                .visible(exists)
                .with_accelerator(input.commands.accelerator(entries::INSERT_TEMPLATE))
                .with_command(select(Value::Null)),
            MenuNode::leaf("Open template directory")
                .with_id("templates:openDir")
                .with_command(host(HostRequest::OpenTemplateDir)),
            MenuNode::leaf("Refresh templates")
                .with_id("templates:refresh")
                .with_command(host(HostRequest::RefreshTemplates)),
        ],
    )
    .with_id("file:templates")
}

fn import_source_token(source: ImportSource) -> &'static str {
    match source {
        ImportSource::File => "file",
        ImportSource::Directory => "directory",
    }
}

fn import_menu(input: &MenuBuildInput<'_>) -> MenuNode {
    let mut items = Vec::new();
    for module in input.interop_modules {
        let InteropModuleKind::Importer { sources, .. } = &module.kind else {
            continue;
        };
        for source in sources {
            items.push(main_only(
                MenuNode::leaf(module.full_label(Some(*source)))
                    .with_id(format!(
                        "import:{}:{}",
                        module.format,
                        import_source_token(*source)
                    ))
                    .with_command(host(HostRequest::Import {
                        format: module.format.clone(),
                        source: *source,
                    })),
            ));
        }
    }
    MenuNode::submenu("&Import", items).with_id("file:import")
}

fn export_menu(input: &MenuBuildInput<'_>) -> MenuNode {
    let mut items: Vec<MenuNode> = input
        .interop_modules
        .iter()
        .filter(|module| {
            matches!(
                module.kind,
                InteropModuleKind::Exporter {
                    can_do_multi_export: true
                }
            )
        })
        .map(|module| {
            main_only(
                MenuNode::leaf(module.full_label(None))
                    .with_id(format!("export:{}", module.format))
                    .with_command(host(HostRequest::Export {
                        format: module.format.clone(),
                    })),
            )
        })
        .collect();
    items.push(command_item(input, "exportPdf"));
    MenuNode::submenu("E&xport all", items).with_id("file:export")
}

fn edit_items(input: &MenuBuildInput<'_>) -> Vec<MenuNode> {
    let c = |id: &str| command_item(input, id);
    vec![
        c("textCopy"),
        c("textCut"),
        c("textPaste"),
        c("textSelectAll"),
        main_separator(),
        c("textBold"),
        c("textItalic"),
        c("textLink"),
        c("textCode"),
        main_separator(),
        c("insertDateTime"),
        c("attachFile"),
        main_separator(),
        c("focusSearch"),
        c("showLocalSearch"),
    ]
}

fn setting_checkbox(settings: &Settings, key: &str, id: String) -> MenuNode {
    MenuNode::leaf(settings.label(key))
        .with_id(id)
        .checked(settings.bool(key))
        .with_command(MenuCommand::ToggleSetting {
            key: key.to_string(),
        })
}

/// Radio items for an enum setting, with ids `{prefix}:{option token}`.
fn setting_radio_items(settings: &Settings, key: &str, prefix: &str) -> Vec<MenuNode> {
    let current = settings.get(key);
    settings
        .enum_options(key)
        .unwrap_or_default()
        .iter()
        .map(|option| {
            MenuNode::leaf(option.label.clone())
                .with_id(format!("{prefix}:{}", option.token()))
                .checked(current == Some(&option.value))
                .with_command(MenuCommand::SetSetting {
                    key: key.to_string(),
                    value: option.value.clone(),
                })
        })
        .collect()
}

/// Sort field radio group plus the reverse toggle for `notes` or `folders`.
fn sort_menu(settings: &Settings, kind: &str) -> MenuNode {
    let field_key = format!("{kind}.sortOrder.field");
    let reverse_key = format!("{kind}.sortOrder.reverse");
    let mut items = setting_radio_items(settings, &field_key, &format!("sort:{kind}:field"));
    items.push(MenuNode::separator());
    items.push(setting_checkbox(
        settings,
        &reverse_key,
        format!("sort:{kind}:reverse"),
    ));
    main_only(MenuNode::submenu(settings.label(&field_key).to_string(), items))
        .with_id(format!("view:sort:{kind}"))
}

fn view_items(input: &MenuBuildInput<'_>) -> Vec<MenuNode> {
    let settings = input.settings;
    let c = |id: &str| command_item(input, id);
    let zoom = keys::WINDOW_CONTENT_ZOOM_FACTOR;
    let step = settings.step(zoom).unwrap_or(10);
    let zoom_by = |delta: Option<i64>| MenuCommand::IncrementSetting {
        key: zoom.to_string(),
        delta,
    };
    let checkbox = |key: &str| main_only(setting_checkbox(settings, key, format!("setting:{key}")));

    vec![
        c("toggleSidebar"),
        c("toggleNoteList"),
        c("toggleVisiblePanes"),
        main_only(
            MenuNode::submenu(
                settings.label(keys::LAYOUT_BUTTON_SEQUENCE).to_string(),
                setting_radio_items(
                    settings,
                    keys::LAYOUT_BUTTON_SEQUENCE,
                    "view:layoutButtonSequence",
                ),
            )
            .with_id("view:layoutButtonSequence"),
        ),
        main_separator(),
        sort_menu(settings, "notes"),
        sort_menu(settings, "folders"),
        checkbox(keys::SHOW_NOTE_COUNTS),
        checkbox(keys::UNCOMPLETED_TODOS_ON_TOP),
        checkbox(keys::SHOW_COMPLETED_TODOS),
        main_separator(),
        main_only(
            MenuNode::submenu(
                "Focus",
                vec![
                    c("focusElementSideBar"),
                    c("focusElementNoteList"),
                    c("focusElementNoteTitle"),
                    c("focusElementNoteBody"),
                ],
            )
            .with_id("view:focus"),
        ),
        main_separator(),
        MenuNode::leaf("Actual Size")
            .with_id("view:zoomReset")
            .with_accelerator(Some("CommandOrControl+0".to_string()))
            .with_command(zoom_by(None)),
        MenuNode::leaf("Zoom In")
            .with_id("view:zoomIn")
            .with_accelerator(Some("CommandOrControl+Plus".to_string()))
            .with_command(zoom_by(Some(step))),
        // Same action bound to the unshifted key.
        MenuNode::leaf("Zoom In")
            .with_id("view:zoomInAlias")
            .visible(false)
            .with_accelerator(Some("CommandOrControl+=".to_string()))
            .with_command(zoom_by(Some(step))),
        MenuNode::leaf("Zoom Out")
            .with_id("view:zoomOut")
            .with_accelerator(Some("CommandOrControl+-".to_string()))
            .with_command(zoom_by(Some(-step))),
    ]
}

fn note_items(input: &MenuBuildInput<'_>) -> Vec<MenuNode> {
    vec![
        command_item(input, "startExternalEditing"),
        command_item(input, "stopExternalEditing"),
        command_item(input, "setTags"),
        main_separator(),
        command_item(input, "showNoteContentProperties"),
    ]
}

fn tools_items(input: &MenuBuildInput<'_>) -> Vec<MenuNode> {
    vec![
        off_mac(sync_status_item()),
        off_mac(main_separator()),
        off_mac(
            MenuNode::leaf("Options")
                .with_id("tools:options")
                .with_accelerator(input.commands.accelerator(entries::CONFIG))
                .with_command(navigate(ScreenId::CONFIG)),
        ),
        MenuNode::leaf("Note attachments...")
            .with_id("tools:resources")
            .with_command(navigate(ScreenId::RESOURCES)),
    ]
}

fn help_items(input: &MenuBuildInput<'_>) -> Vec<MenuNode> {
    let open = |url: &str| {
        host(HostRequest::OpenExternal {
            url: url.to_string(),
        })
    };
    vec![
        MenuNode::leaf("Website and documentation")
            .with_id("help:website")
            .with_accelerator(input.commands.accelerator(entries::HELP))
            .with_command(open(WEBSITE_URL)),
        MenuNode::leaf("Forum")
            .with_id("help:forum")
            .with_command(open(FORUM_URL)),
        MenuNode::leaf("Make a donation")
            .with_id("help:donate")
            .with_command(open(DONATE_URL)),
        off_mac(
            MenuNode::leaf("Check for updates...")
                .with_id("help:checkForUpdates")
                .with_command(host(HostRequest::CheckForUpdates)),
        ),
        main_separator(),
        MenuNode::leaf("Toggle development tools")
            .with_id("help:toggleDevTools")
            .with_command(dispatch(AppAction::NoteDevtoolsToggle)),
        off_mac(main_separator()),
        off_mac(
            MenuNode::leaf("About Notes")
                .with_id("help:about")
                .with_command(host(HostRequest::About)),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use notes_platform_host::{InteropCatalog, StaticInteropCatalog};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::commands::CommandRegistry;

    struct Fixture {
        commands: CommandRegistry,
        settings: Settings,
        modules: Vec<InteropModule>,
        plugins: Vec<PluginMenuItem>,
        template_dir_exists: bool,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                commands: CommandRegistry::with_builtin_declarations(),
                settings: Settings::new(),
                modules: StaticInteropCatalog::default().modules(),
                plugins: Vec::new(),
                template_dir_exists: false,
            }
        }

        fn build(&self, screen: &str, platform: Platform) -> MenuNode {
            let screen = ScreenId::new(screen);
            let (_, menu) = build_menu(MenuBuildState::default(), &self.input(&screen, platform));
            menu.expect("fresh state always builds")
        }

        fn input<'a>(&'a self, screen: &'a ScreenId, platform: Platform) -> MenuBuildInput<'a> {
            MenuBuildInput {
                screen,
                platform,
                commands: &self.commands,
                settings: &self.settings,
                interop_modules: &self.modules,
                template_dir_exists: self.template_dir_exists,
                plugin_items: &self.plugins,
            }
        }
    }

    fn root_labels(menu: &MenuNode) -> Vec<&str> {
        menu.children.iter().map(|node| node.label.as_str()).collect()
    }

    fn assert_well_formed(node: &MenuNode) {
        if !node.is_submenu() {
            return;
        }
        let children = &node.children;
        assert!(
            children.iter().any(|c| c.visible && !c.is_separator()),
            "submenu `{}` has no visible content",
            node.label
        );
        assert!(
            !children.first().is_some_and(MenuNode::is_separator),
            "submenu `{}` starts with a separator",
            node.label
        );
        assert!(
            !children
                .windows(2)
                .any(|pair| pair[0].is_separator() && pair[1].is_separator()),
            "submenu `{}` has consecutive separators",
            node.label
        );
        let last_visible = children.iter().rev().find(|c| c.visible);
        assert!(
            !last_visible.is_some_and(MenuNode::is_separator),
            "submenu `{}` ends with a separator",
            node.label
        );
        children.iter().for_each(assert_well_formed);
    }

    #[test]
    fn root_menus_follow_platform_layout() {
        let fixture = Fixture::new();
        let linux = fixture.build(ScreenId::MAIN, Platform::Linux);
        assert_eq!(
            root_labels(&linux),
            vec!["&File", "&Edit", "&View", "&Note", "&Tools", "&Help"]
        );

        let mac = fixture.build(ScreenId::MAIN, Platform::Darwin);
        assert_eq!(
            root_labels(&mac),
            vec!["&Notes", "&File", "&Edit", "&View", "&Note", "&Tools", "&Help"]
        );
        assert!(mac.find("app:preferences").is_some());
        assert!(mac.find("tools:options").is_none());
        assert!(linux.find("tools:options").is_some());
        assert_eq!(
            mac.find("menu:help").and_then(|n| n.role.as_deref()),
            Some("help")
        );
    }

    #[test]
    fn every_screen_and_platform_yields_a_well_formed_tree() {
        let fixture = Fixture::new();
        for screen in [
            ScreenId::MAIN,
            ScreenId::CONFIG,
            ScreenId::STATUS,
            ScreenId::RESOURCES,
            "Unknown",
        ] {
            for platform in Platform::ALL {
                let menu = fixture.build(screen, platform);
                menu.children.iter().for_each(assert_well_formed);
            }
        }
    }

    #[test]
    fn same_screen_is_not_rebuilt_until_invalidated() {
        let fixture = Fixture::new();
        let main = ScreenId::main();
        let input = fixture.input(&main, Platform::Linux);

        let (state, first) = build_menu(MenuBuildState::default(), &input);
        assert!(first.is_some());
        assert_eq!(state.build_count(), 1);

        let (mut state, second) = build_menu(state, &input);
        assert!(second.is_none());
        assert_eq!(state.build_count(), 1);

        state.invalidate();
        let (state, third) = build_menu(state, &input);
        assert!(third.is_some());
        assert_eq!(state.build_count(), 2);
        assert_eq!(state.last_screen(), Some(&main));
    }

    #[test]
    fn main_only_items_disappear_on_other_screens() {
        let fixture = Fixture::new();
        let main = fixture.build(ScreenId::MAIN, Platform::Linux);
        let config = fixture.build(ScreenId::CONFIG, Platform::Linux);

        for id in ["view:sort:notes", "view:focus", "import:md:file", "export:jex"] {
            assert!(main.find(id).is_some(), "{id} on main");
            assert!(config.find(id).is_none(), "{id} off main");
        }
        assert!(config.find("textCopy").is_some());
    }

    #[test]
    fn sort_and_layout_groups_reflect_settings() {
        let mut fixture = Fixture::new();
        fixture
            .settings
            .set(keys::NOTES_SORT_FIELD, json!("title"))
            .expect("sort field");
        fixture
            .settings
            .set(keys::LAYOUT_BUTTON_SEQUENCE, json!(2))
            .expect("layout");
        let menu = fixture.build(ScreenId::MAIN, Platform::Windows);

        let checked = |id: &str| menu.find(id).and_then(|node| node.checked);
        assert_eq!(checked("sort:notes:field:title"), Some(true));
        assert_eq!(checked("sort:notes:field:order"), Some(false));
        assert_eq!(checked("sort:notes:reverse"), Some(true));
        assert_eq!(checked("sort:folders:reverse"), Some(false));
        assert_eq!(checked("view:layoutButtonSequence:2"), Some(true));
        assert_eq!(checked("view:layoutButtonSequence:0"), Some(false));
        assert_eq!(checked("setting:showNoteCounts"), Some(true));
    }

    #[test]
    fn template_items_follow_directory_existence() {
        let mut fixture = Fixture::new();
        let without = fixture.build(ScreenId::MAIN, Platform::Linux);
        assert_eq!(
            without.find("templates:insert").map(|node| node.visible),
            Some(false)
        );
        assert!(without.find("templates:openDir").is_some());

        fixture.template_dir_exists = true;
        let with = fixture.build(ScreenId::MAIN, Platform::Linux);
        let insert = with.find("templates:insert").expect("insert template");
        assert!(insert.visible);
        assert_eq!(insert.accelerator.as_deref(), Some("CommandOrControl+Alt+I"));
    }

    #[test]
    fn interop_modules_populate_import_and_export() {
        let fixture = Fixture::new();
        let menu = fixture.build(ScreenId::MAIN, Platform::Linux);
        let import = menu.find("file:import").expect("import menu");
        let labels: Vec<&str> = import.children.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "JEX - Joplin Export File",
                "MD - Markdown (File)",
                "MD - Markdown (Directory)",
                "RAW - Joplin Export Directory",
                "ENEX - Evernote Export File (as Markdown)",
            ]
        );

        let export = menu.find("file:export").expect("export menu");
        assert!(export.find("export:pdf").is_none());
        assert_eq!(
            export.children.last().and_then(|n| n.id.as_deref()),
            Some("exportPdf")
        );
    }

    #[test]
    fn plugin_items_are_appended_and_filtered() {
        let mut fixture = Fixture::new();
        fixture.plugins = vec![
            PluginMenuItem {
                parent: "note".to_string(),
                item: MenuNode::leaf("Word count").with_id("plugin:wordCount"),
            },
            PluginMenuItem {
                parent: "nowhere".to_string(),
                item: MenuNode::leaf("Orphan").with_id("plugin:orphan"),
            },
            PluginMenuItem {
                parent: "file".to_string(),
                item: main_only(MenuNode::leaf("Main only").with_id("plugin:mainOnly")),
            },
        ];

        let main = fixture.build(ScreenId::MAIN, Platform::Darwin);
        let note = main.find("menu:note").expect("note menu");
        assert_eq!(
            note.children.last().and_then(|n| n.id.as_deref()),
            Some("plugin:wordCount")
        );
        assert!(main
            .find("menu:tools")
            .and_then(|tools| tools.find("plugin:orphan"))
            .is_some());
        assert!(main
            .find("menu:file")
            .and_then(|file| file.find("plugin:mainOnly"))
            .is_some());

        let config = fixture.build(ScreenId::CONFIG, Platform::Darwin);
        assert!(config.find("plugin:mainOnly").is_none());
    }

    #[test]
    fn undeclared_commands_become_hidden_placeholders() {
        let input_commands = CommandRegistry::default();
        let settings = Settings::new();
        let screen = ScreenId::main();
        let input = MenuBuildInput {
            screen: &screen,
            platform: Platform::Linux,
            commands: &input_commands,
            settings: &settings,
            interop_modules: &[],
            template_dir_exists: false,
            plugin_items: &[],
        };
        let (_, menu) = build_menu(MenuBuildState::default(), &input);
        let menu = menu.expect("menu");
        assert_eq!(menu.find("newNote").map(|n| n.visible), Some(false));
        assert!(menu.find("menu:edit").is_none());
    }
}
