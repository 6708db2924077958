//! Data-only application menu tree shared by the menu builder and menu hosts.
//!
//! Nodes never embed behavior. A clickable node carries a [`MenuCommand`] that the shell resolves
//! by node id at click time.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::command::CommandId;

/// Top-level screen identifier. Screen ids are route-kind strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScreenId(String);

impl ScreenId {
    /// Main notes screen.
    pub const MAIN: &'static str = "Main";
    /// Options screen.
    pub const CONFIG: &'static str = "Config";
    /// Synchronisation status screen.
    pub const STATUS: &'static str = "Status";
    /// Note attachments screen.
    pub const RESOURCES: &'static str = "Resources";

    /// Creates a screen identifier from trusted caller input.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Main notes screen identifier.
    pub fn main() -> Self {
        Self::new(Self::MAIN)
    }

    /// Returns the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ScreenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Operating environment identifier used by menu platform filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Platform {
    /// macOS.
    #[serde(rename = "darwin")]
    Darwin,
    /// Linux and other unix desktops.
    #[serde(rename = "linux")]
    Linux,
    /// Windows.
    #[serde(rename = "win32")]
    Windows,
}

impl Platform {
    /// Every known platform.
    pub const ALL: [Platform; 3] = [Platform::Darwin, Platform::Linux, Platform::Windows];

    /// Returns a stable platform token.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Darwin => "darwin",
            Self::Linux => "linux",
            Self::Windows => "win32",
        }
    }

    /// Whether this platform splits the first menu into an application menu and a File menu.
    pub const fn has_unified_app_menu(self) -> bool {
        matches!(self, Self::Darwin)
    }

    /// Platforms other than the ones with a unified application menu.
    pub fn without_unified_app_menu() -> BTreeSet<Platform> {
        Self::ALL
            .into_iter()
            .filter(|platform| !platform.has_unified_app_menu())
            .collect()
    }
}

/// Import source accepted by an import module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportSource {
    /// A single file picked by the user.
    File,
    /// A directory picked by the user.
    Directory,
}

/// Host-level operation requested by a menu node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "request", rename_all = "kebab-case")]
pub enum HostRequest {
    /// Show the about box.
    About,
    /// Run an interactive update check.
    CheckForUpdates,
    /// Hide the application.
    HideApp,
    /// Show and focus the main window.
    ShowWindow,
    /// Close the focused window.
    CloseWindow,
    /// Quit the application.
    Quit,
    /// Open a URL in the default browser.
    OpenExternal {
        /// Target URL.
        url: String,
    },
    /// Import through an import module.
    Import {
        /// Import module format.
        format: String,
        /// Source kind to pick.
        source: ImportSource,
    },
    /// Export everything through an export module.
    Export {
        /// Export module format.
        format: String,
    },
    /// Open (creating if needed) the template directory.
    OpenTemplateDir,
    /// Reload templates from disk.
    RefreshTemplates,
}

/// Behavior attached to a menu node, resolved at click time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum MenuCommand {
    /// Execute a registered command.
    Execute {
        /// Command to execute.
        command: CommandId,
        /// Command arguments.
        #[serde(default)]
        args: Value,
    },
    /// Dispatch an action in its wire form (`{ "type": ... }`).
    Dispatch {
        /// Wire action.
        action: Value,
    },
    /// Set a setting to a value. Nodes with this command act as radio items.
    SetSetting {
        /// Setting key.
        key: String,
        /// Value to store.
        value: Value,
    },
    /// Flip a boolean setting. Nodes with this command act as checkbox items.
    ToggleSetting {
        /// Setting key.
        key: String,
    },
    /// Add a delta to an integer setting. A `None` delta resets to the default.
    IncrementSetting {
        /// Setting key.
        key: String,
        /// Amount to add.
        delta: Option<i64>,
    },
    /// Ask the host to do something outside the shell core.
    Host {
        /// Host request.
        request: HostRequest,
    },
}

/// Node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MenuNodeKind {
    /// Clickable item.
    Leaf,
    /// Visual separator.
    Separator,
    /// Nested menu.
    Submenu,
}

/// One node of the application menu tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuNode {
    /// Stable id used by the synchronizer and click dispatch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display label.
    #[serde(default)]
    pub label: String,
    /// Node kind.
    pub kind: MenuNodeKind,
    /// Whether the node should be shown at all.
    pub visible: bool,
    /// Whether the node is actionable.
    pub enabled: bool,
    /// Checked flag for checkbox and radio items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    /// Keyboard accelerator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accelerator: Option<String>,
    /// Platform whitelist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platforms: Option<BTreeSet<Platform>>,
    /// Screen whitelist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screens: Option<BTreeSet<ScreenId>>,
    /// Host-specific role, such as `help`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Click behavior.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<MenuCommand>,
    /// Ordered children of a submenu.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuNode>,
}

impl MenuNode {
    fn base(kind: MenuNodeKind, label: String) -> Self {
        Self {
            id: None,
            label,
            kind,
            visible: true,
            enabled: true,
            checked: None,
            accelerator: None,
            platforms: None,
            screens: None,
            role: None,
            command: None,
            children: Vec::new(),
        }
    }

    /// Creates a clickable leaf.
    pub fn leaf(label: impl Into<String>) -> Self {
        Self::base(MenuNodeKind::Leaf, label.into())
    }

    /// Creates a separator.
    pub fn separator() -> Self {
        Self::base(MenuNodeKind::Separator, String::new())
    }

    /// Creates a submenu.
    pub fn submenu(label: impl Into<String>, children: Vec<MenuNode>) -> Self {
        let mut node = Self::base(MenuNodeKind::Submenu, label.into());
        node.children = children;
        node
    }

    /// Sets the node id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the click behavior.
    pub fn with_command(mut self, command: MenuCommand) -> Self {
        self.command = Some(command);
        self
    }

    /// Sets the accelerator when one is given.
    pub fn with_accelerator(mut self, accelerator: Option<String>) -> Self {
        self.accelerator = accelerator;
        self
    }

    /// Makes the node a checkbox/radio item with the given checked state.
    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    /// Sets the visible flag.
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Restricts the node to the given screens.
    pub fn on_screens<I, S>(mut self, screens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.screens = Some(screens.into_iter().map(ScreenId::new).collect());
        self
    }

    /// Restricts the node to the given platforms.
    pub fn on_platforms(mut self, platforms: impl IntoIterator<Item = Platform>) -> Self {
        self.platforms = Some(platforms.into_iter().collect());
        self
    }

    /// Sets the host role.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Whether the node is a separator.
    pub fn is_separator(&self) -> bool {
        self.kind == MenuNodeKind::Separator
    }

    /// Whether the node is a submenu.
    pub fn is_submenu(&self) -> bool {
        self.kind == MenuNodeKind::Submenu
    }

    /// Whether the node passes its screen and platform filters.
    pub fn matches(&self, screen: &ScreenId, platform: Platform) -> bool {
        let screen_ok = self
            .screens
            .as_ref()
            .map_or(true, |screens| screens.contains(screen));
        let platform_ok = self
            .platforms
            .as_ref()
            .map_or(true, |platforms| platforms.contains(&platform));
        screen_ok && platform_ok
    }

    /// Depth-first lookup of a node by id.
    pub fn find(&self, id: &str) -> Option<&MenuNode> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Depth-first mutable lookup of a node by id.
    pub fn find_mut(&mut self, id: &str) -> Option<&mut MenuNode> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// Visits every node depth-first, parents before children.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a MenuNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// Menu item contributed by a plugin, appended to the root menu named by `parent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginMenuItem {
    /// Root menu key: `file`, `edit`, `view`, `note`, `tools`, or `help`.
    pub parent: String,
    /// Item to append.
    pub item: MenuNode,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample() -> MenuNode {
        MenuNode::submenu(
            "root",
            vec![
                MenuNode::submenu(
                    "File",
                    vec![
                        MenuNode::leaf("New note").with_id("newNote"),
                        MenuNode::separator(),
                        MenuNode::leaf("Quit").with_id("quit"),
                    ],
                ),
                MenuNode::leaf("Help").with_id("help"),
            ],
        )
    }

    #[test]
    fn find_locates_nested_nodes_by_id() {
        let mut root = sample();
        assert_eq!(root.find("quit").map(|n| n.label.as_str()), Some("Quit"));
        assert!(root.find("missing").is_none());

        root.find_mut("newNote").expect("node").enabled = false;
        assert!(!root.find("newNote").expect("node").enabled);
    }

    #[test]
    fn filters_match_screen_and_platform_whitelists() {
        let main = ScreenId::main();
        let config = ScreenId::new(ScreenId::CONFIG);
        let node = MenuNode::leaf("Sort")
            .on_screens([ScreenId::MAIN])
            .on_platforms(Platform::without_unified_app_menu());

        assert!(node.matches(&main, Platform::Linux));
        assert!(!node.matches(&config, Platform::Linux));
        assert!(!node.matches(&main, Platform::Darwin));
        assert!(MenuNode::leaf("Any").matches(&config, Platform::Darwin));
    }

    #[test]
    fn walk_visits_every_node() {
        let mut labels = Vec::new();
        sample().walk(&mut |node| labels.push(node.label.clone()));
        assert_eq!(labels, vec!["root", "File", "New note", "", "Quit", "Help"]);
    }

    #[test]
    fn platform_tokens_are_stable() {
        assert_eq!(
            serde_json::to_value(Platform::Windows).expect("serialize"),
            serde_json::json!("win32")
        );
        assert_eq!(Platform::Darwin.as_str(), "darwin");
        assert!(Platform::Darwin.has_unified_app_menu());
        assert!(!Platform::without_unified_app_menu().contains(&Platform::Darwin));
    }
}
