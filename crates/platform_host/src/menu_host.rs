//! Native application-menu host contract and adapters.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use notes_command_contract::MenuNode;

/// Host that owns the single active application menu.
///
/// The installed tree is addressed by node id. Lookups that miss return `false` rather than an
/// error because menus legitimately expose only a subset of commands.
pub trait MenuHost {
    /// Installs a tree as the application menu, replacing any previous one.
    fn install_menu(&self, root: MenuNode);

    /// Whether a menu has been installed.
    fn has_installed_menu(&self) -> bool;

    /// Returns a copy of the installed tree.
    fn installed_menu(&self) -> Option<MenuNode>;

    /// Sets the enabled flag of the node with `id`. Returns whether the node exists.
    fn set_node_enabled(&self, id: &str, enabled: bool) -> bool;

    /// Sets the checked flag of the node with `id`. Returns whether the node exists.
    fn set_node_checked(&self, id: &str, checked: bool) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
/// Menu host for targets without a native menu bar. Never reports an installed menu.
pub struct NoopMenuHost;

impl MenuHost for NoopMenuHost {
    fn install_menu(&self, _root: MenuNode) {}

    fn has_installed_menu(&self) -> bool {
        false
    }

    fn installed_menu(&self) -> Option<MenuNode> {
        None
    }

    fn set_node_enabled(&self, _id: &str, _enabled: bool) -> bool {
        false
    }

    fn set_node_checked(&self, _id: &str, _checked: bool) -> bool {
        false
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory menu host. Clones share the installed tree.
pub struct MemoryMenuHost {
    installed: Rc<RefCell<Option<MenuNode>>>,
    install_count: Rc<Cell<u64>>,
}

impl MemoryMenuHost {
    /// Number of installs since creation.
    pub fn install_count(&self) -> u64 {
        self.install_count.get()
    }

    fn update_node(&self, id: &str, apply: impl FnOnce(&mut MenuNode)) -> bool {
        let mut installed = self.installed.borrow_mut();
        let Some(node) = installed.as_mut().and_then(|root| root.find_mut(id)) else {
            return false;
        };
        apply(node);
        true
    }
}

impl MenuHost for MemoryMenuHost {
    fn install_menu(&self, root: MenuNode) {
        *self.installed.borrow_mut() = Some(root);
        self.install_count.set(self.install_count.get() + 1);
    }

    fn has_installed_menu(&self) -> bool {
        self.installed.borrow().is_some()
    }

    fn installed_menu(&self) -> Option<MenuNode> {
        self.installed.borrow().clone()
    }

    fn set_node_enabled(&self, id: &str, enabled: bool) -> bool {
        self.update_node(id, |node| node.enabled = enabled)
    }

    fn set_node_checked(&self, id: &str, checked: bool) -> bool {
        self.update_node(id, |node| node.checked = Some(checked))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn memory_host_replaces_tree_and_updates_nodes_by_id() {
        let host = MemoryMenuHost::default();
        assert!(!host.has_installed_menu());
        assert!(!host.set_node_enabled("newNote", false));

        host.install_menu(MenuNode::submenu(
            "",
            vec![MenuNode::leaf("New note").with_id("newNote")],
        ));
        assert!(host.set_node_enabled("newNote", false));
        assert!(host.set_node_checked("newNote", true));
        assert!(!host.set_node_enabled("missing", true));

        let node = host
            .installed_menu()
            .and_then(|root| root.find("newNote").cloned())
            .expect("installed node");
        assert!(!node.enabled);
        assert_eq!(node.checked, Some(true));

        host.install_menu(MenuNode::submenu("", Vec::new()));
        assert_eq!(host.install_count(), 2);
        assert!(!host.set_node_enabled("newNote", true));
    }

    #[test]
    fn noop_host_never_has_a_menu() {
        let host = NoopMenuHost;
        host.install_menu(MenuNode::submenu("", Vec::new()));
        assert!(!host.has_installed_menu());
        assert_eq!(host.installed_menu(), None);
    }
}
