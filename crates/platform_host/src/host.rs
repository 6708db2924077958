//! Host service bundle injected into the shell runtime.

use std::rc::Rc;

use crate::{
    InteropCatalog, MenuHost, NoopMenuHost, NoopPrefsStore, NoopProfileFs, NoopShellHost,
    PrefsStore, ProfileFs, ShellHost, StaticInteropCatalog,
};

/// Runtime-selected host services passed explicitly into the shell orchestrator.
///
/// All environment-specific adapter selection happens before this bundle crosses into the
/// runtime, which keeps the reducer, menu builder, and synchronizer free of global singletons.
#[derive(Clone)]
pub struct HostServices {
    /// Persisted settings storage.
    pub prefs: Rc<dyn PrefsStore>,
    /// Native application menu.
    pub menu: Rc<dyn MenuHost>,
    /// Window, tray, and dialog primitives.
    pub shell: Rc<dyn ShellHost>,
    /// Profile-directory file access.
    pub profile: Rc<dyn ProfileFs>,
    /// Import/export module catalog.
    pub interop: Rc<dyn InteropCatalog>,
}

impl HostServices {
    /// Bundle of no-op adapters with the default interop catalog.
    pub fn noop() -> Self {
        Self {
            prefs: Rc::new(NoopPrefsStore),
            menu: Rc::new(NoopMenuHost),
            shell: Rc::new(NoopShellHost),
            profile: Rc::new(NoopProfileFs),
            interop: Rc::new(StaticInteropCatalog::default()),
        }
    }

    /// Replaces the prefs store.
    pub fn with_prefs(mut self, prefs: Rc<dyn PrefsStore>) -> Self {
        self.prefs = prefs;
        self
    }

    /// Replaces the menu host.
    pub fn with_menu(mut self, menu: Rc<dyn MenuHost>) -> Self {
        self.menu = menu;
        self
    }

    /// Replaces the shell host.
    pub fn with_shell(mut self, shell: Rc<dyn ShellHost>) -> Self {
        self.shell = shell;
        self
    }

    /// Replaces the profile file service.
    pub fn with_profile(mut self, profile: Rc<dyn ProfileFs>) -> Self {
        self.profile = profile;
        self
    }

    /// Replaces the interop catalog.
    pub fn with_interop(mut self, interop: Rc<dyn InteropCatalog>) -> Self {
        self.interop = interop;
        self
    }
}
