//! Window, tray, and dialog primitives the shell drives but does not implement.

use std::{cell::RefCell, future::Future, pin::Pin, rc::Rc};

use notes_command_contract::{HostRequest, MenuNode};

/// Object-safe boxed future used by [`ShellHost`].
pub type HostFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Native shell primitives (dev tools, tray, zoom, styles, dialogs).
pub trait ShellHost {
    /// Opens or closes the developer tools.
    fn set_dev_tools_visible(&self, visible: bool);

    /// Propagates the UI locale to the native side.
    fn set_locale(&self, locale: &str);

    /// Sets the content zoom factor (1.0 is actual size).
    fn set_zoom_factor(&self, factor: f64);

    /// Injects a stylesheet rule for the note editor.
    fn inject_editor_css(&self, css: &str);

    /// Whether the tray icon is currently shown.
    fn tray_shown(&self) -> bool;

    /// Creates the tray icon with the given context menu.
    fn create_tray(&self, menu: MenuNode);

    /// Removes the tray icon.
    fn destroy_tray(&self);

    /// Whether the OS currently prefers dark colors.
    fn should_use_dark_colors(&self) -> bool;

    /// Shows a blocking error message box.
    fn show_error_message_box(&self, message: &str);

    /// Performs a host-level request raised from a menu.
    fn run_request<'a>(&'a self, request: &'a HostRequest) -> HostFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op shell host for headless runs.
pub struct NoopShellHost;

impl ShellHost for NoopShellHost {
    fn set_dev_tools_visible(&self, _visible: bool) {}

    fn set_locale(&self, _locale: &str) {}

    fn set_zoom_factor(&self, _factor: f64) {}

    fn inject_editor_css(&self, _css: &str) {}

    fn tray_shown(&self) -> bool {
        false
    }

    fn create_tray(&self, _menu: MenuNode) {}

    fn destroy_tray(&self) {}

    fn should_use_dark_colors(&self) -> bool {
        false
    }

    fn show_error_message_box(&self, _message: &str) {}

    fn run_request<'a>(&'a self, _request: &'a HostRequest) -> HostFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }
}

/// Calls observed by [`MemoryShellHost`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShellHostLog {
    /// Last dev-tools visibility applied.
    pub dev_tools_visible: Option<bool>,
    /// Last locale applied.
    pub locale: Option<String>,
    /// Last zoom factor applied.
    pub zoom_factor: Option<f64>,
    /// Every editor stylesheet injected, in order.
    pub editor_css: Vec<String>,
    /// Current tray menu, `None` when no tray is shown.
    pub tray: Option<MenuNode>,
    /// Number of times a tray was created.
    pub tray_creations: u32,
    /// Every error message shown, in order.
    pub error_messages: Vec<String>,
    /// Every host request run, in order.
    pub requests: Vec<HostRequest>,
}

#[derive(Debug, Clone, Default)]
/// Recording shell host. Clones share the same log.
pub struct MemoryShellHost {
    log: Rc<RefCell<ShellHostLog>>,
    dark_colors: Rc<RefCell<bool>>,
    request_failure: Rc<RefCell<Option<String>>>,
}

impl MemoryShellHost {
    /// Returns a copy of the call log.
    pub fn log(&self) -> ShellHostLog {
        self.log.borrow().clone()
    }

    /// Sets the answer of [`ShellHost::should_use_dark_colors`].
    pub fn set_dark_colors(&self, dark: bool) {
        *self.dark_colors.borrow_mut() = dark;
    }

    /// Makes every subsequent host request fail with `message`.
    pub fn fail_requests(&self, message: impl Into<String>) {
        *self.request_failure.borrow_mut() = Some(message.into());
    }
}

impl ShellHost for MemoryShellHost {
    fn set_dev_tools_visible(&self, visible: bool) {
        self.log.borrow_mut().dev_tools_visible = Some(visible);
    }

    fn set_locale(&self, locale: &str) {
        self.log.borrow_mut().locale = Some(locale.to_string());
    }

    fn set_zoom_factor(&self, factor: f64) {
        self.log.borrow_mut().zoom_factor = Some(factor);
    }

    fn inject_editor_css(&self, css: &str) {
        self.log.borrow_mut().editor_css.push(css.to_string());
    }

    fn tray_shown(&self) -> bool {
        self.log.borrow().tray.is_some()
    }

    fn create_tray(&self, menu: MenuNode) {
        let mut log = self.log.borrow_mut();
        log.tray = Some(menu);
        log.tray_creations += 1;
    }

    fn destroy_tray(&self) {
        self.log.borrow_mut().tray = None;
    }

    fn should_use_dark_colors(&self) -> bool {
        *self.dark_colors.borrow()
    }

    fn show_error_message_box(&self, message: &str) {
        self.log
            .borrow_mut()
            .error_messages
            .push(message.to_string());
    }

    fn run_request<'a>(&'a self, request: &'a HostRequest) -> HostFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.log.borrow_mut().requests.push(request.clone());
            match self.request_failure.borrow().clone() {
                Some(message) => Err(message),
                None => Ok(()),
            }
        })
    }
}
