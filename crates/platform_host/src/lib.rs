//! Typed host-domain contracts used by the notes shell runtime.
//!
//! This crate is the boundary to everything the shell core treats as an external collaborator:
//! preference persistence, the native application menu, window/tray/dialog primitives, profile
//! files (templates, keymaps), and the import/export module catalog. Each domain exposes an
//! object-safe trait plus no-op and in-memory adapters used by tests and headless builds.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod host;
pub mod interop;
pub mod menu_host;
pub mod profile;
pub mod shell_host;
pub mod storage;

pub use host::HostServices;
pub use interop::{InteropCatalog, InteropModule, InteropModuleKind, StaticInteropCatalog};
pub use menu_host::{MemoryMenuHost, MenuHost, NoopMenuHost};
pub use profile::{MemoryProfileFs, NoteTemplate, NoopProfileFs, ProfileFs, ProfileFsFuture};
pub use shell_host::{HostFuture, MemoryShellHost, NoopShellHost, ShellHost, ShellHostLog};
pub use storage::prefs::{
    load_setting_value, save_setting_value, setting_pref_key, MemoryPrefsStore, NoopPrefsStore,
    PrefsError, PrefsStore, PrefsStoreFuture, SETTINGS_NAMESPACE,
};
