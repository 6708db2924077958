//! Shared command and menu contracts used by the shell runtime, host adapters, and plugins.
//!
//! This crate is intentionally runtime-agnostic. It defines serializable command declarations,
//! enablement rules, and the data-only menu tree without depending on the reducer, the settings
//! registry, or any native menu toolkit.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod command;
pub mod menu;

pub use command::{
    CommandDeclaration, CommandError, CommandId, CommandService, EnabledStateMap, EnabledWhen,
    WhenContext,
};
pub use menu::{
    HostRequest, ImportSource, MenuCommand, MenuNode, MenuNodeKind, Platform, PluginMenuItem,
    ScreenId,
};
