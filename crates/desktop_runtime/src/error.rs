//! Shell-level error type.

use notes_command_contract::CommandError;
use thiserror::Error;

use crate::{keymap::KeymapError, reducer::ReducerError, settings::SettingsError};

/// Failure of a host collaborator (profile files, prefs, host requests).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{resource}: {message}")]
pub struct CollaboratorIoError {
    pub resource: String,
    pub message: String,
}

impl CollaboratorIoError {
    pub fn new(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Reducer(#[from] ReducerError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("{path}: {source}")]
    Keymap {
        path: String,
        #[source]
        source: KeymapError,
    },
    #[error("malformed action: {0}")]
    MalformedAction(String),
    #[error("no menu item with id `{0}`")]
    UnknownMenuItem(String),
    #[error(transparent)]
    Collaborator(#[from] CollaboratorIoError),
}
