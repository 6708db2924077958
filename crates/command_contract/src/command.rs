//! Command declarations, enablement rules, and the registry service contract.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::menu::MenuNode;

/// Stable command registration identifier, such as `newNote`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CommandId(String);

impl CommandId {
    /// Creates a command identifier from trusted caller input.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CommandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommandId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Point-in-time mapping from command id to whether that command is currently actionable.
pub type EnabledStateMap = BTreeMap<CommandId, bool>;

/// Named boolean facts derived from application state that enablement rules are evaluated
/// against.
///
/// Missing flags read as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhenContext {
    flags: BTreeMap<String, bool>,
}

impl WhenContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one flag and returns the context for chaining.
    pub fn with(mut self, flag: impl Into<String>, value: bool) -> Self {
        self.set(flag, value);
        self
    }

    /// Sets one flag.
    pub fn set(&mut self, flag: impl Into<String>, value: bool) {
        self.flags.insert(flag.into(), value);
    }

    /// Returns a flag value, `false` when absent.
    pub fn get(&self, flag: &str) -> bool {
        self.flags.get(flag).copied().unwrap_or(false)
    }
}

/// Data-only enablement rule for a declared command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum EnabledWhen {
    /// Always enabled.
    #[default]
    Always,
    /// Enabled while the named context flag is set.
    Flag(String),
    /// Negation of a nested rule.
    Not(Box<EnabledWhen>),
    /// Enabled when every nested rule holds.
    All(Vec<EnabledWhen>),
    /// Enabled when any nested rule holds.
    Any(Vec<EnabledWhen>),
}

impl EnabledWhen {
    /// Shorthand for [`EnabledWhen::Flag`].
    pub fn flag(name: impl Into<String>) -> Self {
        Self::Flag(name.into())
    }

    /// Evaluates the rule against a context.
    pub fn evaluate(&self, context: &WhenContext) -> bool {
        match self {
            Self::Always => true,
            Self::Flag(name) => context.get(name),
            Self::Not(inner) => !inner.evaluate(context),
            Self::All(rules) => rules.iter().all(|rule| rule.evaluate(context)),
            Self::Any(rules) => rules.iter().any(|rule| rule.evaluate(context)),
        }
    }
}

/// Declaration metadata for one command. Registered once at startup and never mutated by the
/// shell core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDeclaration {
    /// Stable command identifier.
    pub id: CommandId,
    /// Menu label.
    pub label: String,
    /// Accelerator used when the keymap has no override.
    pub default_accelerator: Option<String>,
    /// Enablement rule.
    #[serde(default)]
    pub enabled_when: EnabledWhen,
}

impl CommandDeclaration {
    /// Creates an always-enabled declaration without an accelerator.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: CommandId::new(id),
            label: label.into(),
            default_accelerator: None,
            enabled_when: EnabledWhen::Always,
        }
    }

    /// Sets the default accelerator.
    pub fn accelerator(mut self, accelerator: impl Into<String>) -> Self {
        self.default_accelerator = Some(accelerator.into());
        self
    }

    /// Sets the enablement rule.
    pub fn enabled_when(mut self, rule: EnabledWhen) -> Self {
        self.enabled_when = rule;
        self
    }
}

/// Errors reported by command registries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// No declaration exists for the command id.
    NotFound(CommandId),
    /// The command is declared but no runtime handler has been registered.
    NoRuntime(CommandId),
    /// The runtime handler failed.
    Failed {
        /// Command that failed.
        command: CommandId,
        /// Handler message.
        message: String,
    },
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "no such command: {id}"),
            Self::NoRuntime(id) => write!(f, "command has no runtime: {id}"),
            Self::Failed { command, message } => write!(f, "command {command} failed: {message}"),
        }
    }
}

impl std::error::Error for CommandError {}

/// Command registry service consumed by the menu builder, the synchronizer, and menu clicks.
pub trait CommandService {
    /// Returns the declaration for a command id.
    fn declaration(&self, id: &CommandId) -> Option<CommandDeclaration>;

    /// Computes the enabled state of every declared command.
    ///
    /// `previous` is the snapshot returned by the last call and may be used for differential
    /// evaluation.
    fn enabled_states(
        &self,
        context: &WhenContext,
        previous: Option<&EnabledStateMap>,
    ) -> EnabledStateMap;

    /// Materializes the menu leaf for a command id, with its id, label and accelerator filled in.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::NotFound`] when the id was never declared.
    fn command_to_menu_item(&self, id: &CommandId) -> Result<MenuNode, CommandError>;

    /// Resolves the accelerator for a command or keymap entry name.
    fn accelerator(&self, name: &str) -> Option<String>;

    /// Executes a command runtime.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] when the command is unknown, has no runtime, or fails.
    fn execute(&self, id: &CommandId, args: Value) -> Result<(), CommandError>;
}
