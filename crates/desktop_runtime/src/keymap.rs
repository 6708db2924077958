//! Keyboard accelerator table with default entries and user overrides.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

/// Keymap entry names used by menu items that are not backed by commands.
pub mod entries {
    pub const CONFIG: &str = "config";
    pub const HIDE_APP: &str = "hideApp";
    pub const QUIT: &str = "quit";
    pub const CLOSE_WINDOW: &str = "closeWindow";
    pub const INSERT_TEMPLATE: &str = "insertTemplate";
    pub const HELP: &str = "help";
}

const MODIFIERS: &[&str] = &[
    "CommandOrControl",
    "CmdOrCtrl",
    "Command",
    "Cmd",
    "Control",
    "Ctrl",
    "Alt",
    "Option",
    "AltGr",
    "Shift",
    "Super",
    "Meta",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeymapError {
    #[error("keymap is not valid JSON: {0}")]
    Parse(String),
    #[error("keymap entry for unknown command `{0}`")]
    UnknownCommand(String),
    #[error("invalid accelerator `{accelerator}` for `{command}`")]
    InvalidAccelerator { command: String, accelerator: String },
    #[error("accelerator `{accelerator}` is used by both `{first}` and `{second}`")]
    DuplicateAccelerator {
        accelerator: String,
        first: String,
        second: String,
    },
}

#[derive(Debug, Deserialize)]
struct KeymapItem {
    command: String,
    accelerator: Option<String>,
}

/// Accelerator per command or entry name. `None` means the entry explicitly has no shortcut.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keymap {
    entries: BTreeMap<String, Option<String>>,
}

impl Keymap {
    /// Keymap holding the defaults for menu entries that are not commands.
    pub fn with_menu_defaults() -> Self {
        let mut keymap = Self::default();
        for (name, accelerator) in [
            (entries::CONFIG, "CommandOrControl+,"),
            (entries::HIDE_APP, "CommandOrControl+H"),
            (entries::QUIT, "CommandOrControl+Q"),
            (entries::CLOSE_WINDOW, "CommandOrControl+W"),
            (entries::INSERT_TEMPLATE, "CommandOrControl+Alt+I"),
            (entries::HELP, "F1"),
        ] {
            keymap.register_default(name, Some(accelerator.to_string()));
        }
        keymap
    }

    /// Adds an entry unless one already exists.
    pub fn register_default(&mut self, name: &str, accelerator: Option<String>) {
        self.entries
            .entry(name.to_string())
            .or_insert(accelerator);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn accelerator(&self, name: &str) -> Option<String> {
        self.entries.get(name).cloned().flatten()
    }

    /// Applies a JSON override list (`[{ "command": ..., "accelerator": ... }]`).
    ///
    /// Overrides are applied all at once: on any error the keymap is left untouched. Returns the
    /// number of entries whose accelerator changed.
    ///
    /// # Errors
    ///
    /// Returns [`KeymapError`] for malformed JSON, unknown entry names, invalid accelerators, or
    /// an accelerator bound to two entries.
    pub fn apply_overrides_json(&mut self, raw: &str) -> Result<usize, KeymapError> {
        let items: Vec<KeymapItem> =
            serde_json::from_str(raw).map_err(|err| KeymapError::Parse(err.to_string()))?;

        let mut next = self.clone();
        for item in items {
            if !next.contains(&item.command) {
                return Err(KeymapError::UnknownCommand(item.command));
            }
            if let Some(accelerator) = &item.accelerator {
                if !is_valid_accelerator(accelerator) {
                    return Err(KeymapError::InvalidAccelerator {
                        command: item.command,
                        accelerator: accelerator.clone(),
                    });
                }
            }
            next.entries.insert(item.command, item.accelerator);
        }
        next.validate()?;

        let changed = next
            .entries
            .iter()
            .filter(|(name, accelerator)| self.entries.get(*name) != Some(*accelerator))
            .count();
        *self = next;
        Ok(changed)
    }

    /// Checks that no accelerator is bound twice.
    ///
    /// # Errors
    ///
    /// Returns [`KeymapError::DuplicateAccelerator`] for the first clash found.
    pub fn validate(&self) -> Result<(), KeymapError> {
        let mut seen: BTreeMap<String, &str> = BTreeMap::new();
        for (name, accelerator) in &self.entries {
            let Some(accelerator) = accelerator else {
                continue;
            };
            let normalized = normalize(accelerator);
            if let Some(first) = seen.insert(normalized, name.as_str()) {
                return Err(KeymapError::DuplicateAccelerator {
                    accelerator: accelerator.clone(),
                    first: first.to_string(),
                    second: name.clone(),
                });
            }
        }
        Ok(())
    }
}

fn is_valid_accelerator(accelerator: &str) -> bool {
    let parts: Vec<&str> = accelerator.split('+').collect();
    let Some((key, modifiers)) = parts.split_last() else {
        return false;
    };
    // "CommandOrControl++" binds the plus key.
    let key_ok = !key.is_empty() || accelerator.ends_with("++");
    key_ok
        && modifiers
            .iter()
            .filter(|part| !part.is_empty())
            .all(|part| MODIFIERS.contains(part))
}

fn normalize(accelerator: &str) -> String {
    accelerator
        .replace("CmdOrCtrl", "CommandOrControl")
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn keymap() -> Keymap {
        let mut keymap = Keymap::with_menu_defaults();
        keymap.register_default("newNote", Some("CommandOrControl+N".to_string()));
        keymap.register_default("print", None);
        keymap
    }

    #[test]
    fn defaults_resolve_and_are_not_overwritten() {
        let mut keymap = keymap();
        keymap.register_default("newNote", Some("F2".to_string()));
        assert_eq!(
            keymap.accelerator("newNote").as_deref(),
            Some("CommandOrControl+N")
        );
        assert_eq!(keymap.accelerator(entries::HELP).as_deref(), Some("F1"));
        assert_eq!(keymap.accelerator("print"), None);
        assert!(keymap.validate().is_ok());
    }

    #[test]
    fn overrides_replace_and_clear_accelerators() {
        let mut keymap = keymap();
        let changed = keymap
            .apply_overrides_json(
                r#"[
                    { "command": "print", "accelerator": "CommandOrControl+Shift+P" },
                    { "command": "help", "accelerator": null }
                ]"#,
            )
            .expect("apply");
        assert_eq!(changed, 2);
        assert_eq!(
            keymap.accelerator("print").as_deref(),
            Some("CommandOrControl+Shift+P")
        );
        assert_eq!(keymap.accelerator(entries::HELP), None);
    }

    #[test]
    fn invalid_overrides_leave_the_keymap_untouched() {
        let mut keymap = keymap();
        let before = keymap.clone();

        assert_eq!(
            keymap.apply_overrides_json(r#"[{ "command": "nope", "accelerator": "F3" }]"#),
            Err(KeymapError::UnknownCommand("nope".to_string()))
        );
        assert!(matches!(
            keymap.apply_overrides_json(
                r#"[{ "command": "print", "accelerator": "CmdOrCtrl+N" }]"#
            ),
            Err(KeymapError::DuplicateAccelerator { .. })
        ));
        assert!(matches!(
            keymap.apply_overrides_json(
                r#"[{ "command": "print", "accelerator": "Hyper+P" }]"#
            ),
            Err(KeymapError::InvalidAccelerator { .. })
        ));
        assert!(matches!(
            keymap.apply_overrides_json("{ not json"),
            Err(KeymapError::Parse(_))
        ));
        assert_eq!(keymap, before);
    }

    #[test]
    fn accelerator_syntax() {
        assert!(is_valid_accelerator("CommandOrControl+Shift+B"));
        assert!(is_valid_accelerator("F6"));
        assert!(is_valid_accelerator("CommandOrControl++"));
        assert!(!is_valid_accelerator("CommandOrControl+"));
        assert!(!is_valid_accelerator(""));
    }
}
