//! Settings persistence: the host key/value store and the JSON codec for setting values.
//!
//! Every setting lives under its own key in the `settings.` namespace, stored as JSON text.

use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    future::Future,
    pin::Pin,
    rc::Rc,
};

use serde_json::Value;
use thiserror::Error;

/// Namespace prefixed to every setting key in the backing store.
pub const SETTINGS_NAMESPACE: &str = "settings.";

/// Object-safe boxed future used by [`PrefsStore`] async methods.
pub type PrefsStoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host key/value store holding raw JSON text per key.
pub trait PrefsStore {
    /// Loads the raw JSON stored under `key`, `None` when nothing was saved.
    fn load_pref<'a>(
        &'a self,
        key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, String>>;

    /// Replaces the raw JSON stored under `key`.
    fn save_pref<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), String>>;
}

/// Failure to load or save one setting.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrefsError {
    /// The backing store rejected the operation.
    #[error("setting `{key}` could not be stored: {message}")]
    Store {
        /// Setting key (without namespace).
        key: String,
        /// Store message.
        message: String,
    },
    /// The stored text is not valid JSON.
    #[error("setting `{key}` holds malformed JSON: {message}")]
    Malformed {
        /// Setting key (without namespace).
        key: String,
        /// Parser message.
        message: String,
    },
}

/// Store key for a setting.
pub fn setting_pref_key(key: &str) -> String {
    format!("{SETTINGS_NAMESPACE}{key}")
}

/// Loads the persisted value of setting `key`.
///
/// # Errors
///
/// Returns [`PrefsError::Store`] when the store fails and [`PrefsError::Malformed`] when the
/// stored text is not JSON.
pub async fn load_setting_value<S: PrefsStore + ?Sized>(
    store: &S,
    key: &str,
) -> Result<Option<Value>, PrefsError> {
    let raw = store
        .load_pref(&setting_pref_key(key))
        .await
        .map_err(|message| PrefsError::Store {
            key: key.to_string(),
            message,
        })?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|err| PrefsError::Malformed {
            key: key.to_string(),
            message: err.to_string(),
        })
}

/// Persists `value` as setting `key`.
///
/// # Errors
///
/// Returns [`PrefsError::Store`] when the store rejects the write.
pub async fn save_setting_value<S: PrefsStore + ?Sized>(
    store: &S,
    key: &str,
    value: &Value,
) -> Result<(), PrefsError> {
    // `Value` serializes infallibly.
    let raw = value.to_string();
    store
        .save_pref(&setting_pref_key(key), &raw)
        .await
        .map_err(|message| PrefsError::Store {
            key: key.to_string(),
            message,
        })
}

#[derive(Debug, Clone, Copy, Default)]
/// Store for headless runs: nothing is persisted, every save succeeds.
pub struct NoopPrefsStore;

impl PrefsStore for NoopPrefsStore {
    fn load_pref<'a>(
        &'a self,
        _key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, String>> {
        Box::pin(async { Ok(None) })
    }

    fn save_pref<'a>(
        &'a self,
        _key: &'a str,
        _raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }
}

#[derive(Debug, Default)]
struct MemoryPrefsState {
    entries: BTreeMap<String, String>,
    save_failure: Option<String>,
}

#[derive(Debug, Clone, Default)]
/// In-memory store. Clones share the same entries.
pub struct MemoryPrefsStore {
    state: Rc<RefCell<MemoryPrefsState>>,
    save_count: Rc<Cell<u64>>,
}

impl MemoryPrefsStore {
    /// Creates a store pre-populated with `(store key, raw JSON)` entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::default();
        store.state.borrow_mut().entries.extend(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into())),
        );
        store
    }

    /// Raw JSON stored under a store key.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.state.borrow().entries.get(key).cloned()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> u64 {
        self.save_count.get()
    }

    /// Makes every subsequent save fail with `message`.
    pub fn fail_saves(&self, message: impl Into<String>) {
        self.state.borrow_mut().save_failure = Some(message.into());
    }
}

impl PrefsStore for MemoryPrefsStore {
    fn load_pref<'a>(
        &'a self,
        key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, String>> {
        Box::pin(async move { Ok(self.raw(key)) })
    }

    fn save_pref<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            let mut state = self.state.borrow_mut();
            if let Some(message) = &state.save_failure {
                return Err(message.clone());
            }
            state
                .entries
                .insert(key.to_string(), raw_json.to_string());
            self.save_count.set(self.save_count.get() + 1);
            Ok(())
        })
    }
}
