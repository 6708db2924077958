//! Profile-directory file access: templates, keymap overrides, and existence probes.

use std::{cell::RefCell, collections::BTreeMap, future::Future, pin::Pin, rc::Rc};

use serde::{Deserialize, Serialize};

/// Object-safe boxed future used by [`ProfileFs`].
pub type ProfileFsFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// One note template loaded from the template directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteTemplate {
    /// Display label (file name without extension).
    pub label: String,
    /// Template body.
    pub body: String,
}

/// Host service for reading files in the user profile.
pub trait ProfileFs {
    /// Whether a file or directory exists at `path`.
    fn exists<'a>(&'a self, path: &'a str) -> ProfileFsFuture<'a, bool>;

    /// Reads a text file; `Ok(None)` when it does not exist.
    fn read_text<'a>(
        &'a self,
        path: &'a str,
    ) -> ProfileFsFuture<'a, Result<Option<String>, String>>;

    /// Loads every template in `dir`, sorted by label. A missing directory yields no templates.
    fn load_templates<'a>(
        &'a self,
        dir: &'a str,
    ) -> ProfileFsFuture<'a, Result<Vec<NoteTemplate>, String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Profile file service with nothing on disk.
pub struct NoopProfileFs;

impl ProfileFs for NoopProfileFs {
    fn exists<'a>(&'a self, _path: &'a str) -> ProfileFsFuture<'a, bool> {
        Box::pin(async { false })
    }

    fn read_text<'a>(
        &'a self,
        _path: &'a str,
    ) -> ProfileFsFuture<'a, Result<Option<String>, String>> {
        Box::pin(async { Ok(None) })
    }

    fn load_templates<'a>(
        &'a self,
        _dir: &'a str,
    ) -> ProfileFsFuture<'a, Result<Vec<NoteTemplate>, String>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}

#[derive(Debug, Default)]
struct MemoryProfileState {
    files: BTreeMap<String, Result<String, String>>,
    dirs: BTreeMap<String, Vec<NoteTemplate>>,
}

#[derive(Debug, Clone, Default)]
/// In-memory profile file service. Clones share the same files.
pub struct MemoryProfileFs {
    state: Rc<RefCell<MemoryProfileState>>,
}

impl MemoryProfileFs {
    /// Adds a readable text file.
    pub fn insert_file(&self, path: impl Into<String>, contents: impl Into<String>) {
        self.state
            .borrow_mut()
            .files
            .insert(path.into(), Ok(contents.into()));
    }

    /// Adds a file whose reads fail with `message`.
    pub fn insert_unreadable_file(&self, path: impl Into<String>, message: impl Into<String>) {
        self.state
            .borrow_mut()
            .files
            .insert(path.into(), Err(message.into()));
    }

    /// Adds a template directory with the given templates.
    pub fn insert_template_dir(&self, dir: impl Into<String>, templates: Vec<NoteTemplate>) {
        self.state.borrow_mut().dirs.insert(dir.into(), templates);
    }
}

impl ProfileFs for MemoryProfileFs {
    fn exists<'a>(&'a self, path: &'a str) -> ProfileFsFuture<'a, bool> {
        Box::pin(async move {
            let state = self.state.borrow();
            state.files.contains_key(path) || state.dirs.contains_key(path)
        })
    }

    fn read_text<'a>(
        &'a self,
        path: &'a str,
    ) -> ProfileFsFuture<'a, Result<Option<String>, String>> {
        Box::pin(async move {
            match self.state.borrow().files.get(path) {
                None => Ok(None),
                Some(Ok(contents)) => Ok(Some(contents.clone())),
                Some(Err(message)) => Err(format!("could not read {path}: {message}")),
            }
        })
    }

    fn load_templates<'a>(
        &'a self,
        dir: &'a str,
    ) -> ProfileFsFuture<'a, Result<Vec<NoteTemplate>, String>> {
        Box::pin(async move {
            let mut templates = self
                .state
                .borrow()
                .dirs
                .get(dir)
                .cloned()
                .unwrap_or_default();
            templates.sort_by(|left, right| left.label.cmp(&right.label));
            Ok(templates)
        })
    }
}
