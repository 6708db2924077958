//! Import/export module catalog used to populate the import and export submenus.

use notes_command_contract::ImportSource;
use serde::{Deserialize, Serialize};

/// Direction-specific capabilities of an interop module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum InteropModuleKind {
    /// Reads notes from one or more source kinds.
    Importer {
        /// Accepted sources, in menu order.
        sources: Vec<ImportSource>,
        /// Whether the module imports a whole notebook archive.
        is_note_archive: bool,
    },
    /// Writes notes out.
    Exporter {
        /// Whether the module can export every note at once.
        can_do_multi_export: bool,
    },
}

/// One import or export format module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteropModule {
    /// Format token, such as `md` or `jex`.
    pub format: String,
    /// Human-readable description.
    pub description: String,
    /// File extensions accepted by file imports.
    pub file_extensions: Vec<String>,
    /// Import/export capabilities.
    pub kind: InteropModuleKind,
}

impl InteropModule {
    /// Creates an importer module.
    pub fn importer(
        format: impl Into<String>,
        description: impl Into<String>,
        sources: Vec<ImportSource>,
    ) -> Self {
        Self {
            format: format.into(),
            description: description.into(),
            file_extensions: Vec::new(),
            kind: InteropModuleKind::Importer {
                sources,
                is_note_archive: false,
            },
        }
    }

    /// Creates an exporter module.
    pub fn exporter(
        format: impl Into<String>,
        description: impl Into<String>,
        can_do_multi_export: bool,
    ) -> Self {
        Self {
            format: format.into(),
            description: description.into(),
            file_extensions: Vec::new(),
            kind: InteropModuleKind::Exporter {
                can_do_multi_export,
            },
        }
    }

    /// Sets accepted file extensions.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.file_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Marks an importer as a notebook archive importer.
    pub fn note_archive(mut self) -> Self {
        if let InteropModuleKind::Importer {
            is_note_archive, ..
        } = &mut self.kind
        {
            *is_note_archive = true;
        }
        self
    }

    /// Menu label, e.g. `MD - Markdown (Directory)`.
    ///
    /// The source suffix is only added when the module accepts more than one source kind.
    pub fn full_label(&self, source: Option<ImportSource>) -> String {
        let mut label = format!("{} - {}", self.format.to_uppercase(), self.description);
        let multi_source = matches!(
            &self.kind,
            InteropModuleKind::Importer { sources, .. } if sources.len() > 1
        );
        if let (Some(source), true) = (source, multi_source) {
            label.push_str(match source {
                ImportSource::File => " (File)",
                ImportSource::Directory => " (Directory)",
            });
        }
        label
    }
}

/// Host service listing available interop modules.
pub trait InteropCatalog {
    /// Returns modules in menu order.
    fn modules(&self) -> Vec<InteropModule>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Catalog backed by a fixed module list.
pub struct StaticInteropCatalog {
    modules: Vec<InteropModule>,
}

impl StaticInteropCatalog {
    /// Creates a catalog with the given modules.
    pub fn new(modules: Vec<InteropModule>) -> Self {
        Self { modules }
    }

    /// Catalog with no modules.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl Default for StaticInteropCatalog {
    fn default() -> Self {
        Self::new(vec![
            InteropModule::exporter("jex", "Joplin Export File", true),
            InteropModule::exporter("raw", "Joplin Export Directory", true),
            InteropModule::exporter("json", "Json Export Directory", true),
            InteropModule::exporter("md", "Markdown", true),
            InteropModule::exporter("html", "HTML Directory", true),
            InteropModule::exporter("pdf", "PDF File", false),
            InteropModule::importer("jex", "Joplin Export File", vec![ImportSource::File])
                .with_extensions(["jex"])
                .note_archive(),
            InteropModule::importer(
                "md",
                "Markdown",
                vec![ImportSource::File, ImportSource::Directory],
            )
            .with_extensions(["md", "markdown"]),
            InteropModule::importer("raw", "Joplin Export Directory", vec![ImportSource::Directory]),
            InteropModule::importer(
                "enex",
                "Evernote Export File (as Markdown)",
                vec![ImportSource::File],
            )
            .with_extensions(["enex"]),
        ])
    }
}

impl InteropCatalog for StaticInteropCatalog {
    fn modules(&self) -> Vec<InteropModule> {
        self.modules.clone()
    }
}
