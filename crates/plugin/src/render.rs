//! Renderers and render actions: the units of source-code mutation.

use crate::settings::SettingsDirectory;
use crate::source::{EditError, SourceFile, SourceFileSet};
use crate::type_system::TypeSystem;
use serde::{Deserialize, Serialize};
use std::io;
use stencil_api::{Declaration, FilePath, Language};
use thiserror::Error;

/// What renderers may consult while rendering.
///
/// Both components are immutable snapshots during the rendering phase.
pub struct RenderContext<'a> {
    pub type_system: &'a TypeSystem,
    pub settings: &'a SettingsDirectory,
}

/// A rendering failure.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error("insertion point `{point}` is required but absent from `{file}`")]
    RequiredPointMissing { file: FilePath, point: String },
    #[error("file `{file}` is not in the {language} subset handed to this renderer")]
    FileOutsideSubset { file: FilePath, language: String },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Other(String),
}

/// The portion of a source set a renderer is allowed to touch: files whose
/// language matches the renderer's.
pub struct SourceSubset<'a> {
    set: &'a mut SourceFileSet,
    language: Language,
}

impl<'a> SourceSubset<'a> {
    pub fn new(set: &'a mut SourceFileSet, language: Language) -> Self {
        Self { set, language }
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    /// Paths of the matching files, in set order.
    pub fn paths(&self) -> Vec<FilePath> {
        self.set
            .iter()
            .filter(|f| self.language.matches(f.path()))
            .map(|f| f.path().clone())
            .collect()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SourceFile> {
        let language = self.language.clone();
        self.set
            .iter_mut()
            .filter(move |f| language.matches(f.path()))
    }

    /// A matching file by path; `None` for absent or out-of-language files.
    pub fn file_mut(&mut self, path: &FilePath) -> Option<&mut SourceFile> {
        if !self.language.matches(path) {
            return None;
        }
        self.set.file_mut(path)
    }

    /// Creates a file; its path must match the renderer's language.
    pub fn create(&mut self, path: FilePath, text: &str) -> Result<&mut SourceFile, RenderError> {
        if !self.language.matches(&path) {
            return Err(RenderError::FileOutsideSubset {
                file: path,
                language: self.language.name().to_owned(),
            });
        }
        Ok(self.set.create(path, text))
    }

    /// Removes a matching file from the set.
    pub fn delete(&mut self, path: &FilePath) -> bool {
        self.language.matches(path) && self.set.delete(path)
    }
}

/// A participant of the rendering phase.
///
/// Renderers run in registration order; each one is handed only the files
/// written in its language.
pub trait Renderer: Send {
    /// Identifies the renderer in diagnostics.
    fn name(&self) -> &str;

    /// The language this renderer serves.
    fn language(&self) -> Language;

    /// Makes changes to the matching subset of the source files.
    fn render(
        &self,
        sources: &mut SourceSubset<'_>,
        ctx: &RenderContext<'_>,
    ) -> Result<(), RenderError>;
}

/// Parameter passed to a render action.
///
/// `Empty` records that a parameter *was* declared with no content, which is
/// distinct from `Absent` (no parameter declared at all).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub enum ActionParameter {
    #[default]
    Absent,
    Empty,
    Value(serde_json::Value),
}

impl ActionParameter {
    pub fn as_value(&self) -> Option<&serde_json::Value> {
        match self {
            ActionParameter::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// One unit of text mutation, bound to a language and applied to a single
/// file, optionally for a single subject declaration.
///
/// Actions are stateless across invocations; everything they need comes
/// through the subject, the parameter, and the context.
pub trait RenderAction: Send {
    fn name(&self) -> &str;

    fn language(&self) -> Language;

    fn apply(
        &self,
        subject: Option<&Declaration>,
        file: &mut SourceFile,
        parameter: &ActionParameter,
        ctx: &RenderContext<'_>,
    ) -> Result<(), RenderError>;
}
