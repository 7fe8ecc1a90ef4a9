//! In-memory, write-back model of a directory of text files.
//!
//! A `SourceFileSet` is loaded once, mutated in memory by renderers, and
//! flushed to disk in a single pass at the end of a successful run. No file
//! is touched on disk before the flush.

use crate::insertion::{locate_in_lines, split_lines, Coordinates, InsertionPoint};
use indexmap::IndexMap;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use stencil_api::{FilePath, Language};
use thiserror::Error;
use tracing::debug;

/// A failed in-memory edit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error(
        "insertion point `{point}` in `{file}` is non-repeating and already populated"
    )]
    AlreadyPopulated { file: FilePath, point: String },
}

/// Outcome of an insertion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inserted {
    /// The code was added to the file.
    Added,
    /// The code was already present; the file is unchanged.
    AlreadyPresent,
    /// The marker is absent from the file; nothing was done.
    NoMarker,
}

/// One text file of the set, addressed by its root-relative path.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: FilePath,
    lines: Vec<String>,
    terminated: bool,
    changed: bool,
    populated: BTreeSet<String>,
}

impl SourceFile {
    pub fn from_text(path: FilePath, text: &str) -> Self {
        let (lines, terminated) = split_lines(text);
        Self {
            path,
            lines,
            terminated,
            changed: false,
            populated: BTreeSet::new(),
        }
    }

    pub fn path(&self) -> &FilePath {
        &self.path
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The current content, with `\n` line endings.
    pub fn text(&self) -> String {
        let mut out = self.lines.join("\n");
        if self.terminated && !self.lines.is_empty() {
            out.push('\n');
        }
        out
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Replaces the whole content of the file.
    pub fn overwrite(&mut self, text: &str) {
        let (lines, terminated) = split_lines(text);
        self.lines = lines;
        self.terminated = terminated;
        self.changed = true;
    }

    /// Locates the given insertion point in this file.
    pub fn locate(&self, point: &InsertionPoint, language: &Language) -> Coordinates {
        locate_in_lines(&point.marker(language), &self.lines)
    }

    /// A whole-line inserter at the given point, or `None` when the marker
    /// is absent. Callers decide whether absence means "skip this file" or
    /// an error of their own contract.
    pub fn at(&mut self, point: InsertionPoint, language: &Language) -> Option<SourceAtLine<'_>> {
        if self.locate(&point, language).is_nowhere() {
            return None;
        }
        let marker = point.marker(language);
        Some(SourceAtLine {
            file: self,
            point,
            marker,
            indent_unit: 4,
            indent_level: 0,
        })
    }

    /// An inline inserter at the given point, or `None` when absent.
    pub fn at_inline(
        &mut self,
        point: InsertionPoint,
        language: &Language,
    ) -> Option<SourceAtPoint<'_>> {
        if self.locate(&point, language).is_nowhere() {
            return None;
        }
        let marker = point.marker(language);
        Some(SourceAtPoint {
            file: self,
            point,
            marker,
        })
    }

    fn mark_populated(&mut self, point: &InsertionPoint) -> Result<(), EditError> {
        if point.is_repeating() {
            return Ok(());
        }
        if !self.populated.insert(point.label().to_owned()) {
            return Err(EditError::AlreadyPopulated {
                file: self.path.clone(),
                point: point.label().to_owned(),
            });
        }
        Ok(())
    }
}

/// Inserts whole lines right below every occurrence of an insertion point.
pub struct SourceAtLine<'a> {
    file: &'a mut SourceFile,
    point: InsertionPoint,
    marker: String,
    indent_unit: usize,
    indent_level: usize,
}

impl SourceAtLine<'_> {
    /// Extra indentation prepended to every inserted line.
    pub fn with_extra_indentation(mut self, level: usize) -> Self {
        self.indent_level = level;
        self
    }

    /// Adds the given code lines below each marker line.
    ///
    /// Re-adding the same lines at a non-repeating point is a no-op, so
    /// re-running a pipeline over already-generated output leaves the file
    /// unchanged. Inserting *different* content at an already-populated
    /// non-repeating point is rejected.
    pub fn add(self, lines: &[&str]) -> Result<Inserted, EditError> {
        if lines.is_empty() {
            return Ok(Inserted::AlreadyPresent);
        }
        let pad = " ".repeat(self.indent_unit * self.indent_level);
        let rendered: Vec<String> = lines.iter().map(|l| format!("{pad}{l}")).collect();
        if !self.point.is_repeating() && rendered.iter().all(|l| self.file.lines.contains(l)) {
            return Ok(Inserted::AlreadyPresent);
        }
        self.file.mark_populated(&self.point)?;
        let mut updated = Vec::with_capacity(self.file.lines.len() + rendered.len());
        let mut found = false;
        for line in &self.file.lines {
            updated.push(line.clone());
            if line.contains(&self.marker) {
                updated.extend(rendered.iter().cloned());
                found = true;
            }
        }
        if !found {
            return Ok(Inserted::NoMarker);
        }
        debug!(file = %self.file.path, point = self.point.label(), "inserted lines");
        self.file.lines = updated;
        self.file.changed = true;
        Ok(Inserted::Added)
    }
}

/// Inserts a code fragment right after each inline occurrence of a point.
pub struct SourceAtPoint<'a> {
    file: &'a mut SourceFile,
    point: InsertionPoint,
    marker: String,
}

impl SourceAtPoint<'_> {
    /// Adds the fragment after every occurrence of the marker.
    ///
    /// The fragment must not contain line separators.
    pub fn add(self, fragment: &str) -> Result<Inserted, EditError> {
        debug_assert!(
            !fragment.contains('\n') && !fragment.contains('\r'),
            "inline fragments must be single-line"
        );
        if !self.point.is_repeating() && self.file.contains(fragment) {
            return Ok(Inserted::AlreadyPresent);
        }
        self.file.mark_populated(&self.point)?;
        let mut changed = false;
        for line in &mut self.file.lines {
            if !line.contains(&self.marker) {
                continue;
            }
            *line = line.replace(&self.marker, &format!("{}{}", self.marker, fragment));
            changed = true;
        }
        if !changed {
            return Ok(Inserted::NoMarker);
        }
        self.file.changed = true;
        Ok(Inserted::Added)
    }
}

/// All files under one root directory, loaded into memory.
#[derive(Debug)]
pub struct SourceFileSet {
    root: PathBuf,
    files: IndexMap<FilePath, SourceFile>,
    deleted: Vec<FilePath>,
}

impl SourceFileSet {
    pub fn empty(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: IndexMap::new(),
            deleted: Vec::new(),
        }
    }

    /// Reads every regular file under `root`. File contents are loaded in
    /// parallel; the relative-path order stays deterministic.
    pub fn from_directory(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        let mut paths: Vec<PathBuf> = walkdir::WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .collect();
        paths.sort();
        let contents: io::Result<Vec<String>> =
            paths.par_iter().map(fs::read_to_string).collect();
        let contents = contents?;
        let mut files = IndexMap::new();
        for (abs, text) in paths.iter().zip(contents) {
            let rel = abs.strip_prefix(&root).unwrap_or(abs);
            let path = FilePath::new(rel.to_string_lossy().replace('\\', "/"));
            files.insert(path.clone(), SourceFile::from_text(path, &text));
        }
        debug!(root = %root.display(), files = files.len(), "loaded source set");
        Ok(Self {
            root,
            files,
            deleted: Vec::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn file(&self, path: &FilePath) -> Option<&SourceFile> {
        self.files.get(path)
    }

    pub fn file_mut(&mut self, path: &FilePath) -> Option<&mut SourceFile> {
        self.files.get_mut(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SourceFile> {
        self.files.values_mut()
    }

    /// Creates a new file, or fully replaces the content of an existing one.
    pub fn create(&mut self, path: FilePath, text: &str) -> &mut SourceFile {
        let mut file = SourceFile::from_text(path.clone(), text);
        file.changed = true;
        self.deleted.retain(|p| p != &path);
        match self.files.entry(path) {
            indexmap::map::Entry::Occupied(mut slot) => {
                slot.insert(file);
                slot.into_mut()
            }
            indexmap::map::Entry::Vacant(slot) => slot.insert(file),
        }
    }

    /// Removes a file from the set; the on-disk copy goes away at write-back.
    pub fn delete(&mut self, path: &FilePath) -> bool {
        if self.files.shift_remove(path).is_some() {
            self.deleted.push(path.clone());
            true
        } else {
            false
        }
    }

    /// Flushes all staged changes to disk and returns the number of files
    /// written. Unchanged files are left alone.
    pub fn write_back(&self) -> io::Result<usize> {
        let mut written = 0;
        for file in self.files.values() {
            if !file.changed {
                continue;
            }
            let target = self.root.join(file.path.as_str());
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, file.text())?;
            written += 1;
        }
        for path in &self.deleted {
            let target = self.root.join(path.as_str());
            if target.exists() {
                fs::remove_file(&target)?;
            }
        }
        debug!(written, deleted = self.deleted.len(), "source set flushed");
        Ok(written)
    }
}
