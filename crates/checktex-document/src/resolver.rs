//! File lookup for inclusion directives
//!
//! The flattener never touches the file system directly. It asks a
//! [`FileResolver`] to turn the argument of `\input{...}` into a path and
//! to read that path, so documents can come from disk or from memory.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use crate::error::ParseError;

/// Resolves and reads the files of a document.
pub trait FileResolver: Send + Sync {
    /// Directory that inclusion arguments are relative to.
    fn root(&self) -> &Path;

    /// Whether `path` (as produced by [`FileResolver::resolve`]) exists.
    fn exists(&self, path: &str) -> bool;

    /// Read the verbatim content of `path`.
    fn read(&self, path: &str) -> Result<String, ParseError>;

    /// Turn an inclusion argument into an existing path.
    ///
    /// Candidates are tried in order: relative to the root, then relative
    /// to the including file's directory. Names without an extension are
    /// also tried with `.tex` appended.
    fn resolve(&self, name: &str, including: Option<&str>) -> Option<String> {
        let mut bases = vec![self.root().to_path_buf()];
        if let Some(dir) = including.and_then(|path| Path::new(path).parent()) {
            bases.push(dir.to_path_buf());
        }

        let mut names = vec![name.to_string()];
        if Path::new(name).extension().is_none() {
            names.push(format!("{}.tex", name));
        }

        bases
            .iter()
            .flat_map(|base| names.iter().map(move |name| normalize(&base.join(name))))
            .find(|candidate| self.exists(candidate))
    }
}

/// Normalize a path lexically: drop `.` components and resolve `..`
/// against the preceding component. Does not consult the file system.
pub fn normalize(path: &Path) -> String {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized.to_string_lossy().into_owned()
}

/// Files held in memory, keyed by normalized path.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFiles {
    root: PathBuf,
    files: HashMap<String, String>,
}

impl InMemoryFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        InMemoryFiles {
            root: root.into(),
            files: HashMap::new(),
        }
    }

    /// Add a file; relative paths are taken relative to the root.
    pub fn with_file(mut self, path: &str, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: &str, content: impl Into<String>) {
        let key = normalize(&self.root.join(path));
        self.files.insert(key, content.into());
    }
}

impl FileResolver for InMemoryFiles {
    fn root(&self) -> &Path {
        &self.root
    }

    fn exists(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    fn read(&self, path: &str) -> Result<String, ParseError> {
        self.files.get(path).cloned().ok_or_else(|| ParseError::Io {
            path: path.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such in-memory file"),
        })
    }
}

/// Files read from disk below a project root.
#[derive(Debug, Clone)]
pub struct FileSystemResolver {
    root: PathBuf,
}

impl FileSystemResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileSystemResolver { root: root.into() }
    }
}

impl FileResolver for FileSystemResolver {
    fn root(&self) -> &Path {
        &self.root
    }

    fn exists(&self, path: &str) -> bool {
        Path::new(path).is_file()
    }

    fn read(&self, path: &str) -> Result<String, ParseError> {
        std::fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_string(),
            source,
        })
    }
}
