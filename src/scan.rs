//! Documentation tree scanning.
//!
//! Builds an in-memory [`DirectoryNode`] tree of the folders being published.
//! Only files whose extension is one of the page extensions are kept; hidden
//! entries are skipped. Entries are sorted by name so that the walk (and the
//! sidebar built from it) is the same on every machine.
//!
//! ```text
//! (root, path "")                  total_file_count = 4
//! └── docs/                        total_file_count = 4
//!     ├── Home.md
//!     ├── _Sidebar.md
//!     ├── guide/                   total_file_count = 2
//!     │   ├── Setup.md
//!     │   └── Usage.md
//!     └── img/                     total_file_count = 0
//! ```
//!
//! Configured folders always hang under a synthetic root with an empty path,
//! so each folder becomes a top-level section of the sidebar.

use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Not a directory: {0}")]
    NotADirectory(String),
}

/// A file kept by the scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub name: String,
}

/// One scanned directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryNode {
    /// Path as given by the caller, children joined with `/`.
    pub path: String,
    pub files: Vec<FileEntry>,
    pub subdirectories: Vec<DirectoryNode>,
    /// `files.len()` plus the total of every subdirectory.
    pub total_file_count: usize,
}

impl DirectoryNode {
    /// Assemble a node, computing its total from its children.
    pub fn new(path: impl Into<String>, files: Vec<FileEntry>, subdirectories: Vec<DirectoryNode>) -> Self {
        let total_file_count =
            files.len() + subdirectories.iter().map(|d| d.total_file_count).sum::<usize>();
        Self {
            path: path.into(),
            files,
            subdirectories,
            total_file_count,
        }
    }

    /// Final path segment, used as the sidebar section title.
    pub fn name(&self) -> &str {
        crate::naming::base_name(&self.path)
    }
}

/// True when `name` ends in one of `extensions` (compared in lower case).
pub fn has_page_extension(name: &str, extensions: &[String]) -> bool {
    let ext = crate::naming::extension(name).to_lowercase();
    !ext.is_empty() && extensions.iter().any(|e| *e == ext)
}

/// Scan every configured folder under a synthetic root.
///
/// `folders` are relative to `root`, the repository checkout; node paths keep
/// that relative form so links can be resolved against them.
pub fn scan_folders(
    root: &Path,
    folders: &[String],
    extensions: &[String],
) -> Result<DirectoryNode, ScanError> {
    let children = folders
        .iter()
        .map(|folder| scan_directory(root, folder, extensions))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(DirectoryNode::new("", Vec::new(), children))
}

/// Scan `root/dir` recursively.
pub fn scan_directory(root: &Path, dir: &str, extensions: &[String]) -> Result<DirectoryNode, ScanError> {
    let full = root.join(dir);
    if !full.is_dir() {
        return Err(ScanError::NotADirectory(full.display().to_string()));
    }

    let mut files = Vec::new();
    let mut subdirectories = Vec::new();

    let entries = WalkDir::new(&full)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !e.file_name().to_string_lossy().starts_with('.'));

    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        let file_type = entry.file_type();
        if file_type.is_dir() {
            let child = format!("{}/{}", dir.trim_end_matches('/'), name);
            subdirectories.push(scan_directory(root, &child, extensions)?);
        } else if file_type.is_file() && has_page_extension(&name, extensions) {
            files.push(FileEntry { name });
        }
    }

    Ok(DirectoryNode::new(dir, files, subdirectories))
}
