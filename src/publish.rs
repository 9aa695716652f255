//! Rendering a scanned documentation tree into a wiki working copy.
//!
//! The walk is depth-first and strictly in scan order: files of a directory
//! first, then its subdirectories. The sidebar is built as a side effect of
//! the walk, so the order of generated pages and sidebar entries is the same.
//!
//! For each page file:
//!
//! ```text
//! docs/guide/Setup Notes.md
//!   → links rewritten relative to docs/guide
//!   → "do not edit" banner prepended (optional)
//!   → {dest}/{generated_dir}/setup-notes.md
//!   → sidebar link "Setup notes" → /{repo}/wiki/setup-notes
//! ```
//!
//! `_Sidebar.md` and `_Footer.md` are copied to the wiki root untouched. A
//! `_Sidebar.md` anywhere in the tree replaces the generated sidebar for the
//! whole run.

use crate::banner;
use crate::config::{ConfigError, PublishConfig, SectionPolicy};
use crate::git::GitError;
use crate::links::LinkContext;
use crate::naming;
use crate::rewrite::rewrite_links;
use crate::scan::{DirectoryNode, FileEntry, ScanError};
use crate::sidebar::{SidebarBuilder, SidebarError};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SIDEBAR_FILE: &str = "_Sidebar.md";
pub const FOOTER_FILE: &str = "_Footer.md";

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("Sidebar error: {0}")]
    Sidebar(#[from] SidebarError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Git error: {0}")]
    Git(#[from] GitError),
}

/// A page written by the walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedPage {
    /// Source path relative to the repository root.
    pub source: String,
    /// File name in the wiki.
    pub name: String,
    pub title: String,
}

/// What happened to `_Sidebar.md`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SidebarOutcome {
    Generated,
    /// An existing `_Sidebar.md` (source path) was copied instead.
    Overridden(String),
    Disabled,
}

/// Summary of one render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderReport {
    pub pages: Vec<GeneratedPage>,
    /// Reserved files copied verbatim, as source paths.
    pub reserved: Vec<String>,
    pub sidebar: SidebarOutcome,
}

/// Render `tree` (scanned relative to `source_root`) into `dest`.
///
/// Any I/O failure aborts the render.
pub fn render(
    tree: &DirectoryNode,
    source_root: &Path,
    dest: &Path,
    config: &PublishConfig,
) -> Result<RenderReport, PublishError> {
    let ctx = config.link_context();
    let sidebar = config.sidebar.then(|| {
        if config.edit_warning {
            SidebarBuilder::with_edit_warning(ctx.clone(), config.sidebar_indent)
        } else {
            SidebarBuilder::new(ctx.clone(), config.sidebar_indent)
        }
    });

    let mut walker = Walker {
        config,
        ctx,
        source_root,
        dest,
        pages_dir: pages_dir(dest, &config.generated_dir),
        sidebar,
        report: RenderReport {
            pages: Vec::new(),
            reserved: Vec::new(),
            sidebar: SidebarOutcome::Disabled,
        },
    };
    walker.walk(tree)?;

    let Walker {
        sidebar, mut report, ..
    } = walker;
    if let Some(builder) = sidebar {
        fs::create_dir_all(dest)?;
        fs::write(dest.join(SIDEBAR_FILE), builder.dumps()?)?;
        tracing::info!(links = report.pages.len(), "generated {SIDEBAR_FILE}");
        report.sidebar = SidebarOutcome::Generated;
    }
    Ok(report)
}

fn pages_dir(dest: &Path, generated_dir: &str) -> PathBuf {
    let sub = generated_dir.trim_matches('/');
    if sub.is_empty() {
        dest.to_path_buf()
    } else {
        dest.join(sub)
    }
}

/// `dir/name`, or `name` at the synthetic root.
fn source_path(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

struct Walker<'a> {
    config: &'a PublishConfig,
    ctx: LinkContext,
    source_root: &'a Path,
    dest: &'a Path,
    pages_dir: PathBuf,
    sidebar: Option<SidebarBuilder>,
    report: RenderReport,
}

impl Walker<'_> {
    fn walk(&mut self, dir: &DirectoryNode) -> Result<(), PublishError> {
        let sectioned = self.config.sidebar_sections == SectionPolicy::NonEmpty
            && !dir.path.is_empty()
            && dir.total_file_count > 0;
        let mut opened = false;
        if sectioned && let Some(sidebar) = self.sidebar.as_mut() {
            sidebar.open_section(dir.name(), true, None);
            opened = true;
        }

        for file in &dir.files {
            self.publish_file(dir, file)?;
        }
        for sub in &dir.subdirectories {
            self.walk(sub)?;
        }

        // The sidebar may have been dropped by a _Sidebar.md further down.
        if opened && let Some(sidebar) = self.sidebar.as_mut() {
            sidebar.close_section();
        }
        Ok(())
    }

    fn publish_file(&mut self, dir: &DirectoryNode, file: &FileEntry) -> Result<(), PublishError> {
        let source = source_path(&dir.path, &file.name);
        let full = self.source_root.join(&source);

        if file.name == SIDEBAR_FILE || file.name == FOOTER_FILE {
            fs::create_dir_all(self.dest)?;
            fs::copy(&full, self.dest.join(&file.name))?;
            if file.name == SIDEBAR_FILE && self.sidebar.take().is_some() {
                tracing::warn!(%source, "existing {SIDEBAR_FILE} found, not generating one");
            }
            if file.name == SIDEBAR_FILE {
                self.report.sidebar = SidebarOutcome::Overridden(source.clone());
            }
            tracing::info!(%source, "copied reserved file");
            self.report.reserved.push(source);
            return Ok(());
        }

        let text = fs::read_to_string(&full)?;
        let mut content = rewrite_links(&text, &dir.path, &self.ctx);
        if self.config.edit_warning {
            content = format!("{}\n{content}", banner::edit_warning(Some(&source)));
        }

        let prefix = self.ctx.prefix_with_dir.then_some(dir.path.as_str());
        let name = naming::standardize(&file.name, prefix);
        fs::create_dir_all(&self.pages_dir)?;
        fs::write(self.pages_dir.join(&name), content)?;
        tracing::info!(%source, page = %name, "generated page");

        let title = naming::header(&file.name);
        if let Some(sidebar) = self.sidebar.as_mut() {
            sidebar.add_link(&title, &name);
        }
        self.report.pages.push(GeneratedPage {
            source,
            name,
            title,
        });
        Ok(())
    }
}
