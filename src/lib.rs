//! # docs-wiki
//!
//! Publishes a repository's documentation folders to its GitHub wiki.
//! Markdown files become wiki pages with flat, lower-case names, links are
//! rewritten so they keep working from the wiki, and a collapsible sidebar
//! mirrors the folder structure.
//!
//! # Pipeline
//!
//! ```text
//! 1. Scan      docs/        →  DirectoryNode tree   (sorted, page files only)
//! 2. Render    tree         →  wiki pages + _Sidebar.md
//! 3. Publish   wiki clone   →  commit + push
//! ```
//!
//! The wiki clone is started before the scan and joined before the render
//! writes anything, so the network fetch overlaps with reading the docs. The
//! render itself is a single depth-first walk: the sidebar is accumulated as an
//! ordered command list during the walk, which only stays balanced if pages
//! are visited in exactly the scan order.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks the configured folders into a [`scan::DirectoryNode`] tree |
//! | [`naming`] | Page names (`Getting_Started.md` → `getting-started.md`) and titles |
//! | [`links`] | Classifies a URL as wiki page, repository file, external or out of project |
//! | [`rewrite`] | Rewrites every link, image and reference definition in a markdown document |
//! | [`sidebar`] | `_Sidebar.md` as a list of open/close/link commands |
//! | [`banner`] | "Do not edit" banner for generated files |
//! | [`publish`] | The render walk tying the above together |
//! | [`git`] | Clone, identity and push for the wiki repository |
//! | [`config`] | `docs-wiki.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Span Splicing Instead of Re-serializing
//!
//! Markdown is parsed with `pulldown-cmark` only to find link destinations.
//! Each destination is located as a byte range of the source and replaced in
//! place. Everything else in the document, including whitespace, tables and
//! code blocks, is copied through untouched, so a page with no local links is
//! published byte-for-byte.
//!
//! ## One Flat Namespace
//!
//! A GitHub wiki has no folders. Two files with the same name in different
//! source folders collide unless `prefix_files_with_dir` is set, which folds
//! the source directory into the page name (`docs|guide|setup.md`).
//!
//! ## Links Stay Inside Their Folder
//!
//! A link becomes a wiki link only when it points at a page file under the
//! same top-level folder as the document containing it. Anything else in the
//! repository links to the file browser on the configured branch, and links
//! that climb out of the repository are left alone with a warning.

pub mod banner;
pub mod config;
pub mod git;
pub mod links;
pub mod naming;
pub mod output;
pub mod publish;
pub mod rewrite;
pub mod scan;
pub mod sidebar;

#[cfg(test)]
pub(crate) mod test_helpers;
