//! Link classification for documentation published to a wiki.
//!
//! Every URL found in a document is sorted into one of a few buckets relative
//! to the directory the document lives in:
//!
//! | URL (from `docs/`)       | Target                          | Rewritten to                 |
//! |--------------------------|---------------------------------|------------------------------|
//! | `https://example.com`    | [`LinkTarget::External`]        | unchanged                    |
//! | `#usage`                 | [`LinkTarget::Anchor`]          | unchanged                    |
//! | `other/Page.md`          | [`LinkTarget::WikiPage`]        | `/{repo}/wiki/page`          |
//! | `img/logo.png`           | [`LinkTarget::RepoBlob`]        | `/{repo}/blob/{branch}/docs/img/logo.png` |
//! | `../src/main.rs`         | [`LinkTarget::RepoBlob`]        | `/{repo}/blob/{branch}/src/main.rs` |
//! | `../../elsewhere.md`     | [`LinkTarget::OutOfProject`]    | unchanged, with a warning    |
//!
//! A local link stays "inside the published tree" when the top-level directory
//! of the file it points at matches the top-level directory of the document.
//! Only those links can become wiki pages; everything else in the repository
//! is linked through the ordinary file browser.

use crate::naming::{self, base_name, normalize, parent};
use regex::Regex;
use std::sync::LazyLock;

static SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*):").expect("scheme regex is valid"));

/// Repository facts every classification needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkContext {
    /// `owner/name` of the repository the documentation belongs to.
    pub repo: String,
    /// Branch used for repository blob links.
    pub branch: String,
    /// Extensions (with leading dot) of files that become wiki pages.
    /// Compared case-sensitively against link extensions.
    pub wiki_extensions: Vec<String>,
    /// Prefix page names with their flattened source directory.
    pub prefix_with_dir: bool,
}

impl LinkContext {
    pub fn new(repo: &str, branch: &str, wiki_extensions: &[&str], prefix_with_dir: bool) -> Self {
        Self {
            repo: repo.trim_matches('/').to_string(),
            branch: branch.to_string(),
            wiki_extensions: wiki_extensions.iter().map(|e| e.to_string()).collect(),
            prefix_with_dir,
        }
    }

    fn is_wiki_page(&self, name: &str) -> bool {
        let ext = naming::extension(name);
        !ext.is_empty() && self.wiki_extensions.iter().any(|e| e == ext)
    }

    /// `/{repo}/wiki/{slug}` for a file name, standardized and without extension.
    pub fn wiki_url(&self, name: &str) -> String {
        let standardized = naming::standardize(base_name(name), None);
        format!("/{}/wiki/{}", self.repo, naming::strip_extension(&standardized))
    }

    /// `/{repo}/blob/{branch}/{path}`, extension preserved.
    pub fn blob_url(&self, path: &str) -> String {
        format!(
            "/{}/blob/{}/{}",
            self.repo,
            self.branch,
            path.trim_start_matches('/')
        )
    }
}

/// Where a URL points once it has been classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// Another generated page. `fragment` keeps its leading `#` or is empty.
    WikiPage { slug: String, fragment: String },
    /// A file in the repository, path relative to the repository root.
    RepoBlob { path: String, fragment: String },
    /// A URL with a network scheme.
    External(String),
    /// An empty URL or an in-page `#anchor`.
    Anchor(String),
    /// A local path that climbs above the repository root.
    OutOfProject(String),
}

impl LinkTarget {
    /// Render the rewritten URL.
    pub fn to_url(&self, ctx: &LinkContext) -> String {
        match self {
            LinkTarget::WikiPage { slug, fragment } => {
                format!("/{}/wiki/{slug}{fragment}", ctx.repo)
            }
            LinkTarget::RepoBlob { path, fragment } => format!("{}{fragment}", ctx.blob_url(path)),
            LinkTarget::External(url) | LinkTarget::Anchor(url) | LinkTarget::OutOfProject(url) => {
                url.clone()
            }
        }
    }
}

/// True for URLs with a network-style scheme. Drive letters (`C:\`) and
/// `file:` URLs are local.
pub fn is_external(url: &str) -> bool {
    SCHEME
        .captures(url)
        .and_then(|caps| caps.get(1))
        .is_some_and(|scheme| scheme.len() > 1 && !scheme.as_str().eq_ignore_ascii_case("file"))
}

/// First component of a directory path: `/` when rooted, `.` for the current
/// directory.
pub fn top_level_dir(dir: &str) -> String {
    let normalized = normalize(dir);
    if normalized.starts_with('/') {
        return "/".to_string();
    }
    normalized
        .split('/')
        .next()
        .unwrap_or(".")
        .to_string()
}

/// Resolve a local link against the directory of the document containing it.
/// Rooted links resolve from the repository root.
pub fn resolve(current_dir: &str, path: &str) -> String {
    if let Some(from_root) = path.strip_prefix('/') {
        return normalize(from_root);
    }
    if current_dir.is_empty() {
        return normalize(path);
    }
    normalize(&format!("{current_dir}/{path}"))
}

/// Classify `url`, found in a document inside `current_dir`.
pub fn classify(url: &str, current_dir: &str, ctx: &LinkContext) -> LinkTarget {
    if url.is_empty() || url.starts_with('#') {
        return LinkTarget::Anchor(url.to_string());
    }
    if is_external(url) {
        return LinkTarget::External(url.to_string());
    }

    let (path, fragment) = match url.find('#') {
        Some(pos) => (&url[..pos], url[pos..].to_string()),
        None => (url, String::new()),
    };
    let resolved = resolve(current_dir, path);
    let current_top = top_level_dir(if current_dir.is_empty() { "." } else { current_dir });

    if top_level_dir(parent(&resolved)) == current_top {
        let file_name = base_name(&resolved);
        if ctx.is_wiki_page(base_name(path)) {
            let dir = ctx.prefix_with_dir.then(|| parent(&resolved));
            let standardized = naming::standardize(file_name, dir);
            tracing::debug!(url, %resolved, "wiki page link");
            return LinkTarget::WikiPage {
                slug: naming::strip_extension(&standardized).to_string(),
                fragment,
            };
        }
        return LinkTarget::RepoBlob { path: resolved, fragment };
    }

    if resolved == ".." || resolved.starts_with("../") {
        tracing::warn!(url, current_dir, "link is not in the project directory, leaving as is");
        return LinkTarget::OutOfProject(url.to_string());
    }
    LinkTarget::RepoBlob { path: resolved, fragment }
}

/// Classify and render in one step.
pub fn rewrite_url(url: &str, current_dir: &str, ctx: &LinkContext) -> String {
    classify(url, current_dir, ctx).to_url(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::count_warnings;

    fn ctx() -> LinkContext {
        LinkContext::new("owner/repo", "main", &[".md"], false)
    }

    #[test]
    fn external_urls_are_untouched() {
        for url in [
            "https://example.com/x.png",
            "http://example.com/docs/file.md",
            "mailto:someone@example.com",
        ] {
            assert_eq!(classify(url, "docs", &ctx()), LinkTarget::External(url.into()));
            assert_eq!(rewrite_url(url, "docs", &ctx()), url);
        }
    }

    #[test]
    fn local_url_detection() {
        assert!(!is_external("file:///C:/Users/username/Documents/"));
        assert!(!is_external("C:\\Users\\username\\Documents"));
        assert!(!is_external("/home/user/Documents/doc.pdf"));
        assert!(!is_external("Documents/doc.pdf"));
        assert!(!is_external("./Documents/doc.pdf"));
        assert!(!is_external("../Documents/doc.pdf"));
        assert!(is_external("https://example.com"));
        assert!(is_external("http://example.com/docs/file.md"));
    }

    #[test]
    fn same_tree_page_becomes_wiki_link() {
        assert_eq!(rewrite_url("file.md", "docs", &ctx()), "/owner/repo/wiki/file");
        assert_eq!(
            rewrite_url("Other Page.md", "docs", &ctx()),
            "/owner/repo/wiki/other-page"
        );
        assert_eq!(rewrite_url("other/B.md", "docs", &ctx()), "/owner/repo/wiki/b");
    }

    #[test]
    fn wiki_link_with_directory_prefix() {
        let ctx = LinkContext::new("owner/repo", "main", &[".md"], true);
        assert_eq!(
            rewrite_url("other/B.md", "docs", &ctx),
            "/owner/repo/wiki/docs|other|b"
        );
        assert_eq!(
            rewrite_url("../Intro.md", "docs/guide", &ctx),
            "/owner/repo/wiki/docs|intro"
        );
    }

    #[test]
    fn extension_match_is_case_sensitive() {
        assert_eq!(
            rewrite_url("File.MD", "docs", &ctx()),
            "/owner/repo/blob/main/docs/File.MD"
        );
    }

    #[test]
    fn assets_in_tree_become_blob_links() {
        assert_eq!(
            rewrite_url("img/logo.png", "docs", &ctx()),
            "/owner/repo/blob/main/docs/img/logo.png"
        );
    }

    #[test]
    fn repo_files_outside_tree_become_blob_links() {
        let ctx = LinkContext::new("owner/repo", "develop", &[".md"], false);
        assert_eq!(
            rewrite_url("../src/main.rs", "docs", &ctx),
            "/owner/repo/blob/develop/src/main.rs"
        );
        assert_eq!(
            rewrite_url("../README.md", "docs", &ctx),
            "/owner/repo/blob/develop/README.md"
        );
    }

    #[test]
    fn rooted_links_resolve_from_repository_root() {
        assert_eq!(
            rewrite_url("/docs/setup.md", "docs/guide", &ctx()),
            "/owner/repo/wiki/setup"
        );
        assert_eq!(
            rewrite_url("/LICENSE", "docs", &ctx()),
            "/owner/repo/blob/main/LICENSE"
        );
    }

    #[test]
    fn escaping_the_project_warns_once_and_keeps_url() {
        let (target, warnings) =
            count_warnings(|| classify("../../elsewhere.md", "docs", &ctx()));
        assert_eq!(target, LinkTarget::OutOfProject("../../elsewhere.md".into()));
        assert_eq!(target.to_url(&ctx()), "../../elsewhere.md");
        assert_eq!(warnings, 1);
    }

    #[test]
    fn in_project_links_do_not_warn() {
        let (_, warnings) = count_warnings(|| classify("other/B.md", "docs", &ctx()));
        assert_eq!(warnings, 0);
    }

    #[test]
    fn anchors_and_empty_urls_are_untouched() {
        assert_eq!(classify("#usage", "docs", &ctx()), LinkTarget::Anchor("#usage".into()));
        assert_eq!(rewrite_url("", "docs", &ctx()), "");
    }

    #[test]
    fn fragments_survive_rewriting() {
        assert_eq!(
            rewrite_url("other/B.md#install", "docs", &ctx()),
            "/owner/repo/wiki/b#install"
        );
        assert_eq!(
            rewrite_url("../src/lib.rs#L10", "docs", &ctx()),
            "/owner/repo/blob/main/src/lib.rs#L10"
        );
    }

    #[test]
    fn top_level_dirs() {
        assert_eq!(top_level_dir("docs/other"), "docs");
        assert_eq!(top_level_dir("docs"), "docs");
        assert_eq!(top_level_dir("."), ".");
        assert_eq!(top_level_dir("./docs/a"), "docs");
        assert_eq!(top_level_dir("/abs/path"), "/");
        assert_eq!(top_level_dir(".."), "..");
    }

    #[test]
    fn root_level_documents_link_siblings_as_pages() {
        assert_eq!(rewrite_url("Guide.md", ".", &ctx()), "/owner/repo/wiki/guide");
    }

    #[test]
    fn wiki_url_convention() {
        assert_eq!(ctx().wiki_url("Home.md"), "/owner/repo/wiki/home");
        assert_eq!(ctx().wiki_url("docs|file-name.md"), "/owner/repo/wiki/docs|file-name");
        assert_eq!(ctx().wiki_url("file2"), "/owner/repo/wiki/file2");
    }

    #[test]
    fn repo_slug_is_trimmed() {
        let ctx = LinkContext::new("/owner/repo/", "main", &[".md"], false);
        assert_eq!(ctx.wiki_url("a.md"), "/owner/repo/wiki/a");
    }
}
