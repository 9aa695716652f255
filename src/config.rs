//! Publishing configuration.
//!
//! Handles loading, validating, and merging `docs-wiki.toml`. Values come from
//! three layers, later layers winning:
//!
//! ```text
//! stock defaults  →  docs-wiki.toml  →  command-line flags
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional except `repo` - defaults shown below
//!
//! repo = "owner/name"           # Repository the docs belong to
//! host = "github.com"           # Host the wiki is cloned from
//! folders = ["docs"]            # Folders to publish
//! branch = "main"               # Branch used for repository file links
//! wiki_extensions = [".md"]     # Files that become wiki pages
//! generated_dir = ""            # Subdirectory of the wiki for generated pages
//! prefix_files_with_dir = false # Page names carry their source directory
//! sidebar = true                # Generate _Sidebar.md
//! sidebar_sections = "non-empty" # "non-empty" | "flat"
//! sidebar_indent = "tab"        # "tab" | "none"
//! edit_warning = true           # "Do not edit" banner in generated files
//! clear_wiki = false            # Remove existing wiki pages before writing
//!
//! [git]
//! email = "action@github.com"
//! name = "actions-user"
//! commit_message = "Update wiki"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::links::LinkContext;
use crate::sidebar::Indent;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

/// Matches a valid commit identity email.
pub static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+$").expect("email regex is valid")
});

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// When a directory gets its own collapsible sidebar section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionPolicy {
    /// Every directory with at least one page somewhere below it.
    #[default]
    NonEmpty,
    /// No sections; all links at the top level.
    Flat,
}

/// Configuration for one publishing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishConfig {
    /// `owner/name` of the repository. Empty until set by file, flag or env.
    pub repo: String,
    pub host: String,
    pub folders: Vec<String>,
    /// Branch used in `/{repo}/blob/{branch}/...` links.
    pub branch: String,
    pub wiki_extensions: Vec<String>,
    pub generated_dir: String,
    pub prefix_files_with_dir: bool,
    pub sidebar: bool,
    pub sidebar_sections: SectionPolicy,
    pub sidebar_indent: Indent,
    pub edit_warning: bool,
    pub clear_wiki: bool,
    pub git: GitConfig,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            repo: String::new(),
            host: "github.com".to_string(),
            folders: vec!["docs".to_string()],
            branch: "main".to_string(),
            wiki_extensions: vec![".md".to_string()],
            generated_dir: String::new(),
            prefix_files_with_dir: false,
            sidebar: true,
            sidebar_sections: SectionPolicy::default(),
            sidebar_indent: Indent::default(),
            edit_warning: true,
            clear_wiki: false,
            git: GitConfig::default(),
        }
    }
}

/// Commit identity and message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitConfig {
    pub email: String,
    pub name: String,
    pub commit_message: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            email: "action@github.com".to_string(),
            name: "actions-user".to_string(),
            commit_message: "Update wiki".to_string(),
        }
    }
}

impl PublishConfig {
    /// Validate config values. Nothing has been touched on disk when this fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parts: Vec<&str> = self.repo.split('/').collect();
        if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) {
            return Err(ConfigError::Validation(format!(
                "repo must look like owner/name, got {:?}",
                self.repo
            )));
        }
        if self.folders.is_empty() {
            return Err(ConfigError::Validation("folders must not be empty".into()));
        }
        if self.wiki_extensions.is_empty() {
            return Err(ConfigError::Validation(
                "wiki_extensions must not be empty".into(),
            ));
        }
        if !EMAIL_REGEX.is_match(&self.git.email) {
            return Err(ConfigError::Validation(format!(
                "git.email is not a valid email: {:?}",
                self.git.email
            )));
        }
        Ok(())
    }

    /// Lower-case page extensions and give each a leading dot.
    pub fn normalize(&mut self) {
        self.wiki_extensions = normalize_extensions(&self.wiki_extensions);
        self.repo = self.repo.trim().trim_matches('/').to_string();
    }

    pub fn link_context(&self) -> LinkContext {
        LinkContext {
            repo: self.repo.clone(),
            branch: self.branch.clone(),
            wiki_extensions: self.wiki_extensions.clone(),
            prefix_with_dir: self.prefix_files_with_dir,
        }
    }
}

/// `"MD"`, `".Md"` and `" md "` all become `".md"`. Blank entries are dropped.
pub fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty() && e != ".")
        .map(|e| if e.starts_with('.') { e } else { format!(".{e}") })
        .collect()
}

/// Split a comma-separated list, optionally wrapped in `[...]` or `(...)`.
///
/// `"[ docs, guides ,]"` → `["docs", "guides"]`
pub fn parse_list(input: &str) -> Vec<String> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix(['[', '(']).unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix([']', ')']).unwrap_or(trimmed);
    trimmed
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Config loading and merging
// =============================================================================

/// Stock defaults as a TOML table, the base layer for merging.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(PublishConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file merged over the stock defaults.
///
/// A missing file yields the defaults. The result is normalized but not
/// validated: command-line overrides still have to be applied.
pub fn load_config(path: &Path) -> Result<PublishConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = if path.exists() {
        let content = fs::read_to_string(path)?;
        let overlay: toml::Value = toml::from_str(&content)?;
        merge_toml(base, overlay)
    } else {
        base
    };
    let mut config: PublishConfig = merged.try_into()?;
    config.normalize();
    Ok(config)
}

/// A documented `docs-wiki.toml` with every option at its default.
pub fn stock_config_toml() -> &'static str {
    r#"# docs-wiki configuration
# All options are optional except `repo`. Values shown are the defaults.

# Repository the documentation belongs to, as owner/name.
# Falls back to the GITHUB_REPOSITORY environment variable.
repo = ""

# Host the wiki repository is cloned from.
host = "github.com"

# Folders to publish. Each becomes a top-level sidebar section.
folders = ["docs"]

# Branch used when linking to files in the repository.
branch = "main"

# Files with these extensions become wiki pages. Links to other files
# point at the repository file browser.
wiki_extensions = [".md"]

# Subdirectory of the wiki the generated pages are written to.
generated_dir = ""

# Prefix page names with their source directory (docs/guide/Setup.md
# becomes docs|guide|setup) so equal file names do not collide.
prefix_files_with_dir = false

# Generate a collapsible _Sidebar.md. An existing _Sidebar.md in the
# published folders always wins.
sidebar = true

# "non-empty": one section per directory that contains pages.
# "flat": no sections.
sidebar_sections = "non-empty"

# Indentation inside sidebar sections: "tab" or "none".
sidebar_indent = "tab"

# Put a "do not edit" banner at the top of generated files.
edit_warning = true

# Remove existing wiki pages before writing the new ones.
clear_wiki = false

[git]
email = "action@github.com"
name = "actions-user"
commit_message = "Update wiki"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn valid() -> PublishConfig {
        PublishConfig {
            repo: "owner/repo".into(),
            ..PublishConfig::default()
        }
    }

    #[test]
    fn default_config_values() {
        let config = PublishConfig::default();
        assert_eq!(config.folders, vec!["docs"]);
        assert_eq!(config.branch, "main");
        assert_eq!(config.wiki_extensions, vec![".md"]);
        assert!(config.sidebar);
        assert_eq!(config.sidebar_sections, SectionPolicy::NonEmpty);
        assert_eq!(config.sidebar_indent, Indent::Tab);
    }

    #[test]
    fn stock_toml_matches_defaults() {
        let parsed: PublishConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(parsed, PublishConfig::default());
    }

    #[test]
    fn parse_partial_config() {
        let config: PublishConfig = toml::from_str(
            r#"
repo = "o/r"
sidebar_sections = "flat"
[git]
name = "bot"
"#,
        )
        .unwrap();
        assert_eq!(config.repo, "o/r");
        assert_eq!(config.sidebar_sections, SectionPolicy::Flat);
        assert_eq!(config.git.name, "bot");
        assert_eq!(config.git.email, "action@github.com");
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<PublishConfig, _> = toml::from_str("sidebarr = true");
        assert!(result.unwrap_err().to_string().contains("unknown field"));
    }

    #[test]
    fn unknown_nested_key_rejected() {
        let result: Result<PublishConfig, _> = toml::from_str("[git]\nmail = \"a@b.c\"");
        assert!(result.is_err());
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("docs-wiki.toml")).unwrap();
        assert_eq!(config, PublishConfig::default());
    }

    #[test]
    fn load_config_merges_and_normalizes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("docs-wiki.toml");
        fs::write(
            &path,
            r#"
repo = "/owner/repo/"
wiki_extensions = ["MD", ".Markdown"]
[git]
commit_message = "docs: sync"
"#,
        )
        .unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.repo, "owner/repo");
        assert_eq!(config.wiki_extensions, vec![".md", ".markdown"]);
        assert_eq!(config.git.commit_message, "docs: sync");
        assert_eq!(config.git.name, "actions-user");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("docs-wiki.toml");
        fs::write(&path, "repo = [unclosed").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn validate_accepts_valid_config() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_repo() {
        for repo in ["", "owner", "owner/", "/repo", "a/b/c"] {
            let config = PublishConfig {
                repo: repo.into(),
                ..valid()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::Validation(_))),
                "{repo:?} should be rejected"
            );
        }
    }

    #[test]
    fn validate_rejects_bad_email() {
        let mut config = valid();
        config.git.email = "bob@bob.b(o)b".into();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_empty_lists() {
        let mut config = valid();
        config.wiki_extensions.clear();
        assert!(config.validate().is_err());
        let mut config = valid();
        config.folders.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn email_regex() {
        for ok in ["bOb@b0b.bob", "boB123_da+ma-n.3@B0b-43.B-0.b"] {
            assert!(EMAIL_REGEX.is_match(ok), "{ok}");
        }
        for bad in [
            "bob@bob.bob ",
            "bobbob.bob",
            "bob@bob",
            "bob@.bob",
            "@bob.bob",
            "bob@bob!.bob",
        ] {
            assert!(!EMAIL_REGEX.is_match(bad), "{bad}");
        }
    }

    #[test]
    fn extensions_are_normalized() {
        let input: Vec<String> = ["MD", ".Md", " markdown ", "", "."]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(normalize_extensions(&input), vec![".md", ".md", ".markdown"]);
    }

    #[test]
    fn list_parsing() {
        for empty in ["", "   ", ",,, ,", "[]", "[    ]", "(,,, ,)", "[)", "(]"] {
            assert!(parse_list(empty).is_empty(), "{empty:?}");
        }
        let expected = vec!["this", "that", "the other"];
        for input in [
            "this, that , the other ,",
            "this,that,the other",
            "[ this, that , the other ,]",
            "(this,that,the other)",
            "( this, that , the other ,]",
        ] {
            assert_eq!(parse_list(input), expected, "{input:?}");
        }
    }

    #[test]
    fn merge_toml_preserves_base_keys() {
        let base: toml::Value = toml::from_str("a = 1\n[git]\nname = \"x\"\nemail = \"e\"").unwrap();
        let overlay: toml::Value = toml::from_str("[git]\nname = \"y\"").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("a").unwrap().as_integer(), Some(1));
        let git = merged.get("git").unwrap();
        assert_eq!(git.get("name").unwrap().as_str(), Some("y"));
        assert_eq!(git.get("email").unwrap().as_str(), Some("e"));
    }

    #[test]
    fn link_context_from_config() {
        let mut config = valid();
        config.prefix_files_with_dir = true;
        let ctx = config.link_context();
        assert_eq!(ctx.repo, "owner/repo");
        assert!(ctx.prefix_with_dir);
    }
}
