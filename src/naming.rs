//! File-name conventions for generated wiki pages.
//!
//! Every generated page lives in a single flat wiki namespace, so source file
//! names are normalized before they are written or linked to:
//!
//! - `the_full FILE-name.md` → `the-full-file-name.md` ([`standardize`])
//! - `Path/TO/the/` + `file name.md` → `path|to|the|file-name.md`
//!   ([`standardize`] with a source directory)
//! - `the_full FILE-name.md` → "The full file name" ([`header`], sidebar titles)
//!
//! The `|` separator flattens a directory path into a single token so that
//! `docs/a/index.md` and `docs/b/index.md` do not collide in the wiki.

use std::path::{Component, Path};

/// Separator used to flatten a source directory into a page name.
pub const DIR_SEPARATOR: &str = "|";

/// Remove the final extension of a name.
///
/// - `"main.test.md"` → `"main.test"`
/// - `"README"` → `"README"`
/// - `".gitignore"` → `".gitignore"` (a leading dot is not an extension)
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(pos) if pos > 0 => &name[..pos],
        _ => name,
    }
}

/// The final extension of a name, including its dot. Empty if there is none.
pub fn extension(name: &str) -> &str {
    &name[strip_extension(name).len()..]
}

/// Readable title for a file name: separators become spaces, the extension is
/// dropped, and only the first character is upper case.
pub fn header(name: &str) -> String {
    let spaced = name.replace(['-', '_'], " ");
    let stem = strip_extension(&spaced);
    let mut chars = stem.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Normalize a file name into a wiki page name.
///
/// Spaces, underscores and `%20` become `-` and the result is lower case. With
/// a `source_dir`, the directory is joined in front of the name and every path
/// separator is replaced by [`DIR_SEPARATOR`].
pub fn standardize(name: &str, source_dir: Option<&str>) -> String {
    let name = name.replace("%20", "-").replace([' ', '_'], "-");
    let joined = match source_dir {
        Some(dir) => normalize(&format!("{dir}/{name}")).replace(['/', '\\'], DIR_SEPARATOR),
        None => name,
    };
    joined.to_lowercase()
}

/// Lexically normalize a `/`-separated path.
///
/// `.` segments are dropped and `..` pops the previous segment. Leading `..`
/// segments that cannot be popped are kept, so `a/../../b` is `../b`. An empty
/// result is `.`.
pub fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for component in Path::new(&path).components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            Component::Normal(part) => parts.push(part.to_str().unwrap_or_default()),
        }
    }
    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Parent directory of a normalized path, `.` for a bare name.
pub fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(pos) => &path[..pos],
        None => ".",
    }
}

/// Last segment of a `/`-separated path.
pub fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}
