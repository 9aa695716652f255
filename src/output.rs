//! CLI output formatting.
//!
//! Each command has a `format_*` function returning display lines, which keeps
//! the output testable, and a `print_*` wrapper that writes them to stdout.
//! Format functions are pure: no I/O, no side effects.
//!
//! Progress and warnings go through `tracing` on stderr; what is printed here
//! is the summary a user reads after the run.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! docs (4 pages)
//!     001 Getting started
//!         Source: Getting_Started.md → getting-started.md
//!     002 Home
//!         Source: Home.md → home.md
//!     guide (2 pages)
//!         001 Setup
//!             Source: Setup.md → setup.md
//! ```
//!
//! ## Render
//!
//! ```text
//! 001 Getting started → getting-started.md
//!     Source: docs/Getting_Started.md
//! 002 Home → home.md
//!     Source: docs/Home.md
//!
//! Reserved
//!     docs/_Footer.md
//!
//! Sidebar: generated
//! Generated 2 pages
//! ```

use crate::links::LinkContext;
use crate::naming;
use crate::publish::{RenderReport, SidebarOutcome};
use crate::scan::DirectoryNode;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn pages(count: usize) -> String {
    match count {
        1 => "1 page".to_string(),
        n => format!("{n} pages"),
    }
}

// ============================================================================
// Scan output
// ============================================================================

/// Format the scanned tree with the wiki name each page will get.
///
/// Directories without pages are left out. The synthetic root is not shown.
pub fn format_scan_output(tree: &DirectoryNode, ctx: &LinkContext) -> Vec<String> {
    let mut lines = Vec::new();
    if tree.path.is_empty() {
        for sub in &tree.subdirectories {
            format_directory(sub, ctx, 0, &mut lines);
        }
    } else {
        format_directory(tree, ctx, 0, &mut lines);
    }
    if lines.is_empty() {
        lines.push("No pages found".to_string());
    }
    lines
}

fn format_directory(dir: &DirectoryNode, ctx: &LinkContext, depth: usize, lines: &mut Vec<String>) {
    if dir.total_file_count == 0 {
        return;
    }
    lines.push(format!(
        "{}{} ({})",
        indent(depth),
        dir.name(),
        pages(dir.total_file_count)
    ));
    for (i, file) in dir.files.iter().enumerate() {
        let prefix = ctx.prefix_with_dir.then_some(dir.path.as_str());
        lines.push(format!(
            "{}{} {}",
            indent(depth + 1),
            format_index(i + 1),
            naming::header(&file.name)
        ));
        lines.push(format!(
            "{}Source: {} → {}",
            indent(depth + 2),
            file.name,
            naming::standardize(&file.name, prefix)
        ));
    }
    for sub in &dir.subdirectories {
        format_directory(sub, ctx, depth + 1, lines);
    }
}

/// Print scan output to stdout.
pub fn print_scan_output(tree: &DirectoryNode, ctx: &LinkContext) {
    for line in format_scan_output(tree, ctx) {
        println!("{}", line);
    }
}

// ============================================================================
// Render output
// ============================================================================

/// Format the result of a render: pages in walk order, then reserved files.
pub fn format_render_output(report: &RenderReport) -> Vec<String> {
    let mut lines = Vec::new();

    for (i, page) in report.pages.iter().enumerate() {
        lines.push(format!("{} {} → {}", format_index(i + 1), page.title, page.name));
        lines.push(format!("{}Source: {}", indent(1), page.source));
    }

    if !report.reserved.is_empty() {
        lines.push(String::new());
        lines.push("Reserved".to_string());
        for path in &report.reserved {
            lines.push(format!("{}{}", indent(1), path));
        }
    }

    lines.push(String::new());
    lines.push(match &report.sidebar {
        SidebarOutcome::Generated => "Sidebar: generated".to_string(),
        SidebarOutcome::Overridden(source) => format!("Sidebar: kept {source}"),
        SidebarOutcome::Disabled => "Sidebar: disabled".to_string(),
    });
    lines.push(format!("Generated {}", pages(report.pages.len())));
    lines
}

/// Print render output to stdout.
pub fn print_render_output(report: &RenderReport) {
    for line in format_render_output(report) {
        println!("{}", line);
    }
}
