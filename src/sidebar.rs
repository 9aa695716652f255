//! Collapsible wiki sidebar (`_Sidebar.md`).
//!
//! The sidebar mirrors the documentation tree: every directory with content is
//! a `<details>` section and every page is a link inside it.
//!
//! ```text
//! <details>
//! 	<summary><strong>docs</strong></summary>
//!
//! 	<a href="/owner/repo/wiki/home">Home</a><br>
//! 	<details>
//! 		<summary><strong>guide</strong></summary>
//!
//! 		<a href="/owner/repo/wiki/setup">Setup</a><br>
//! 	</details>
//! </details>
//! ```
//!
//! The blank line after each `<summary>` is required for markdown to render
//! inside the collapsible region.
//!
//! [`SidebarBuilder`] records an ordered list of [`SidebarCommand`]s while the
//! documentation tree is walked and renders them in one pass. Rendering
//! refuses a command list whose sections are not balanced.

use crate::banner;
use crate::links::LinkContext;
use crate::naming;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SidebarError {
    #[error("All sections must be closed before dumping the sidebar ({open} still open)")]
    UnbalancedSections { open: usize },
    #[error("Section closed with none open (command {position})")]
    UnmatchedClose { position: usize },
}

/// Indentation unit repeated once per open section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Indent {
    #[default]
    Tab,
    None,
}

impl Indent {
    pub fn unit(self) -> &'static str {
        match self {
            Indent::Tab => "\t",
            Indent::None => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarCommand {
    OpenSection {
        title: String,
        bold: bool,
        target: Option<String>,
    },
    CloseSection,
    AddLink {
        title: String,
        target: String,
    },
}

/// Accumulates sidebar commands in walk order.
#[derive(Debug, Clone)]
pub struct SidebarBuilder {
    ctx: LinkContext,
    indent: Indent,
    /// Written before the first command, newline-terminated.
    preamble: Option<String>,
    commands: Vec<SidebarCommand>,
    open: usize,
}

impl SidebarBuilder {
    pub fn new(ctx: LinkContext, indent: Indent) -> Self {
        Self {
            ctx,
            indent,
            preamble: None,
            commands: Vec::new(),
            open: 0,
        }
    }

    /// A builder whose output starts with the generated-file banner.
    pub fn with_edit_warning(ctx: LinkContext, indent: Indent) -> Self {
        let mut builder = Self::new(ctx, indent);
        builder.preamble = Some(banner::edit_warning(None));
        builder
    }

    pub fn open_section(&mut self, title: &str, bold: bool, target: Option<&str>) {
        self.commands.push(SidebarCommand::OpenSection {
            title: title.to_string(),
            bold,
            target: target.map(str::to_string),
        });
        self.open += 1;
    }

    /// Close the innermost section. Returns `false`, and records nothing, when
    /// no section is open.
    pub fn close_section(&mut self) -> bool {
        if self.open == 0 {
            return false;
        }
        self.open -= 1;
        self.commands.push(SidebarCommand::CloseSection);
        true
    }

    pub fn add_link(&mut self, title: &str, target: &str) {
        self.commands.push(SidebarCommand::AddLink {
            title: title.to_string(),
            target: target.to_string(),
        });
    }

    pub fn commands(&self) -> &[SidebarCommand] {
        &self.commands
    }

    /// Render the sidebar. Fails while any section is still open.
    pub fn dumps(&self) -> Result<String, SidebarError> {
        if self.open > 0 {
            return Err(SidebarError::UnbalancedSections { open: self.open });
        }
        let body = render(&self.commands, &self.ctx, self.indent)?;
        // The banner keeps its trailing newline, leaving a blank line before the body.
        Ok(match &self.preamble {
            Some(banner) if !body.is_empty() => format!("{banner}\n{body}"),
            Some(banner) => banner.clone(),
            None => body,
        })
    }
}

/// Render a command list. Each line is indented by the number of sections
/// open when it is emitted.
pub fn render(
    commands: &[SidebarCommand],
    ctx: &LinkContext,
    indent: Indent,
) -> Result<String, SidebarError> {
    let mut lines = Vec::new();
    let mut depth = 0usize;
    let mut emit = |depth: usize, line: &str| {
        lines.push(format!("{}{line}", indent.unit().repeat(depth)));
    };

    for (position, command) in commands.iter().enumerate() {
        match command {
            SidebarCommand::OpenSection { title, bold, target } => {
                emit(depth, "<details>");
                depth += 1;
                let summary = summary(ctx, title, *bold, target.as_deref());
                emit(depth, &summary.into_string());
                emit(depth, "");
            }
            SidebarCommand::CloseSection => {
                depth = depth
                    .checked_sub(1)
                    .ok_or(SidebarError::UnmatchedClose { position })?;
                emit(depth, "</details>");
            }
            SidebarCommand::AddLink { title, target } => {
                let anchor = html! { a href=(page_url(ctx, target)) { (title) } };
                emit(depth, &format!("{}<br>", anchor.into_string()));
            }
        }
    }

    if depth > 0 {
        return Err(SidebarError::UnbalancedSections { open: depth });
    }
    Ok(lines.join("\n"))
}

fn summary(ctx: &LinkContext, title: &str, bold: bool, target: Option<&str>) -> Markup {
    let label = if bold {
        html! { strong { (title) } }
    } else {
        html! { (title) }
    };
    match target {
        Some(target) => html! { summary { a href=(page_url(ctx, target)) { (label) } } },
        None => html! { summary { (label) } },
    }
}

/// Wiki URL of a page; the extension is dropped only for page extensions.
fn page_url(ctx: &LinkContext, target: &str) -> String {
    let ext = naming::extension(target);
    if !ext.is_empty() && ctx.wiki_extensions.iter().any(|e| e == ext) {
        ctx.wiki_url(target)
    } else {
        format!(
            "/{}/wiki/{}",
            ctx.repo,
            naming::standardize(naming::base_name(target), None)
        )
    }
}
