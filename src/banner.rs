//! "Do not edit" banner placed at the top of generated files.
//!
//! ```text
//! <!---------------------------------------->
//! <!--  🛑 DO NOT EDIT THIS FILE ON GITHUB 🛑  -->
//! <!--            ...message...             -->
//! <!---------------------------------------->
//! ```
//!
//! Each line is an HTML comment so the banner is invisible on the rendered
//! wiki page but obvious to anyone opening the wiki's own editor.

const MESSAGE: [&str; 2] = [
    "🛑 DO NOT EDIT THIS FILE ON GITHUB 🛑",
    "This file will be overwritten the next time the wiki is regenerated",
];

/// Build the banner, naming `source` as the file to edit when known.
///
/// Every line ends with a newline, including the last.
pub fn edit_warning(source: Option<&str>) -> String {
    let mut lines: Vec<String> = MESSAGE.iter().map(|l| l.to_string()).collect();
    if let Some(path) = source {
        lines.push(format!("Edit the source in {path} to change this file"));
    }
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 2;
    let border = "-".repeat(width);

    let mut out = String::new();
    for line in std::iter::once(&border).chain(&lines).chain(std::iter::once(&border)) {
        out.push_str("<!--");
        out.push_str(&center_text(line, width, ' '));
        out.push_str("-->\n");
    }
    out
}

/// Center `text` in `width` characters of `fill`. When the padding is odd
/// the extra character goes on the right. Text wider than `width` is
/// returned unchanged.
pub fn center_text(text: &str, width: usize, fill: char) -> String {
    let gap = width.saturating_sub(text.chars().count());
    let side = fill.to_string().repeat(gap / 2);
    let extra = if gap % 2 == 1 { fill.to_string() } else { String::new() };
    format!("{side}{text}{side}{extra}")
}
