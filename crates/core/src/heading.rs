//! Heading synthesis from a title region, a fallback slug and a source URL.
//!
//! # Example
//!
//! ```rust
//! use pagecut_core::{Format, synthesize_heading};
//!
//! let heading = synthesize_heading(None, Some("big-cool-article"), None).unwrap();
//! assert_eq!(heading.title(), "big cool article");
//! assert_eq!(heading.render(Format::Markdown), "# big cool article\n\n");
//! ```

use crate::convert::Format;

/// A title line with an optional source citation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    title: String,
    citation: Option<String>,
}

/// Builds the heading for a converted page.
///
/// The title text wins when it holds anything besides whitespace. Otherwise
/// the slug is used with `-` and `_` read as spaces. With neither there is
/// nothing to name the page after and no heading is produced.
pub fn synthesize_heading(
    title_text: Option<&str>, fallback_slug: Option<&str>, source_url: Option<&str>,
) -> Option<Heading> {
    let title = title_text
        .map(collapse_whitespace)
        .filter(|t| !t.is_empty())
        .or_else(|| fallback_slug.map(slug_to_title).filter(|t| !t.trim().is_empty()))?;

    Some(Heading { title, citation: source_url.map(str::to_string) })
}

impl Heading {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn citation(&self) -> Option<&str> {
        self.citation.as_deref()
    }

    /// Renders the heading block, blank line included, for `format`.
    pub fn render(&self, format: Format) -> String {
        let mut block = match format {
            Format::Markdown => format!("# {}\n", self.title),
            Format::Html => format!("<h1>{}</h1>\n", escape_html(&self.title)),
            Format::Text => format!("{}\n{}\n", self.title, "=".repeat(self.title.chars().count())),
        };

        if let Some(url) = &self.citation {
            let line = match format {
                Format::Markdown => format!("\nSource: <{}>\n", url),
                Format::Html => {
                    let url = escape_html(url);
                    format!("<p>Source: <a href=\"{}\">{}</a></p>\n", url, url)
                }
                Format::Text => format!("\nSource: {}\n", url),
            };
            block.push_str(&line);
        }

        block.push('\n');
        block
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn slug_to_title(slug: &str) -> String {
    slug.replace(&['-', '_'][..], " ")
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
