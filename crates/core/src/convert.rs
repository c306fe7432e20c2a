//! Conversion of extracted markup into the output format.

use std::fmt;
use std::str::FromStr;

use scraper::node::Node;
use scraper::{ElementRef, Html};

use crate::Result;

/// Tags rendered as separate paragraphs in plain text.
const BLOCK_ELEMENTS: &[&str] = &[
    "p",
    "div",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "ul",
    "ol",
    "dl",
    "blockquote",
    "pre",
    "table",
    "section",
    "article",
    "main",
    "header",
    "footer",
    "nav",
    "aside",
    "figure",
    "hr",
];

/// Tags starting a new line without a blank line before them.
const LINE_ELEMENTS: &[&str] = &["li", "tr", "dt", "dd", "figcaption"];

/// Tags whose content never reaches the text output.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Output format for converted regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Markdown; markup without a Markdown equivalent is kept as raw HTML.
    #[default]
    Markdown,
    /// The extracted markup itself.
    Html,
    /// Plain text with block layout kept as blank lines.
    Text,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            "text" | "txt" | "plain" => Ok(Self::Text),
            _ => Err(format!("Invalid format: {}. Valid options: markdown, html, text", s)),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::Text => "text",
        };
        f.write_str(name)
    }
}

/// Turns a markup fragment into formatted text.
pub trait FormatConverter {
    fn convert(&self, fragment: &str, format: Format) -> Result<String>;
}

/// Default [`FormatConverter`] built on `htmd` and `scraper`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlConverter;

impl FormatConverter for HtmlConverter {
    fn convert(&self, fragment: &str, format: Format) -> Result<String> {
        match format {
            Format::Markdown => html_to_markdown(fragment),
            Format::Html => Ok(fragment.to_string()),
            Format::Text => Ok(html_to_text(fragment)),
        }
    }
}

#[cfg(feature = "markdown")]
fn html_to_markdown(html: &str) -> Result<String> {
    htmd::convert(html).map_err(|e| crate::PagecutError::Conversion(e.to_string()))
}

/// Fallback when the markdown feature is disabled
#[cfg(not(feature = "markdown"))]
fn html_to_markdown(html: &str) -> Result<String> {
    Ok(html_to_text(html))
}

/// Plain text rendering that keeps paragraphs, list items and `<pre>` layout.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = TextBuffer::default();
    walk(fragment.root_element(), &mut out, false);
    out.finish()
}

fn walk(element: ElementRef<'_>, out: &mut TextBuffer, in_pre: bool) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) if in_pre => out.push_raw(text),
            Node::Text(text) => out.push_inline(text),
            Node::Element(_) => {
                let Some(el) = ElementRef::wrap(child) else { continue };
                let tag = el.value().name();

                if SKIPPED_ELEMENTS.contains(&tag) {
                    continue;
                }

                if tag == "br" {
                    out.line_break();
                } else if BLOCK_ELEMENTS.contains(&tag) {
                    out.block_break();
                    walk(el, out, in_pre || tag == "pre");
                    out.block_break();
                } else if LINE_ELEMENTS.contains(&tag) {
                    out.line_break();
                    if tag == "li" {
                        out.push_raw("- ");
                    }
                    walk(el, out, in_pre);
                    out.line_break();
                } else {
                    walk(el, out, in_pre);
                }
            }
            _ => {}
        }
    }
}

#[derive(Default)]
struct TextBuffer {
    text: String,
}

impl TextBuffer {
    fn push_raw(&mut self, s: &str) {
        self.text.push_str(s);
    }

    /// Appends text with runs of whitespace collapsed to a single space.
    fn push_inline(&mut self, s: &str) {
        let mut words = s.split_whitespace().peekable();
        if words.peek().is_none() {
            if !s.is_empty() {
                self.space();
            }
            return;
        }

        if s.starts_with(char::is_whitespace) {
            self.space();
        }
        for (i, word) in words.enumerate() {
            if i > 0 {
                self.text.push(' ');
            }
            self.text.push_str(word);
        }
        if s.ends_with(char::is_whitespace) {
            self.space();
        }
    }

    fn space(&mut self) {
        if !self.text.is_empty() && !self.text.ends_with(&[' ', '\n'][..]) {
            self.text.push(' ');
        }
    }

    fn trim_trailing_spaces(&mut self) {
        let kept = self.text.trim_end_matches(' ').len();
        self.text.truncate(kept);
    }

    fn line_break(&mut self) {
        self.trim_trailing_spaces();
        if !self.text.is_empty() && !self.text.ends_with('\n') {
            self.text.push('\n');
        }
    }

    fn block_break(&mut self) {
        self.trim_trailing_spaces();
        if self.text.is_empty() {
            return;
        }
        while !self.text.ends_with("\n\n") {
            self.text.push('\n');
        }
    }

    fn finish(self) -> String {
        self.text.trim().to_string()
    }
}
