//! Rewriting of link and resource references against a base [`Location`].
//!
//! Three prefix rules are applied to `href` and `src` attribute values:
//!
//! | value            | attribute      | result                    |
//! |------------------|----------------|---------------------------|
//! | `#frag`          | `href` only    | `full#frag`               |
//! | `img/a.png`      | both           | `directory/img/a.png`     |
//! | `/static/a.css`  | both           | `domain/static/a.css`     |
//!
//! Anything containing `:` is treated as already qualified and left alone,
//! as are protocol-relative (`//host/...`) and empty values.
//!
//! The transform is a single pass with no fixed-point guard. Qualified output
//! contains a scheme and is skipped on a second pass; nothing else is.

use lol_html::{HtmlRewriter, Settings, element};
use tracing::warn;

use crate::location::Location;

/// Attribute carrying navigational links.
const LINK_ATTR: &str = "href";

/// Attribute carrying embedded resources.
const RESOURCE_ATTR: &str = "src";

/// Rewrites every `href` and `src` value in `html` so it resolves outside
/// the source page.
///
/// The rest of the markup passes through untouched. If the streaming
/// rewriter fails the input is returned unchanged.
pub fn rewrite_references(html: &str, location: &Location) -> String {
    let mut output = Vec::with_capacity(html.len());
    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![
                element!("[href]", |el| {
                    if let Some(value) = el.get_attribute(LINK_ATTR)
                        && let Some(rewritten) = qualify_link(&value, location)
                    {
                        el.set_attribute(LINK_ATTR, &rewritten)?;
                    }
                    Ok(())
                }),
                element!("[src]", |el| {
                    if let Some(value) = el.get_attribute(RESOURCE_ATTR)
                        && let Some(rewritten) = qualify_resource(&value, location)
                    {
                        el.set_attribute(RESOURCE_ATTR, &rewritten)?;
                    }
                    Ok(())
                }),
            ],
            ..Default::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );

    if let Err(err) = rewriter.write(html.as_bytes()) {
        warn!(error = %err, "reference rewriting failed, keeping document as-is");
        return html.to_string();
    }

    if let Err(err) = rewriter.end() {
        warn!(error = %err, "reference rewriting failed, keeping document as-is");
        return html.to_string();
    }

    String::from_utf8(output).unwrap_or_else(|_| html.to_string())
}

/// Applies the anchor rule, then the resource rules, to a link value.
///
/// Returns `None` when the value stays as it is.
pub fn qualify_link(value: &str, location: &Location) -> Option<String> {
    if value.starts_with('#') {
        return Some(format!("{}{}", location.full(), value));
    }
    qualify_resource(value, location)
}

/// Applies the relative and absolute-path rules to a value.
///
/// Returns `None` when the value stays as it is.
pub fn qualify_resource(value: &str, location: &Location) -> Option<String> {
    if value.is_empty() || value.starts_with('#') || value.contains(':') {
        return None;
    }

    match value.strip_prefix('/') {
        Some(rest) if rest.starts_with('/') => None,
        Some(_) => Some(format!("{}{}", location.domain(), value)),
        None => Some(format!("{}/{}", location.directory(), value)),
    }
}
