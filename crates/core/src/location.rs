//! Base location derived from a source URL.
//!
//! A [`Location`] is computed once per run and feeds both reference
//! rewriting and output path substitution.
//!
//! # Example
//!
//! ```rust
//! use pagecut_core::Location;
//!
//! let loc = Location::parse("https://foo.bar/blog/2024/article.html").unwrap();
//! assert_eq!(loc.domain(), "https://foo.bar");
//! assert_eq!(loc.directory(), "https://foo.bar/blog/2024");
//! assert_eq!(loc.slug(), "article");
//! assert_eq!(loc.domain_token(), "foo_bar");
//! ```

use percent_encoding::percent_decode_str;
use url::Url;

/// Slug used when the URL has no path segment to name it after.
const ROOT_SLUG: &str = "index";

/// The resolved origin of a source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    full: String,
    domain: String,
    directory: String,
    slug: String,
    domain_token: String,
}

impl Location {
    /// Derives a location from a URL string.
    ///
    /// Returns `None` when the string does not parse as a URL with a scheme
    /// and a host. Callers treat that as "no base location known".
    pub fn parse(raw: &str) -> Option<Self> {
        let url = Url::parse(raw).ok()?;
        let host = url.host_str().filter(|h| !h.is_empty())?;

        let domain = match url.port() {
            Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
            None => format!("{}://{}", url.scheme(), host),
        };

        let mut segments: Vec<&str> = url.path_segments().map(|s| s.collect()).unwrap_or_default();
        if segments.last() == Some(&"") {
            segments.pop();
        }
        let last = segments.pop();

        let directory = if segments.is_empty() { domain.clone() } else { format!("{}/{}", domain, segments.join("/")) };

        let slug = last
            .map(|segment| percent_decode_str(segment).decode_utf8_lossy())
            .map(|segment| strip_extension(&segment).to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| ROOT_SLUG.to_string());

        let domain_token = match url.port() {
            Some(port) => format!("{}_{}", host.replace('.', "_"), port),
            None => host.replace('.', "_"),
        };

        Some(Self { full: raw.to_string(), domain, directory, slug, domain_token })
    }

    /// The source URL exactly as supplied.
    pub fn full(&self) -> &str {
        &self.full
    }

    /// Scheme and host (with an explicit port), no path.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The URL with its final path segment removed. Never ends in `/`.
    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// Last path segment, percent-decoded, without its extension.
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Filesystem-friendly host: dots become underscores, scheme dropped.
    pub fn domain_token(&self) -> &str {
        &self.domain_token
    }
}

fn strip_extension(segment: &str) -> &str {
    match segment.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => segment,
    }
}
