//! Output routing: standard output or an append-only file.
//!
//! File paths are templates. `<domain>` and `<slug>` are replaced with the
//! source [`Location`]'s domain token and slug, so
//! `https://foo.bar/blog/2024/article.html` with `<domain>/<slug>.md`
//! lands in `foo_bar/article.md`.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::location::Location;
use crate::{PagecutError, Result};

pub const DOMAIN_TOKEN: &str = "<domain>";
pub const SLUG_TOKEN: &str = "<slug>";

/// Where an assembled document goes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputTarget {
    #[default]
    Stdout,
    /// A path template, appended to on every run.
    File(String),
}

/// A resolved [`OutputTarget`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("standard output"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl OutputTarget {
    pub fn file(template: impl Into<String>) -> Self {
        Self::File(template.into())
    }

    /// True when the path template needs a source location to resolve.
    pub fn uses_tokens(&self) -> bool {
        match self {
            Self::Stdout => false,
            Self::File(template) => template.contains(DOMAIN_TOKEN) || template.contains(SLUG_TOKEN),
        }
    }

    pub fn resolve(&self, location: Option<&Location>) -> Result<Destination> {
        match self {
            Self::Stdout => Ok(Destination::Stdout),
            Self::File(template) => resolve_path(template, location).map(Destination::File),
        }
    }
}

/// Substitutes `<domain>` and `<slug>` in `template`.
pub fn resolve_path(template: &str, location: Option<&Location>) -> Result<PathBuf> {
    if !(template.contains(DOMAIN_TOKEN) || template.contains(SLUG_TOKEN)) {
        return Ok(PathBuf::from(template));
    }

    let location = location.ok_or_else(|| {
        PagecutError::Config(format!(
            "output path {} uses {} or {} but no source URL is known",
            template, DOMAIN_TOKEN, SLUG_TOKEN
        ))
    })?;

    let resolved = template.replace(DOMAIN_TOKEN, location.domain_token()).replace(SLUG_TOKEN, location.slug());

    Ok(PathBuf::from(resolved))
}

/// Appends `contents` to `path`, creating the file and its parent
/// directories as needed.
pub fn append_to_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(contents.as_bytes())?;
    Ok(())
}
