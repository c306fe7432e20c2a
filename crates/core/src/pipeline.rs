//! The conversion pipeline.
//!
//! One run takes one document through these stages, in order:
//!
//! 1. validate the [`PipelineConfig`] (no I/O before this succeeds)
//! 2. fetch the URL or read the piped document
//! 3. rewrite references when a base [`Location`] is known
//! 4. extract and convert the title region, synthesize the heading
//! 5. extract and convert the content region
//! 6. apply the [`EmptyPolicy`] to an empty result
//! 7. assemble heading and content
//! 8. write to the resolved [`Destination`]
//!
//! # Example
//!
//! ```rust,no_run
//! use pagecut_core::{FetchConfig, HttpFetcher, Pipeline, PipelineConfig, RegionSelector};
//!
//! # async fn demo() -> pagecut_core::Result<()> {
//! let config = PipelineConfig {
//!     source_url: Some("https://foo.bar/blog/2024/article.html".to_string()),
//!     content: Some(RegionSelector::new("div.post").excluding(".share")),
//!     title: Some(RegionSelector::new("h1.title")),
//!     ..Default::default()
//! };
//!
//! let pipeline = Pipeline::new(HttpFetcher::new(FetchConfig::default())?);
//! pipeline.run(&config, std::io::empty(), std::io::stdout()).await?;
//! # Ok(())
//! # }
//! ```

use std::io::{Read, Write};

use tracing::{debug, info};

use crate::convert::{Format, FormatConverter, HtmlConverter};
use crate::extract::{RegionExtractor, RegionSelector, SelectorExtractor};
use crate::fetch::{Fetcher, read_piped};
use crate::heading::{Heading, synthesize_heading};
use crate::location::Location;
use crate::output::{Destination, OutputTarget, append_to_file};
use crate::rewrite::rewrite_references;
use crate::{PagecutError, Result};

/// Label used for the piped source in logs and errors.
const PIPED_SOURCE: &str = "standard input";

/// What to do when the content region renders to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyPolicy {
    /// Log it and finish successfully without writing anything.
    #[default]
    Suppress,
    /// Fail the run.
    Fail,
}

/// Everything one run needs, fixed before the run starts.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Fetch the document from this URL.
    pub source_url: Option<String>,
    /// Read the document from the piped input instead.
    pub piped: bool,
    /// Content region. Required.
    pub content: Option<RegionSelector>,
    /// Title region feeding the heading.
    pub title: Option<RegionSelector>,
    pub format: Format,
    pub output: OutputTarget,
    /// Prepend a synthesized heading.
    pub heading: bool,
    pub empty_policy: EmptyPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_url: None,
            piped: false,
            content: None,
            title: None,
            format: Format::default(),
            output: OutputTarget::default(),
            heading: true,
            empty_policy: EmptyPolicy::default(),
        }
    }
}

/// Where the document comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source<'a> {
    Url(&'a str),
    Piped,
}

impl Source<'_> {
    fn label(&self) -> &str {
        match self {
            Source::Url(url) => url,
            Source::Piped => PIPED_SOURCE,
        }
    }
}

/// A config that passed validation.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedConfig<'a> {
    pub source: Source<'a>,
    pub content: &'a RegionSelector,
}

impl PipelineConfig {
    /// Checks source exclusivity, the content selector and output tokens.
    pub fn validate(&self) -> Result<ValidatedConfig<'_>> {
        let source = match (self.source_url.as_deref(), self.piped) {
            (Some(_), true) => {
                return Err(PagecutError::Config(
                    "a source URL and a piped document are mutually exclusive".to_string(),
                ));
            }
            (None, false) => {
                return Err(PagecutError::Config(
                    "either a source URL or a piped document is required".to_string(),
                ));
            }
            (Some(url), false) => Source::Url(url),
            (None, true) => Source::Piped,
        };

        let content = self
            .content
            .as_ref()
            .filter(|c| !c.matcher().trim().is_empty())
            .ok_or_else(|| PagecutError::Config("a content selector is required".to_string()))?;

        if source == Source::Piped && self.output.uses_tokens() {
            return Err(PagecutError::Config(
                "output path tokens need a source URL; piped documents have no domain or slug".to_string(),
            ));
        }

        Ok(ValidatedConfig { source, content })
    }
}

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The document was written.
    Written { destination: Destination, bytes: usize },
    /// The content region was empty and nothing was written.
    Suppressed { source: String },
}

/// Runs documents through fetching, rewriting, extraction, conversion and output.
pub struct Pipeline<F, R = SelectorExtractor, C = HtmlConverter> {
    fetcher: F,
    extractor: R,
    converter: C,
}

impl<F: Fetcher> Pipeline<F> {
    /// A pipeline with the default selector extractor and converter.
    pub fn new(fetcher: F) -> Self {
        Self { fetcher, extractor: SelectorExtractor, converter: HtmlConverter }
    }
}

impl<F, R, C> Pipeline<F, R, C>
where
    F: Fetcher,
    R: RegionExtractor,
    C: FormatConverter,
{
    pub fn with_parts(fetcher: F, extractor: R, converter: C) -> Self {
        Self { fetcher, extractor, converter }
    }

    /// Runs one conversion.
    ///
    /// `input` is only read for a piped source. `stdout` is only written for
    /// [`OutputTarget::Stdout`]. Nothing is written unless the whole run
    /// succeeds.
    pub async fn run<I: Read, W: Write>(&self, config: &PipelineConfig, input: I, mut stdout: W) -> Result<Outcome> {
        let ValidatedConfig { source, content } = config.validate()?;

        let raw = match source {
            Source::Url(url) => self.fetcher.fetch(url).await?,
            Source::Piped => read_piped(input)?,
        };
        debug!(source = source.label(), bytes = raw.len(), "document loaded");

        let location = match source {
            Source::Url(url) => {
                let location = Location::parse(url);
                if location.is_none() {
                    debug!(%url, "no scheme and host in source URL, skipping reference rewriting");
                }
                location
            }
            Source::Piped => None,
        };

        let document = match &location {
            Some(location) => rewrite_references(&raw, location),
            None => raw,
        };

        let heading = if config.heading { self.heading(&document, config, source, location.as_ref())? } else { None };

        let region = self.extractor.extract(&document, content)?;
        let rendered = self.converter.convert(&region, config.format)?;
        let body = rendered.trim();

        if body.is_empty() {
            return match config.empty_policy {
                EmptyPolicy::Fail => Err(PagecutError::EmptyContent { origin: source.label().to_string() }),
                EmptyPolicy::Suppress => {
                    info!(source = source.label(), selector = content.matcher(), "no content extracted, nothing written");
                    Ok(Outcome::Suppressed { source: source.label().to_string() })
                }
            };
        }

        let mut assembled = heading.map(|h| h.render(config.format)).unwrap_or_default();
        assembled.push_str(body);
        assembled.push_str("\n\n");

        let destination = config.output.resolve(location.as_ref())?;
        match &destination {
            Destination::Stdout => {
                stdout.write_all(assembled.as_bytes())?;
                stdout.flush()?;
            }
            Destination::File(path) => append_to_file(path, &assembled)?,
        }
        debug!(%destination, bytes = assembled.len(), "document written");

        Ok(Outcome::Written { destination, bytes: assembled.len() })
    }

    fn heading(
        &self, document: &str, config: &PipelineConfig, source: Source<'_>, location: Option<&Location>,
    ) -> Result<Option<Heading>> {
        let title_text = match &config.title {
            Some(selector) => {
                let region = self.extractor.extract(document, selector)?;
                Some(self.converter.convert(&region, Format::Text)?)
            }
            None => None,
        };

        let source_url = match source {
            Source::Url(url) => Some(url),
            Source::Piped => None,
        };

        Ok(synthesize_heading(title_text.as_deref(), location.map(Location::slug), source_url))
    }
}
