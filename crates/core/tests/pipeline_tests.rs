//! Pipeline integration tests
use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pagecut_core::*;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const ARTICLE_URL: &str = "https://foo.bar/blog/2024/big-cool-article.html";

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

fn fixture(name: &str) -> String {
    std::fs::read_to_string(get_fixture_path(name)).expect("fixture should exist")
}

/// Serves one canned body and remembers what was asked for.
struct StaticFetcher {
    body: String,
    requested: Arc<Mutex<Vec<String>>>,
}

impl StaticFetcher {
    fn new(body: impl Into<String>) -> Self {
        Self { body: body.into(), requested: Arc::default() }
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.requested.lock().unwrap().push(url.to_string());
        Ok(self.body.clone())
    }
}

struct FailingFetcher;

#[async_trait]
impl Fetcher for FailingFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        Err(PagecutError::HttpStatus { status: 503, url: url.to_string() })
    }
}

struct UnreachableFetcher;

#[async_trait]
impl Fetcher for UnreachableFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        panic!("fetch({url}) must not happen before validation succeeds");
    }
}

struct UnreadableInput;

impl Read for UnreadableInput {
    fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
        panic!("piped input must not be read before validation succeeds");
    }
}

/// Converter that records the formats it was asked for.
#[derive(Default)]
struct RecordingConverter {
    formats: Arc<Mutex<Vec<Format>>>,
}

impl FormatConverter for RecordingConverter {
    fn convert(&self, fragment: &str, format: Format) -> Result<String> {
        self.formats.lock().unwrap().push(format);
        Ok(html_to_text(fragment))
    }
}

/// Extractor that returns the selector string itself wrapped in a paragraph.
struct EchoExtractor;

impl RegionExtractor for EchoExtractor {
    fn extract(&self, _document: &str, region: &RegionSelector) -> Result<String> {
        Ok(format!("<p>{}</p>", region.matcher()))
    }
}

fn url_config() -> PipelineConfig {
    PipelineConfig {
        source_url: Some(ARTICLE_URL.to_string()),
        content: Some(RegionSelector::new("div.post").excluding(".share")),
        title: Some(RegionSelector::new("h1.post-title")),
        ..Default::default()
    }
}

fn piped_config(content: &str) -> PipelineConfig {
    PipelineConfig { piped: true, content: Some(RegionSelector::new(content)), ..Default::default() }
}

#[tokio::test]
async fn test_url_source_markdown() {
    let fetcher = StaticFetcher::new(fixture("article.html"));
    let pipeline = Pipeline::new(fetcher);
    let mut out = Vec::new();

    let outcome = pipeline.run(&url_config(), std::io::empty(), &mut out).await.unwrap();
    let output = String::from_utf8(out).unwrap();

    assert!(output.starts_with("# Big Cool Article\n\nSource: <https://foo.bar/blog/2024/big-cool-article.html>\n\n"));
    assert!(output.contains("[approachable](https://foo.bar/blog/2024/guide.html)"));
    assert!(output.contains("(https://foo.bar/blog/2024/big-cool-article.html#footnotes)"));
    assert!(output.contains("(https://foo.bar/about)"));
    assert!(output.contains("![Diagram](https://foo.bar/blog/2024/images/diagram.png)"));
    assert!(output.contains("mailto:editor@foo.bar"));
    assert!(output.contains("日本語"));
    assert!(!output.contains("Share this post"));
    assert!(!output.contains("Archive"));
    assert!(output.ends_with("\n\n"));

    assert_eq!(outcome, Outcome::Written { destination: Destination::Stdout, bytes: output.len() });
}

#[tokio::test]
async fn test_fetcher_receives_source_url() {
    let fetcher = StaticFetcher::new(fixture("article.html"));
    let requested = Arc::clone(&fetcher.requested);
    let pipeline = Pipeline::new(fetcher);

    pipeline.run(&url_config(), std::io::empty(), Vec::new()).await.unwrap();

    assert_eq!(*requested.lock().unwrap(), vec![ARTICLE_URL.to_string()]);
}

#[tokio::test]
async fn test_heading_falls_back_to_slug() {
    let pipeline = Pipeline::new(StaticFetcher::new(fixture("article.html")));
    let config = PipelineConfig { title: None, ..url_config() };
    let mut out = Vec::new();

    pipeline.run(&config, std::io::empty(), &mut out).await.unwrap();
    let output = String::from_utf8(out).unwrap();

    assert!(output.starts_with("# big cool article\n\nSource: <https://foo.bar/blog/2024/big-cool-article.html>\n\n"));
}

#[tokio::test]
async fn test_empty_title_region_falls_back_to_slug() {
    let pipeline = Pipeline::new(StaticFetcher::new(fixture("article.html")));
    let config = PipelineConfig { title: Some(RegionSelector::new("h1.missing")), ..url_config() };
    let mut out = Vec::new();

    pipeline.run(&config, std::io::empty(), &mut out).await.unwrap();
    let output = String::from_utf8(out).unwrap();

    assert!(output.starts_with("# big cool article\n"));
}

#[tokio::test]
async fn test_heading_disabled() {
    let pipeline = Pipeline::new(StaticFetcher::new(fixture("article.html")));
    let config = PipelineConfig { heading: false, ..url_config() };
    let mut out = Vec::new();

    pipeline.run(&config, std::io::empty(), &mut out).await.unwrap();
    let output = String::from_utf8(out).unwrap();

    assert!(!output.contains("# Big Cool Article"));
    assert!(!output.contains("Source:"));
    assert!(output.starts_with("Rust makes systems programming"));
}

#[tokio::test]
async fn test_piped_text_without_heading() {
    let pipeline = Pipeline::new(UnreachableFetcher);
    let config = PipelineConfig { format: Format::Text, ..piped_config("main") };
    let mut out = Vec::new();

    let input = Cursor::new("<html><body><nav>Menu</nav><main><p>Hello <b>world</b></p></main></body></html>");
    pipeline.run(&config, input, &mut out).await.unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "Hello world\n\n");
}

#[tokio::test]
async fn test_piped_with_title_has_no_citation() {
    let pipeline = Pipeline::new(UnreachableFetcher);
    let config = PipelineConfig {
        format: Format::Text,
        title: Some(RegionSelector::new("h1")),
        ..piped_config("article")
    };
    let mut out = Vec::new();

    let input = Cursor::new("<h1>Notes</h1><article><p>Body</p></article>");
    pipeline.run(&config, input, &mut out).await.unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "Notes\n=====\n\nBody\n\n");
}

#[tokio::test]
async fn test_piped_relative_links_are_not_rewritten() {
    let pipeline = Pipeline::new(UnreachableFetcher);
    let config = PipelineConfig { format: Format::Html, ..piped_config("main") };
    let mut out = Vec::new();

    pipeline
        .run(&config, Cursor::new(r#"<main><a href="local.html">x</a></main>"#), &mut out)
        .await
        .unwrap();

    assert!(String::from_utf8(out).unwrap().contains(r#"href="local.html""#));
}

#[tokio::test]
async fn test_malformed_url_skips_rewriting() {
    let pipeline = Pipeline::new(StaticFetcher::new(r#"<main><a href="local.html">x</a></main>"#));
    let config = PipelineConfig {
        source_url: Some("not-a-url".to_string()),
        content: Some(RegionSelector::new("main")),
        format: Format::Html,
        ..Default::default()
    };
    let mut out = Vec::new();

    pipeline.run(&config, std::io::empty(), &mut out).await.unwrap();
    let output = String::from_utf8(out).unwrap();

    assert!(output.contains(r#"href="local.html""#));
    assert!(!output.contains("<h1>"));
}

#[tokio::test]
async fn test_empty_content_is_suppressed() {
    let pipeline = Pipeline::new(StaticFetcher::new(fixture("empty_content.html")));
    let mut out = Vec::new();

    let outcome = pipeline.run(&url_config(), std::io::empty(), &mut out).await.unwrap();

    assert_eq!(outcome, Outcome::Suppressed { source: ARTICLE_URL.to_string() });
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_empty_content_is_fatal_on_request() {
    let pipeline = Pipeline::new(StaticFetcher::new(fixture("empty_content.html")));
    let config = PipelineConfig { empty_policy: EmptyPolicy::Fail, ..url_config() };
    let mut out = Vec::new();

    let result = pipeline.run(&config, std::io::empty(), &mut out).await;

    match result {
        Err(PagecutError::EmptyContent { origin }) => assert_eq!(origin, ARTICLE_URL),
        other => panic!("expected EmptyContent, got {other:?}"),
    }
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_empty_file_target_untouched() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("out.md");
    let pipeline = Pipeline::new(StaticFetcher::new(fixture("empty_content.html")));
    let config = PipelineConfig { output: OutputTarget::file(path.to_str().unwrap()), ..url_config() };

    pipeline.run(&config, std::io::empty(), Vec::new()).await.unwrap();

    assert!(!path.exists());
}

#[tokio::test]
async fn test_conflicting_sources_fail_before_io() {
    let pipeline = Pipeline::new(UnreachableFetcher);
    let config = PipelineConfig { piped: true, ..url_config() };
    let mut out = Vec::new();

    let result = pipeline.run(&config, UnreadableInput, &mut out).await;

    assert!(matches!(result, Err(PagecutError::Config(_))));
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_missing_source_fails_before_io() {
    let pipeline = Pipeline::new(UnreachableFetcher);
    let config = PipelineConfig { source_url: None, ..url_config() };

    let result = pipeline.run(&config, UnreadableInput, Vec::new()).await;

    assert!(matches!(result, Err(PagecutError::Config(_))));
}

#[tokio::test]
async fn test_fetch_failure_is_fatal() {
    let pipeline = Pipeline::new(FailingFetcher);
    let mut out = Vec::new();

    let result = pipeline.run(&url_config(), std::io::empty(), &mut out).await;

    assert!(matches!(result, Err(PagecutError::HttpStatus { status: 503, .. })));
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_invalid_selector_is_fatal() {
    let pipeline = Pipeline::new(UnreachableFetcher);
    let config = piped_config("[[broken");

    let result = pipeline.run(&config, Cursor::new("<p>x</p>"), Vec::new()).await;

    assert!(matches!(result, Err(PagecutError::InvalidSelector(_))));
}

#[tokio::test]
async fn test_file_target_resolves_tokens_and_appends() {
    let tmp = TempDir::new().unwrap();
    let template = format!("{}/<domain>/<slug>.md", tmp.path().display());
    let config = PipelineConfig {
        source_url: Some("https://foo.bar/blog/2024/article.html".to_string()),
        output: OutputTarget::file(template),
        ..url_config()
    };
    let pipeline = Pipeline::new(StaticFetcher::new(fixture("article.html")));
    let mut out = Vec::new();

    let first = pipeline.run(&config, std::io::empty(), &mut out).await.unwrap();
    pipeline.run(&config, std::io::empty(), &mut out).await.unwrap();

    let expected = tmp.path().join("foo_bar").join("article.md");
    match first {
        Outcome::Written { destination: Destination::File(path), .. } => assert_eq!(path, expected),
        other => panic!("expected a file write, got {other:?}"),
    }

    let written = std::fs::read_to_string(&expected).unwrap();
    assert_eq!(written.matches("# Big Cool Article").count(), 2);
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_injected_collaborators() {
    let converter = RecordingConverter::default();
    let formats = Arc::clone(&converter.formats);
    let pipeline = Pipeline::with_parts(StaticFetcher::new("<html></html>"), EchoExtractor, converter);
    let config = PipelineConfig { format: Format::Markdown, ..url_config() };
    let mut out = Vec::new();

    pipeline.run(&config, std::io::empty(), &mut out).await.unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "# h1.post-title\n\nSource: <https://foo.bar/blog/2024/big-cool-article.html>\n\ndiv.post\n\n"
    );
    assert_eq!(*formats.lock().unwrap(), vec![Format::Text, Format::Markdown]);
}
