pub mod convert;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod heading;
pub mod location;
pub mod output;
pub mod pipeline;
pub mod rewrite;

pub use convert::{Format, FormatConverter, HtmlConverter, html_to_text};
pub use error::{PagecutError, Result};
pub use extract::{RegionExtractor, RegionSelector, SelectorExtractor};
#[cfg(feature = "fetch")]
pub use fetch::HttpFetcher;
pub use fetch::{FetchConfig, Fetcher, read_piped};
pub use heading::{Heading, synthesize_heading};
pub use location::Location;
pub use output::{Destination, OutputTarget, append_to_file, resolve_path};
pub use pipeline::{EmptyPolicy, Outcome, Pipeline, PipelineConfig, Source, ValidatedConfig};
pub use rewrite::{qualify_link, qualify_resource, rewrite_references};
