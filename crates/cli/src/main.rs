use std::io;
use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use owo_colors::OwoColorize;
use pagecut_core::{
    Destination, EmptyPolicy, FetchConfig, Format, HttpFetcher, Outcome, OutputTarget, Pipeline, PipelineConfig,
    RegionSelector,
};
use tracing_subscriber::EnvFilter;

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Cut a region out of a web page and convert it to Markdown, HTML or text
#[derive(Parser, Debug)]
#[command(name = "pagecut")]
#[command(author = "Pagecut Contributors")]
#[command(version)]
#[command(about = "Cut a region out of a web page and convert it to Markdown, HTML or text", long_about = None)]
struct Args {
    /// URL to fetch the page from
    #[arg(short, long, value_name = "URL")]
    url: Option<String>,

    /// Read the page from standard input
    #[arg(short = 'p', long = "stdin")]
    stdin: bool,

    /// CSS selector for the content region
    #[arg(short, long, value_name = "SELECTOR")]
    content: Option<String>,

    /// CSS selector for the title region
    #[arg(short, long, value_name = "SELECTOR")]
    title: Option<String>,

    /// CSS selector for elements to drop from the matched regions
    #[arg(short = 'x', long, value_name = "SELECTOR")]
    exclude: Option<String>,

    /// CSS selector for elements to drop from the title region only
    #[arg(long, value_name = "SELECTOR")]
    title_exclude: Option<String>,

    /// Output format (markdown, html, text)
    #[arg(short, long, default_value = "markdown", value_name = "FORMAT")]
    format: Format,

    /// Append to this file instead of stdout; <domain> and <slug> are replaced
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    /// Do not prepend a heading
    #[arg(long)]
    no_heading: bool,

    /// Fail when the content region is empty
    #[arg(short, long)]
    error_on_empty: bool,

    /// Enable debug logging
    #[arg(short, long, conflicts_with = "silent")]
    verbose: bool,

    /// Only report errors
    #[arg(short, long)]
    silent: bool,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Print a shell completion script and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

impl Args {
    fn log_level(&self) -> &'static str {
        if self.silent {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    fn pipeline_config(&self) -> PipelineConfig {
        let content = self
            .content
            .as_ref()
            .map(|matcher| RegionSelector::new(matcher).with_exclude(self.exclude.clone()));

        let title_exclude = self.title_exclude.clone().or_else(|| self.exclude.clone());
        let title = self
            .title
            .as_ref()
            .map(|matcher| RegionSelector::new(matcher).with_exclude(title_exclude));

        PipelineConfig {
            source_url: self.url.clone(),
            piped: self.stdin,
            content,
            title,
            format: self.format,
            output: self.output.as_ref().map(OutputTarget::file).unwrap_or_default(),
            heading: !self.no_heading,
            empty_policy: if self.error_on_empty { EmptyPolicy::Fail } else { EmptyPolicy::Suppress },
        }
    }

    fn fetch_config(&self) -> FetchConfig {
        let defaults = FetchConfig::default();
        FetchConfig { timeout: self.timeout, user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent) }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,pagecut_core={level},pagecut={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn print_details(args: &Args, config: &PipelineConfig) {
    let source = match &args.url {
        Some(url) => url.bright_white().underline().to_string(),
        None if args.stdin => "standard input".to_string(),
        None => "none".to_string(),
    };
    echo::print_detail("Source", &source);
    if let Some(content) = &config.content {
        echo::print_detail("Content", content.matcher());
    }
    if let Some(title) = &config.title {
        echo::print_detail("Title", title.matcher());
    }
    if let Some(exclude) = &args.exclude {
        echo::print_detail("Exclude", exclude);
    }
    echo::print_detail("Format", &config.format.to_string());
    echo::print_detail("Output", args.output.as_deref().unwrap_or("stdout"));
    eprintln!();
}

async fn run(args: &Args) -> anyhow::Result<()> {
    if let Some(shell) = args.completions {
        clap_complete::generate(shell, &mut Args::command(), "pagecut", &mut io::stdout());
        return Ok(());
    }

    init_logging(args.log_level());

    if args.verbose {
        echo::print_banner();
        echo::print_info("Debug logging enabled");
        eprintln!();
    }

    if args.title_exclude.is_some() && args.title.is_none() && !args.silent {
        echo::print_warning("--title-exclude has no effect without --title");
    }

    let config = args.pipeline_config();
    if args.verbose {
        print_details(args, &config);
    }

    let fetcher = HttpFetcher::new(args.fetch_config()).context("Failed to build HTTP client")?;
    let pipeline = Pipeline::new(fetcher);

    let source = args.url.as_deref().unwrap_or("standard input");
    let outcome = pipeline
        .run(&config, io::stdin().lock(), io::stdout().lock())
        .await
        .with_context(|| format!("Failed to convert {source}"))?;

    match outcome {
        Outcome::Written { destination, bytes } => {
            if args.verbose {
                echo::print_detail("Written", &echo::format_size(bytes));
            }
            if let Destination::File(path) = &destination
                && !args.silent
            {
                echo::print_success(&format!("Output written to {}", path.display().bright_white()));
            }
        }
        Outcome::Suppressed { source } => {
            if args.verbose {
                echo::print_info(&format!("Nothing written for {source}"));
            }
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            echo::print_error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
