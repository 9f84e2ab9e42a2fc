//! openreview-crawler: fetch venue submissions, flag them by keyword, export or serve.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use openreview_crawler::client::{self, Status};
use openreview_crawler::config::{ApiArgs, ClientConfig};
use openreview_crawler::paper::{self, TextField};
use openreview_crawler::search::{self, Library};
use openreview_crawler::{export, Matcher, Normalizer};

const DEFAULT_CSV_PATH: &str = "papers.csv";

#[derive(Parser)]
#[command(name = "openreview-crawler")]
#[command(about = "Fetch OpenReview papers and flag them by keyword expression")]
struct Cli {
    /// Log at debug level.
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Drop empty tokens left by repeated spaces when normalizing text.
    #[arg(long, global = true)]
    collapse_whitespace: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List venue ids.
    Venues {
        #[command(flatten)]
        api: ApiArgs,
    },

    /// Fetch a venue's submissions and export them as CSV.
    Crawl {
        #[command(flatten)]
        api: ApiArgs,

        /// Venue id, e.g. ICLR.cc/2024/Conference.
        #[arg(long)]
        venue: String,

        /// all, accepted, withdrawn or desk-rejected.
        #[arg(long, short, default_value = "all")]
        status: Status,

        /// Keyword expression, e.g. "privacy and federated or robustness".
        #[arg(long, short)]
        keyword: Option<String>,

        /// Text the keyword is matched against.
        #[arg(long, value_enum, default_value_t = TextField::Both)]
        field: TextField,

        /// Keep only papers matching the keyword.
        #[arg(long, requires = "keyword")]
        only_matches: bool,

        /// Output CSV path.
        #[arg(long, short, default_value = DEFAULT_CSV_PATH)]
        output: PathBuf,

        /// Also save the fetched papers as JSON (for `serve`).
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Print 1 if the text matches the keyword expression, else 0.
    Match {
        #[arg(long, short)]
        keyword: String,

        #[arg(long, short)]
        text: String,
    },

    /// Load saved papers and start the search API.
    Serve {
        /// Papers JSON written by `crawl --json`.
        #[arg(long, short)]
        papers: PathBuf,

        /// Port to listen on.
        #[arg(long, short = 'P', default_value_t = 3000)]
        port: u16,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    let matcher = Matcher::new(Normalizer::default().collapse_whitespace(cli.collapse_whitespace));
    match cli.command {
        Command::Venues { api } => run_venues(ClientConfig::try_from(api)?)?,
        Command::Crawl {
            api,
            venue,
            status,
            keyword,
            field,
            only_matches,
            output,
            json,
        } => {
            let config = ClientConfig::try_from(api)?;
            let options = CrawlOptions {
                keyword: keyword.as_deref(),
                field,
                only_matches,
                output: &output,
                json: json.as_deref(),
            };
            run_crawl(&config, &venue, status, &matcher, &options)?;
        }
        Command::Match { keyword, text } => {
            println!("{}", matcher.flag(&text, &keyword));
        }
        Command::Serve { papers, port } => run_serve(&papers, port, matcher)?,
    }
    Ok(())
}

fn run_venues(config: ClientConfig) -> anyhow::Result<()> {
    for venue in client::fetch_venues(&config)? {
        println!("{venue}");
    }
    Ok(())
}

struct CrawlOptions<'a> {
    keyword: Option<&'a str>,
    field: TextField,
    only_matches: bool,
    output: &'a Path,
    json: Option<&'a Path>,
}

fn run_crawl(
    config: &ClientConfig,
    venue: &str,
    status: Status,
    matcher: &Matcher,
    options: &CrawlOptions<'_>,
) -> anyhow::Result<()> {
    let notes = client::fetch_papers(config, venue, status)
        .with_context(|| format!("fetching {status} papers of {venue}"))?;
    let mut papers = paper::extract_papers(&notes)?;

    let mut flags = options.keyword.map(|keyword| {
        let texts: Vec<_> = papers.iter().map(|p| p.text(options.field)).collect();
        matcher.flag_all(&texts, keyword)
    });
    if let Some(flags) = &flags {
        let hits = flags.iter().filter(|f| **f == 1).count();
        println!("{hits} of {} papers match", flags.len());
    }
    if options.only_matches {
        if let Some(all) = flags.take() {
            papers = papers
                .into_iter()
                .zip(all)
                .filter(|(_, flag)| *flag == 1)
                .map(|(paper, _)| paper)
                .collect();
            flags = Some(vec![1; papers.len()]);
        }
    }

    export::write_csv(options.output, &papers, flags.as_deref())?;
    if let Some(path) = options.json {
        export::save_papers(&papers, path)?;
    }
    println!("Wrote {} papers to {:?}", papers.len(), options.output);
    Ok(())
}

fn run_serve(papers_path: &Path, port: u16, matcher: Matcher) -> anyhow::Result<()> {
    let papers = export::load_papers(papers_path)?;
    tracing::info!(papers = papers.len(), "loaded papers");
    let state: search::AppState = Arc::new(Library::new(papers, matcher));

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let app = search::router(state);
        let addr = format!("127.0.0.1:{port}");
        println!("Listening on http://{addr}");
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;
        Ok::<(), anyhow::Error>(())
    })?;
    Ok(())
}
