mod config;
mod document;
mod fetch;
mod llm;
mod pdf;
mod pipeline;
mod prompts;
mod render;
mod search;
mod server;

pub const USER_AGENT: &str = concat!("article-explorer/", env!("CARGO_PKG_VERSION"));

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgGroup, Args, Parser, Subcommand};
use reqwest::Client;
use tracing::{error, info};

use config::Config;
use document::{Interaction, PdfUpload};
use fetch::HostPolicy;
use llm::GeminiClient;
use pipeline::Pipeline;
use search::SerperClient;
use server::AppPipeline;

/// TCP connection establishment timeout. Model and search calls have no overall timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Maximum redirect hops before aborting.
const MAX_REDIRECTS: usize = 5;

/// Analyze an article or PDF and find related articles.
///
/// Credentials come from `GEMINI_API_KEY` and `SERPER_API_KEY`.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Allow fetching pages on loopback and private-network hosts
    #[arg(long, global = true)]
    allow_private_hosts: bool,

    /// Language requested for per-page PDF summaries
    #[arg(long, global = true, default_value = pdf::DEFAULT_PAGE_LANGUAGE)]
    pdf_language: String,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze one URL or PDF file and print a Markdown report
    Analyze(AnalyzeArgs),
    /// Serve the analysis form over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8080")]
        bind: String,
    },
}

#[derive(Args)]
#[command(group(ArgGroup::new("source").required(true).args(["url", "pdf"])))]
struct AnalyzeArgs {
    /// Article URL (http or https)
    #[arg(long)]
    url: Option<String>,

    /// Path to a PDF file
    #[arg(long)]
    pdf: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("article_explorer=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().inspect_err(|e| error!("configuration error: {e}"))?;
    let pipeline = build_pipeline(&config, &cli)?;

    match cli.command {
        Command::Analyze(args) => analyze(&pipeline, args).await,
        Command::Serve { bind } => {
            server::serve(&bind, pipeline).await?;
            info!("server stopped");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_pipeline(config: &Config, cli: &Cli) -> Result<AppPipeline, reqwest::Error> {
    let http = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()?;
    let policy = if cli.allow_private_hosts {
        HostPolicy::AllowPrivate
    } else {
        HostPolicy::PublicOnly
    };

    Ok(Pipeline::new(
        GeminiClient::new(http.clone(), &config.llm),
        SerperClient::new(http.clone(), &config.search),
        http,
    )
    .with_host_policy(policy)
    .with_pdf_language(cli.pdf_language.clone()))
}

async fn analyze(
    pipeline: &AppPipeline,
    args: AnalyzeArgs,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let pdf = match args.pdf {
        Some(path) => {
            let bytes = tokio::fs::read(&path).await?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            Some(PdfUpload { file_name, bytes })
        }
        None => None,
    };

    match pipeline.run(Interaction { url: args.url, pdf }).await {
        Ok(report) => {
            print!("{}", render::to_markdown(&report));
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!(error = %e, "analysis failed");
            eprintln!("{}", e.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}
