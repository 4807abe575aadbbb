use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Args, Parser, Subcommand, ValueEnum};
use commentary::{
    config::CommentaryConfig,
    llm::{CompletionBackend, LlmClient, is_hosted_key},
    page::HttpPageSource,
    report::{render_overview, render_portfolio_risk, write_report},
    summarize::{dedup_tickers, summarize_all, synthesize_portfolio},
    weights::Weights,
};
use secrecy::{ExposeSecret, SecretString};
use shared_utils::env::get_env_var;
use tracing::info;

#[derive(Parser)]
#[command(version, about = "LLM stock commentary as HTML reports")]
struct Cli {
    /// Path to a TOML configuration
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Summarize every ticker and write the HTML reports
    Summarize(SummarizeArgs),
    /// List the models offered by the aggregator
    Models,
}

#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    /// Local Ollama-style server
    Local,
    /// OpenAI-style hosted API (OPENAI_API_KEY)
    Hosted,
    /// OpenRouter-style aggregator (OPENROUTER_API_KEY)
    Aggregator,
}

#[derive(Args)]
struct SummarizeArgs {
    #[arg(long, value_enum, default_value = "hosted")]
    backend: Backend,

    /// Tickers to summarize, in addition to the configured ones
    #[arg(long, num_args = 1..)]
    tickers: Vec<String>,

    /// Delimited file with portfolio weights
    #[arg(long, value_name = "FILE")]
    weights: Option<PathBuf>,

    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
}

fn secret_from_env(name: &str) -> Result<SecretString> {
    Ok(SecretString::new(get_env_var(name)?.into()))
}

fn backend_for(choice: Backend, config: &CommentaryConfig) -> Result<CompletionBackend> {
    Ok(match choice {
        Backend::Local => CompletionBackend::Local {
            base_url: config.local.base_url.clone(),
            model: config.local.model.clone(),
        },
        Backend::Hosted => {
            let api_key = secret_from_env("OPENAI_API_KEY")
                .context("Invalid or missing OpenAI API key.")?;
            if !is_hosted_key(api_key.expose_secret()) {
                bail!("Invalid or missing OpenAI API key.");
            }
            CompletionBackend::Hosted {
                base_url: config.hosted.base_url.clone(),
                model: config.hosted.model.clone(),
                api_key,
            }
        }
        Backend::Aggregator => CompletionBackend::Aggregator {
            base_url: config.aggregator.base_url.clone(),
            model: config.aggregator.model.clone(),
            api_key: secret_from_env("OPENROUTER_API_KEY")?,
            referer: config.aggregator.referer.clone(),
            title: config.aggregator.title.clone(),
        },
    })
}

fn http_client(config: &CommentaryConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .context("Failed to build HTTP client")
}

async fn summarize(config: CommentaryConfig, args: SummarizeArgs) -> Result<()> {
    let tickers = dedup_tickers(config.tickers.iter().chain(&args.tickers));
    if tickers.is_empty() {
        bail!("No tickers given; pass --tickers or set `tickers` in the config");
    }
    let weights = match args.weights.as_ref().or(config.weights_file.as_ref()) {
        Some(path) => Some(
            Weights::load(path)
                .with_context(|| format!("Failed to load weights from {}", path.display()))?,
        ),
        None => None,
    };

    let client = http_client(&config)?;
    let llm = LlmClient::new(client.clone(), backend_for(args.backend, &config)?);
    let pages = HttpPageSource::new(client, config.page_url.clone());
    let today = Local::now().date_naive();
    let output_dir = args.output_dir.unwrap_or(config.output_dir);

    let summaries = summarize_all(&pages, &llm, &tickers, today, &config.language).await;
    let overview = write_report(&output_dir, &config.overview_file, &render_overview(&summaries))
        .context("Failed to write overview report")?;
    println!("Report written to {}", overview.display());

    if let Some(content) =
        synthesize_portfolio(&llm, &summaries, weights.as_ref(), today, &config.language).await
    {
        let path = write_report(&output_dir, &config.portfolio_file, &render_portfolio_risk(&content))
            .context("Failed to write portfolio report")?;
        println!("Report written to {}", path.display());
    }

    let failed = summaries.iter().filter(|s| s.failed).count();
    info!(tickers = summaries.len(), failed, "done");
    Ok(())
}

async fn list_models(config: CommentaryConfig) -> Result<()> {
    let backend = backend_for(Backend::Aggregator, &config)?;
    let llm = LlmClient::new(http_client(&config)?, backend);
    for id in llm.list_models().await.context("Failed to list models")? {
        println!("{id}");
    }
    Ok(())
}

fn main() -> Result<()> {
    // A missing .env is fine. When present it wins over the shell.
    let _ = dotenvy::dotenv_override();
    shared_utils::logging::init_tracing("info");
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CommentaryConfig::load(path)?,
        None => CommentaryConfig::default(),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    match cli.cmd {
        Cmd::Summarize(args) => runtime.block_on(summarize(config, args)),
        Cmd::Models => runtime.block_on(list_models(config)),
    }
}
