use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use price_history::{
    models::{
        interval::Interval,
        price_field::parse_field_list,
        request::{TimeSeriesRequest, parse_input_date},
    },
    providers::yahoo_chart::YahooChartProvider,
};
use tracing::warn;
use volatility_report::{
    config::ReportConfig,
    pipeline::{NO_DATA_MESSAGE, RunOutcome, run},
};

/// Anything left out on the command line is asked for on stdin.
#[derive(Parser)]
#[command(version, about = "Historical prices with rolling volatility charts")]
struct Cli {
    /// Start date (DD.MM.YYYY)
    #[arg(long, value_name = "DD.MM.YYYY")]
    start: Option<String>,

    /// End date (DD.MM.YYYY), exclusive
    #[arg(long, value_name = "DD.MM.YYYY")]
    end: Option<String>,

    /// daily, weekly or monthly
    #[arg(long)]
    interval: Option<String>,

    /// Ticker symbols, space separated (e.g. "AAPL MSFT")
    #[arg(long, num_args = 1..)]
    symbols: Vec<String>,

    /// Price fields, space separated (e.g. "Close Adj Close")
    #[arg(long, num_args = 1..)]
    fields: Vec<String>,

    /// Path to a TOML run configuration
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Overrides the configured output directory
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
}

fn prompt(question: &str) -> Result<String> {
    print!("{question}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn given_or_prompt(value: Option<String>, question: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => prompt(question),
    }
}

fn joined_or_prompt(values: &[String], question: &str) -> Result<String> {
    if values.is_empty() {
        prompt(question)
    } else {
        Ok(values.join(" "))
    }
}

fn build_request(cli: &Cli) -> Result<TimeSeriesRequest> {
    let start = parse_input_date(&given_or_prompt(
        cli.start.clone(),
        "Enter the start date (DD.MM.YYYY): ",
    )?)?;
    let end = parse_input_date(&given_or_prompt(
        cli.end.clone(),
        "Enter the end date (DD.MM.YYYY): ",
    )?)?;

    let keyword = given_or_prompt(
        cli.interval.clone(),
        "Enter the interval (daily, weekly, monthly): ",
    )?;
    let (interval, defaulted) = Interval::from_keyword_or_default(&keyword);
    if defaulted {
        warn!(input = %keyword, "unknown interval; using daily");
    }

    let symbols = joined_or_prompt(
        &cli.symbols,
        "Enter the ticker symbols, separated by spaces: ",
    )?;
    let fields = joined_or_prompt(
        &cli.fields,
        "Enter the price fields (Open High Low Close Adj Close): ",
    )?;
    let fields = parse_field_list(&fields)?;

    Ok(TimeSeriesRequest::new(
        symbols.split_whitespace(),
        start,
        end,
        interval,
        &fields,
    )?)
}

fn main() -> Result<()> {
    shared_utils::logging::init_tracing("info");
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ReportConfig::load(path)?,
        None => ReportConfig::default(),
    };
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }

    let request = build_request(&cli)?;
    let provider =
        YahooChartProvider::new(&config.provider).context("Failed to create market data provider")?;
    let mut sink = config.sink();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let outcome = runtime
        .block_on(run(&provider, &mut sink, &request))
        .context("Failed to write report")?;

    match outcome {
        RunOutcome::NoData { failures } => {
            for f in &failures {
                eprintln!("ERROR: {} - {}", f.symbol, f.reason);
            }
            println!("{NO_DATA_MESSAGE}");
        }
        RunOutcome::Completed(summary) => {
            println!("{}", summary.table_path.display());
            for chart in &summary.charts {
                if let Some(path) = &chart.path {
                    println!("{}", path.display());
                }
            }
            for f in &summary.failures {
                eprintln!("ERROR: {} - {}", f.symbol, f.reason);
            }
            for symbol in &summary.skipped {
                eprintln!("Price data not found for {symbol}");
            }
            eprintln!(
                "SUMMARY: {} charted, {} skipped, {} failed",
                summary.charts.len(),
                summary.skipped.len(),
                summary.failures.len()
            );
        }
    }

    Ok(())
}
