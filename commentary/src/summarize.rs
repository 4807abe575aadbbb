//! Per-ticker summaries and the portfolio synthesis.
//!
//! Nothing in here aborts a batch: a failed page fetch or completion turns
//! into a bracketed error string that takes the place of that ticker's text.

use chrono::NaiveDate;
use indexmap::IndexSet;
use tracing::{info, warn};

use crate::{
    llm::{Completion, Message},
    page::PageSource,
    prompt::{
        PositionNote, analyst_system_prompt, page_messages, portfolio_system_prompt,
        portfolio_user_prompt,
    },
    weights::Weights,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerSummary {
    pub ticker: String,
    /// The model's answer, or the inline error text.
    pub content: String,
    pub failed: bool,
}

/// Trims, drops blanks and removes repeats, keeping first occurrences.
pub fn dedup_tickers<I, S>(tickers: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tickers
        .into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

pub async fn summarize_ticker<P, C>(
    pages: &P,
    llm: &C,
    system_prompt: &str,
    ticker: &str,
) -> TickerSummary
where
    P: PageSource + ?Sized,
    C: Completion + ?Sized,
{
    info!(%ticker, "fetching data");
    let page = match pages.fetch_page(ticker).await {
        Ok(page) => page,
        Err(e) => {
            warn!(%ticker, error = %e, "page fetch failed");
            return TickerSummary {
                ticker: ticker.to_string(),
                content: format!("[Error fetching website: {e}]"),
                failed: true,
            };
        }
    };

    match llm.complete(&page_messages(system_prompt, &page)).await {
        Ok(content) => TickerSummary {
            ticker: ticker.to_string(),
            content,
            failed: false,
        },
        Err(e) => {
            warn!(%ticker, backend = llm.label(), error = %e, "completion failed");
            TickerSummary {
                ticker: ticker.to_string(),
                content: format!("[Error from {}: {e}]", llm.label()),
                failed: true,
            }
        }
    }
}

/// Summarizes every ticker in order, one at a time.
pub async fn summarize_all<P, C>(
    pages: &P,
    llm: &C,
    tickers: &[String],
    today: NaiveDate,
    language: &str,
) -> Vec<TickerSummary>
where
    P: PageSource + ?Sized,
    C: Completion + ?Sized,
{
    let system_prompt = analyst_system_prompt(today, language);
    let mut summaries = Vec::with_capacity(tickers.len());
    for ticker in tickers {
        summaries.push(summarize_ticker(pages, llm, &system_prompt, ticker).await);
    }
    summaries
}

/// Asks for a portfolio-level risk review over the successful summaries.
///
/// Returns `None` when no ticker produced a summary.
pub async fn synthesize_portfolio<C>(
    llm: &C,
    summaries: &[TickerSummary],
    weights: Option<&Weights>,
    today: NaiveDate,
    language: &str,
) -> Option<String>
where
    C: Completion + ?Sized,
{
    let positions: Vec<PositionNote<'_>> = summaries
        .iter()
        .filter(|s| !s.failed)
        .map(|s| PositionNote {
            ticker: &s.ticker,
            weight: weights.and_then(|w| w.get(&s.ticker)),
            summary: &s.content,
        })
        .collect();
    if positions.is_empty() {
        warn!("no successful summaries; skipping portfolio synthesis");
        return None;
    }

    let messages = [
        Message::system(portfolio_system_prompt(today, language)),
        Message::user(portfolio_user_prompt(&positions)),
    ];
    info!(positions = positions.len(), "requesting portfolio synthesis");
    Some(match llm.complete(&messages).await {
        Ok(content) => content,
        Err(e) => {
            warn!(backend = llm.label(), error = %e, "portfolio synthesis failed");
            format!("[Error from {}: {e}]", llm.label())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_keeps_first_occurrence() {
        assert_eq!(
            dedup_tickers(["SHOP", " ALV", "SHOP", "", "alv", "ALV"]),
            ["SHOP", "ALV", "alv"]
        );
    }
}
