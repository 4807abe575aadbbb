use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use commentary::{
    llm::{Completion, LlmError, Message},
    page::{PageError, PageSource, WebPage},
    report::render_overview,
    summarize::{summarize_all, synthesize_portfolio},
    weights::Weights,
};

/// Serves a page for every ticker except `MISSING`.
struct FakePages;

#[async_trait]
impl PageSource for FakePages {
    async fn fetch_page(&self, ticker: &str) -> Result<WebPage, PageError> {
        if ticker == "MISSING" {
            return Err(PageError::Status {
                status: 404,
                url: format!("https://quotes.test/{ticker}"),
            });
        }
        Ok(WebPage {
            url: format!("https://quotes.test/{ticker}"),
            title: format!("{ticker} Quote"),
            text: format!("{ticker} P/E 12"),
        })
    }
}

/// Echoes the page title, fails for anything mentioning `BROKEN`, and
/// remembers every prompt it saw.
#[derive(Default)]
struct FakeModel {
    seen: Mutex<Vec<Vec<Message>>>,
}

#[async_trait]
impl Completion for FakeModel {
    fn label(&self) -> &str {
        "fake model"
    }

    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        self.seen.lock().unwrap().push(messages.to_vec());
        let user = &messages[messages.len() - 1].content;
        if user.contains("BROKEN") {
            return Err(LlmError::Api {
                status: 500,
                message: "boom".to_string(),
            });
        }
        Ok(format!("Analyse:\n{}", user.lines().next().unwrap_or_default()))
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
}

fn tickers(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

#[tokio::test]
async fn failures_become_bracketed_text_and_the_batch_continues() {
    let model = FakeModel::default();
    let summaries = summarize_all(
        &FakePages,
        &model,
        &tickers(&["AAPL", "BROKEN", "MISSING", "MSFT"]),
        today(),
        "German",
    )
    .await;

    let order: Vec<&str> = summaries.iter().map(|s| s.ticker.as_str()).collect();
    assert_eq!(order, ["AAPL", "BROKEN", "MISSING", "MSFT"]);

    assert!(!summaries[0].failed);
    assert!(summaries[0].content.contains("AAPL Quote"));
    assert_eq!(summaries[1].content, "[Error from fake model: API error 500: boom]");
    assert!(summaries[1].failed);
    assert_eq!(
        summaries[2].content,
        "[Error fetching website: HTTP 404 for https://quotes.test/MISSING]"
    );
    assert!(!summaries[3].failed);

    // The missing page never reached the model.
    assert_eq!(model.seen.lock().unwrap().len(), 3);

    let html = render_overview(&summaries);
    assert!(html.contains("<h2>BROKEN</h2>\n<div>[Error from fake model: API error 500: boom]</div>"));
}

#[tokio::test]
async fn every_prompt_carries_the_persona() {
    let model = FakeModel::default();
    summarize_all(&FakePages, &model, &tickers(&["AAPL"]), today(), "English").await;

    let seen = model.seen.lock().unwrap();
    assert_eq!(seen[0][0].role, "system");
    assert!(seen[0][0].content.starts_with("Todays date is 2025-06-02."));
    assert!(seen[0][0].content.contains("in English"));
    assert!(seen[0][1].content.contains("titled 'AAPL Quote'"));
}

#[tokio::test]
async fn synthesis_uses_weights_and_skips_failed_tickers() {
    let model = FakeModel::default();
    let summaries = summarize_all(
        &FakePages,
        &model,
        &tickers(&["AAPL", "MISSING", "O"]),
        today(),
        "German",
    )
    .await;
    let weights = Weights::parse("Ticker;Gewicht\nAAPL;60\nO;40\n").unwrap();

    let content = synthesize_portfolio(&model, &summaries, Some(&weights), today(), "German")
        .await
        .unwrap();
    assert!(content.starts_with("Analyse:"));

    let seen = model.seen.lock().unwrap();
    let prompt = &seen.last().unwrap()[1].content;
    assert!(prompt.contains("## AAPL (weight 60.00 %)"));
    assert!(prompt.contains("## O (weight 40.00 %)"));
    assert!(!prompt.contains("MISSING"));
}

#[tokio::test]
async fn synthesis_is_skipped_when_nothing_succeeded() {
    let model = FakeModel::default();
    let summaries = summarize_all(&FakePages, &model, &tickers(&["MISSING"]), today(), "German").await;
    assert!(synthesize_portfolio(&model, &summaries, None, today(), "German")
        .await
        .is_none());
}
