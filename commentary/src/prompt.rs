//! Prompt texts for the per-ticker analysis and the portfolio synthesis.

use chrono::NaiveDate;

use crate::{llm::Message, page::WebPage};

/// Persona for the per-ticker analysis, stamped with `today`.
pub fn analyst_system_prompt(today: NaiveDate, language: &str) -> String {
    format!(
        "Todays date is {today}. Keep that in mind, when answering. \
         You are acting in the role of a world-class financial analyst like Warren Buffett. \
         Analyze a stock based on financial data scraped from its Finviz profile. \
         Ignore any navigation, ads, or UI-related text. Only begin analysis if the following key metrics are present: \
         ROA, ROE, ROI, Revenue Growth, Cost of Revenue, Gross Profit, Operating Expenses, Operating Income, Pretax Income, \
         Market Cap, P/E, Price/Sales, Price/Book, EPS Surprise, EPS this y, Debt/Equity, and Short Ratio or Short Float. \
         Evaluate the stock as a value investor in the style of Warren Buffett. \
         Identify short-term catalysts (within 3 months) and provide a 3-month forecast based on fundamentals. \
         If news or announcements are present, summarize them separately. \
         Respond in Markdown format in {language} in the style of Warren Buffett.",
        today = today.format("%Y-%m-%d"),
    )
}

pub fn page_user_prompt(page: &WebPage) -> String {
    format!(
        "You are looking at a financial website titled '{}'.\n\nHere is the scraped text content:\n\n{}",
        page.title, page.text
    )
}

pub fn page_messages(system_prompt: &str, page: &WebPage) -> Vec<Message> {
    vec![Message::system(system_prompt), Message::user(page_user_prompt(page))]
}

/// One analysed position as it enters the synthesis prompt.
#[derive(Debug, Clone, Copy)]
pub struct PositionNote<'a> {
    pub ticker: &'a str,
    /// Fraction of the portfolio, `0.25` for 25 %.
    pub weight: Option<f64>,
    pub summary: &'a str,
}

pub fn portfolio_system_prompt(today: NaiveDate, language: &str) -> String {
    format!(
        "Todays date is {today}. You are a risk manager reviewing a private equity portfolio in the style of Warren Buffett. \
         You receive one analysis per position and, where known, its portfolio weight. \
         Assess concentration, sector and currency clustering, balance-sheet risk and correlated catalysts. \
         Name the three largest risks, the positions that drive them, and concrete rebalancing ideas. \
         Respond in Markdown format in {language}.",
        today = today.format("%Y-%m-%d"),
    )
}

pub fn portfolio_user_prompt(positions: &[PositionNote<'_>]) -> String {
    let mut prompt = String::from("Here are the analyses of all portfolio positions:\n");
    for p in positions {
        match p.weight {
            Some(w) => prompt.push_str(&format!("\n## {} (weight {:.2} %)\n\n", p.ticker, w * 100.0)),
            None => prompt.push_str(&format!("\n## {} (weight unknown)\n\n", p.ticker)),
        }
        prompt.push_str(p.summary);
        prompt.push('\n');
    }
    prompt
}
