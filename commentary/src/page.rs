//! Quote page retrieval and text extraction.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use thiserror::Error;
use tracing::debug;

pub const NO_TITLE: &str = "No title found";

/// Subtrees whose text never reaches the prompt.
const STRIPPED_TAGS: [&str; 5] = ["script", "style", "img", "input", "noscript"];

#[derive(Debug, Error)]
pub enum PageError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebPage {
    pub url: String,
    pub title: String,
    /// Visible text nodes, trimmed, one per line.
    pub text: String,
}

impl WebPage {
    pub fn from_html(url: impl Into<String>, html: &str) -> Self {
        let document = Html::parse_document(html);

        let title = Selector::parse("title")
            .ok()
            .and_then(|s| {
                document
                    .select(&s)
                    .next()
                    .map(|t| t.text().collect::<String>().trim().to_string())
            })
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| NO_TITLE.to_string());

        let body = Selector::parse("body")
            .ok()
            .and_then(|s| document.select(&s).next())
            .unwrap_or_else(|| document.root_element());

        let lines: Vec<&str> = body
            .descendants()
            .filter_map(|node| {
                let text = node.value().as_text()?;
                let stripped = node.ancestors().any(|a| {
                    a.value()
                        .as_element()
                        .is_some_and(|e| STRIPPED_TAGS.contains(&e.name()))
                });
                let text = text.trim();
                (!stripped && !text.is_empty()).then_some(text)
            })
            .collect();

        Self {
            url: url.into(),
            title,
            text: lines.join("\n"),
        }
    }
}

/// Where ticker pages come from.
#[async_trait]
pub trait PageSource {
    async fn fetch_page(&self, ticker: &str) -> Result<WebPage, PageError>;
}

/// Fills `{ticker}` in a URL template.
pub fn page_url(template: &str, ticker: &str) -> String {
    template.replace("{ticker}", ticker)
}

/// Fetches pages over HTTP from a URL template such as
/// `https://finviz.com/quote.ashx?t={ticker}`.
pub struct HttpPageSource {
    client: Client,
    url_template: String,
}

impl HttpPageSource {
    /// `client` should carry a browser-like user agent; quote sites refuse
    /// the default one.
    pub fn new(client: Client, url_template: impl Into<String>) -> Self {
        Self {
            client,
            url_template: url_template.into(),
        }
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_page(&self, ticker: &str) -> Result<WebPage, PageError> {
        let url = page_url(&self.url_template, ticker);
        debug!(%ticker, %url, "fetching page");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PageError::Status {
                status: status.as_u16(),
                url,
            });
        }
        let html = response.text().await?;
        Ok(WebPage::from_html(url, &html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markup_and_noise() {
        let html = r#"
            <html>
              <head><title> ACME Corp Quote </title><style>body { color: red }</style></head>
              <body>
                <script>var tracking = 1;</script>
                <h1>ACME</h1>
                <table><tr><td>P/E</td><td>12.3</td></tr></table>
                <img alt="logo" src="x.png">
                <input value="search">
                <noscript>enable js</noscript>
                <p>  Market Cap   </p>
              </body>
            </html>"#;

        let page = WebPage::from_html("https://example.test/q", html);
        assert_eq!(page.title, "ACME Corp Quote");
        assert_eq!(page.text, "ACME\nP/E\n12.3\nMarket Cap");
        assert_eq!(page.url, "https://example.test/q");
    }

    #[test]
    fn missing_title_has_placeholder() {
        let page = WebPage::from_html("u", "<html><body><p>x</p></body></html>");
        assert_eq!(page.title, NO_TITLE);
        assert_eq!(page.text, "x");
    }

    #[test]
    fn url_template_is_filled() {
        assert_eq!(
            page_url("https://finviz.com/quote.ashx?t={ticker}&ty=c&ta=1&p=d", "BRK-B"),
            "https://finviz.com/quote.ashx?t=BRK-B&ty=c&ta=1&p=d"
        );
    }
}
