//! Static HTML documents for the commentary.

use std::{
    fmt::Write as _,
    path::{Path, PathBuf},
};

use crate::summarize::TickerSummary;

const STYLE: &str = "\
body { font-family: 'Roboto', sans-serif; background-color: #f9f9f9; color: #333; line-height: 1.6; padding: 40px; margin: 0; }
h1 { font-size: 2.2em; margin-bottom: 0.5em; }
h2 { margin-top: 2em; color: #2c3e50; }
div { background-color: #fff; padding: 20px; margin-bottom: 40px; border-radius: 8px; box-shadow: 0 2px 6px rgba(0,0,0,0.05); max-width: 1000px; }";

/// Escapes text for element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escaped text with line breaks kept visible.
fn content_block(text: &str) -> String {
    escape_html(text).replace("\r\n", "\n").replace('\n', "<br>")
}

fn document(title: &str, heading: &str, body: &str) -> String {
    let mut html = String::new();
    html.push_str("<html><head><meta charset='UTF-8'>\n");
    let _ = writeln!(html, "<title>{}</title>", escape_html(title));
    html.push_str(
        "<link href='https://fonts.googleapis.com/css2?family=Roboto&display=swap' rel='stylesheet'>\n",
    );
    let _ = writeln!(html, "<style>\n{STYLE}\n</style></head><body><h1>{}</h1>", escape_html(heading));
    html.push_str(body);
    html.push_str("<div style='margin-bottom: 150px;'></div></body></html>\n");
    html
}

/// One `<h2>` and `<div>` per ticker, in the given order.
pub fn render_overview(summaries: &[TickerSummary]) -> String {
    let mut body = String::new();
    for s in summaries {
        let _ = writeln!(body, "<h2>{}</h2>", escape_html(&s.ticker));
        let _ = writeln!(body, "<div>{}</div>", content_block(&s.content));
    }
    document("Stock Overview", "Stock Overview Report", &body)
}

/// The portfolio risk synthesis as its own document.
pub fn render_portfolio_risk(content: &str) -> String {
    let body = format!("<div>{}</div>\n", content_block(content));
    document("Portfolio Risk", "Portfolio Risk Report", &body)
}

/// Writes `html` to `dir/file_name`, creating `dir` and replacing any old file.
pub fn write_report(dir: &Path, file_name: &str, html: &str) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    std::fs::write(&path, html)?;
    Ok(path)
}
