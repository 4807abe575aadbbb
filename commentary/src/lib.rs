//! LLM-written stock commentary rendered as static HTML.
//!
//! Per ticker: fetch the quote page ([`page`]), build the analyst prompt
//! ([`prompt`]), ask the configured backend ([`llm`]) and collect the answer
//! ([`summarize`]). The answers, plus an optional portfolio synthesis that
//! uses allocation [`weights`], end up in HTML documents ([`report`]).

pub mod config;
pub mod llm;
pub mod page;
pub mod prompt;
pub mod report;
pub mod summarize;
pub mod weights;
