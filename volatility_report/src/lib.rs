//! Rolling-volatility reports on top of [`price_history`].
//!
//! - [`analysis`]: returns, rolling volatility and the price-basis fallback.
//! - [`io`]: the [`io::ReportSink`] boundary with CSV table and PNG chart output.
//! - [`config`]: TOML run configuration.
//! - [`pipeline`]: fetch, select, write and chart in one call.

pub mod analysis;
pub mod config;
pub mod io;
pub mod pipeline;
