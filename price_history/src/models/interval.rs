//! Sampling cadence of a price history request.
//!
//! An [`Interval`] is the typed form of the `daily` / `weekly` / `monthly`
//! keywords accepted on the command line. Each cadence maps to exactly one
//! provider interval code (`1d`, `1wk`, `1mo`).

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntervalError {
    #[error("Invalid interval: {input:?} (expected daily, weekly or monthly)")]
    InvalidInput { input: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interval {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Interval {
    pub const ALL: [Interval; 3] = [Interval::Daily, Interval::Weekly, Interval::Monthly];

    /// The interval code understood by the market data provider.
    pub const fn provider_code(self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
            Interval::Monthly => "1mo",
        }
    }

    /// Parses a cadence keyword, falling back to [`Interval::Daily`] for
    /// anything unrecognised.
    ///
    /// Returns the interval and whether the fallback was taken so callers can
    /// tell the user about it.
    pub fn from_keyword_or_default(keyword: &str) -> (Interval, bool) {
        match keyword.parse::<Interval>() {
            Ok(interval) => (interval, false),
            Err(_) => (Interval::Daily, true),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self {
            Interval::Daily => "daily",
            Interval::Weekly => "weekly",
            Interval::Monthly => "monthly",
        };
        f.write_str(keyword)
    }
}

impl FromStr for Interval {
    type Err = IntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Interval::Daily),
            "weekly" => Ok(Interval::Weekly),
            "monthly" => Ok(Interval::Monthly),
            _ => Err(IntervalError::InvalidInput {
                input: s.to_string(),
            }),
        }
    }
}
