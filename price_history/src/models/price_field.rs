//! The price columns a provider can deliver for one bar.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceFieldError {
    #[error("Unknown price field: {0:?} (expected Open, High, Low, Close or Adj Close)")]
    Unknown(String),

    #[error("No price fields given")]
    Empty,
}

/// One price column of a bar.
///
/// Ordering follows [`PriceField::ALL`], which is also the column order used
/// when a table is built straight from provider data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    AdjustedClose,
}

impl PriceField {
    pub const ALL: [PriceField; 5] = [
        PriceField::Open,
        PriceField::High,
        PriceField::Low,
        PriceField::Close,
        PriceField::AdjustedClose,
    ];

    /// Column name as written to report headers.
    pub const fn name(self) -> &'static str {
        match self {
            PriceField::Open => "Open",
            PriceField::High => "High",
            PriceField::Low => "Low",
            PriceField::Close => "Close",
            PriceField::AdjustedClose => "Adj Close",
        }
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PriceField {
    type Err = PriceFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect();
        match normalized.as_str() {
            "open" => Ok(PriceField::Open),
            "high" => Ok(PriceField::High),
            "low" => Ok(PriceField::Low),
            "close" => Ok(PriceField::Close),
            "adjclose" | "adjustedclose" | "adj" => Ok(PriceField::AdjustedClose),
            _ => Err(PriceFieldError::Unknown(s.trim().to_string())),
        }
    }
}

/// Parses a whitespace separated list such as `"Open High Adj Close"`.
///
/// `Adj Close` arrives as two tokens after splitting, so an `adj`/`adjusted`
/// token swallows a directly following `close`. Duplicates are dropped,
/// keeping the first occurrence.
pub fn parse_field_list(input: &str) -> Result<Vec<PriceField>, PriceFieldError> {
    let mut fields = Vec::new();
    let mut tokens = input.split_whitespace().peekable();

    while let Some(token) = tokens.next() {
        let lower = token.to_lowercase();
        let field = if lower == "adj" || lower == "adjusted" {
            if tokens.peek().is_some_and(|next| next.eq_ignore_ascii_case("close")) {
                tokens.next();
            }
            PriceField::AdjustedClose
        } else {
            token.parse()?
        };
        if !fields.contains(&field) {
            fields.push(field);
        }
    }

    if fields.is_empty() {
        return Err(PriceFieldError::Empty);
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_prompt_example() {
        let fields = parse_field_list("Open High Low Close Adj Close").unwrap();
        assert_eq!(fields, PriceField::ALL.to_vec());
    }

    #[test]
    fn lowercase_and_compact_spellings_are_accepted() {
        let fields = parse_field_list("close adjclose adj_close").unwrap();
        assert_eq!(fields, vec![PriceField::Close, PriceField::AdjustedClose]);
    }

    #[test]
    fn trailing_adj_without_close_still_means_adjusted_close() {
        let fields = parse_field_list("High Adj").unwrap();
        assert_eq!(fields, vec![PriceField::High, PriceField::AdjustedClose]);
    }

    #[test]
    fn unknown_field_is_rejected() {
        assert_eq!(
            parse_field_list("Open Volume"),
            Err(PriceFieldError::Unknown("Volume".to_string()))
        );
    }

    #[test]
    fn empty_list_is_rejected() {
        assert_eq!(parse_field_list("   "), Err(PriceFieldError::Empty));
    }

    #[test]
    fn names_parse_back() {
        for field in PriceField::ALL {
            assert_eq!(field.name().parse::<PriceField>().unwrap(), field);
        }
    }
}
