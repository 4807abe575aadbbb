use crate::{
    models::request_params::BarsRequestParams,
    providers::{ProviderError, ValidationSnafu},
    tz::utc_day_start_epoch,
};

/// Rejects ranges the chart endpoint cannot serve.
///
/// The end day is exclusive, so `start == end` selects nothing.
pub fn validate_range(params: &BarsRequestParams) -> Result<(), ProviderError> {
    if params.start >= params.end {
        return ValidationSnafu {
            message: format!(
                "empty date range {}..{} for {}",
                params.start, params.end, params.symbol
            ),
        }
        .fail();
    }
    Ok(())
}

/// Builds the query string for a chart request.
pub fn construct_params(params: &BarsRequestParams) -> Vec<(String, String)> {
    vec![
        (
            "period1".to_string(),
            utc_day_start_epoch(params.start).to_string(),
        ),
        (
            "period2".to_string(),
            utc_day_start_epoch(params.end).to_string(),
        ),
        (
            "interval".to_string(),
            params.interval.provider_code().to_string(),
        ),
        ("events".to_string(), "div,split".to_string()),
        ("includeAdjustedClose".to_string(), "true".to_string()),
    ]
}
