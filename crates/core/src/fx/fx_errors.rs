use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FxError {
    /// No direct, inverse, nearest-date or transitive rate connects the pair.
    #[error("No conversion path found for {from} -> {to} on or near {date}")]
    ConversionFailure {
        from: String,
        to: String,
        date: NaiveDate,
    },

    #[error("Invalid exchange rate: {0}")]
    InvalidRate(String),

    /// The converted amount does not fit in a `Decimal`.
    #[error("Conversion overflow: {0}")]
    ConversionOverflow(String),

    #[error("Invalid currency code: {0}")]
    InvalidCurrencyCode(String),

    #[error("Cache error: {0}")]
    CacheError(String),
}

impl FxError {
    pub fn conversion_failure(from: &str, to: &str, date: NaiveDate) -> Self {
        FxError::ConversionFailure {
            from: from.to_string(),
            to: to.to_string(),
            date,
        }
    }
}
