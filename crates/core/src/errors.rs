//! Core error types for the donation tracker.
//!
//! Module-level errors (`FxError`, `DonationError`) are folded into the root
//! [`Error`] so callers of the services only have to match on one type.

use thiserror::Error;

use crate::donations::DonationError;
use crate::fx::FxError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the donation tracker.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Fx error: {0}")]
    Fx(#[from] FxError),

    #[error("Donation error: {0}")]
    Donation(#[from] DonationError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Lock poisoned: {0}")]
    Lock(String),
}

impl Error {
    /// Returns true when the error means no rate path exists for a donation.
    /// Such donations may be retried once more rates are registered.
    pub fn is_conversion_failure(&self) -> bool {
        matches!(self, Error::Fx(FxError::ConversionFailure { .. }))
    }
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid amount format: {0}")]
    InvalidAmountFormat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),
}
