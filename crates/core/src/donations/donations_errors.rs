use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DonationError {
    #[error("Donation {0} already has a reporting currency amount")]
    AmountAlreadyResolved(String),

    #[error("Donation {0} would overflow a running total")]
    TotalOverflow(String),

    #[error("Invalid donation: {0}")]
    InvalidDonation(String),
}
