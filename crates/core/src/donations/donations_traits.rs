use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::donations_model::{Donation, Donor, HighestGrossingCharity, NewDonation, RunningTotals};
use crate::errors::Result;

/// Trait defining the contract for donation service operations.
pub trait DonationServiceTrait: Send + Sync {
    /// Converts (if needed) and records a donation. A donation whose currency
    /// cannot be converted is rejected and may be retried after rates are added.
    fn record_donation(&self, new_donation: NewDonation) -> Result<Donation>;

    /// Parses a raw amount such as `"£15"` and records the donation.
    fn record_raw_donation(
        &self,
        donor_id: &str,
        raw_amount: &str,
        charity: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<Donation>;

    fn get_most_generous_donor(&self) -> Result<Option<Donor>>;

    fn get_charity_totals(&self) -> Result<BTreeMap<String, Decimal>>;

    fn get_running_totals(&self) -> Result<RunningTotals>;

    fn get_charity_donations(&self, charity: &str) -> Result<Vec<Donation>>;

    /// Highest-grossing charity over the configured trailing window ending at `end`.
    fn get_highest_grossing_charity(&self, end: DateTime<Utc>) -> Result<HighestGrossingCharity>;
}
