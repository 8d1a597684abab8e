//! Donation domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use super::donations_errors::DonationError;
use crate::constants::DISPLAY_DECIMAL_PRECISION;
use crate::errors::Result;
use crate::fx::{normalize_currency_code, parse_money, Money};

/// Input model for a donation handed over by ingestion.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewDonation {
    pub donor_id: String,
    pub charity: String,
    pub timestamp: DateTime<Utc>,
    pub amount: Money,
}

impl NewDonation {
    pub fn new(
        donor_id: impl Into<String>,
        charity: impl Into<String>,
        timestamp: DateTime<Utc>,
        amount: Money,
    ) -> Self {
        Self {
            donor_id: donor_id.into(),
            charity: charity.into(),
            timestamp,
            amount,
        }
    }

    /// Builds a donation from a raw amount such as `"£15"` or `"10 USD"`.
    /// Bare numbers are taken to be in `default_currency`.
    pub fn parse(
        donor_id: impl Into<String>,
        raw_amount: &str,
        charity: impl Into<String>,
        timestamp: DateTime<Utc>,
        default_currency: &str,
    ) -> Result<Self> {
        let amount = parse_money(raw_amount, default_currency)?;
        Ok(Self::new(donor_id, charity, timestamp, amount))
    }
}

/// A recorded (or about to be recorded) donation.
///
/// `amount_in_reporting_currency` starts empty and is filled exactly once.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: String,
    pub donor_id: String,
    pub charity: String,
    pub timestamp: DateTime<Utc>,
    pub amount: Money,
    amount_in_reporting_currency: Option<Decimal>,
}

impl Donation {
    pub fn new(new_donation: NewDonation) -> std::result::Result<Self, DonationError> {
        let NewDonation {
            donor_id,
            charity,
            timestamp,
            amount,
        } = new_donation;

        if donor_id.trim().is_empty() {
            return Err(DonationError::InvalidDonation(
                "donor id must not be empty".to_string(),
            ));
        }
        if charity.trim().is_empty() {
            return Err(DonationError::InvalidDonation(
                "charity must not be empty".to_string(),
            ));
        }
        if amount.amount < Decimal::ZERO {
            return Err(DonationError::InvalidDonation(format!(
                "amount must not be negative, got {}",
                amount
            )));
        }
        let currency = normalize_currency_code(&amount.currency)
            .map_err(|e| DonationError::InvalidDonation(e.to_string()))?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            donor_id,
            charity,
            timestamp,
            amount: Money::new(amount.amount, currency),
            amount_in_reporting_currency: None,
        })
    }

    pub fn amount_in_reporting_currency(&self) -> Option<Decimal> {
        self.amount_in_reporting_currency
    }

    pub fn is_resolved(&self) -> bool {
        self.amount_in_reporting_currency.is_some()
    }

    /// Sets the converted amount. Fails if it was already set.
    pub fn resolve_amount(&mut self, value: Decimal) -> std::result::Result<(), DonationError> {
        if self.amount_in_reporting_currency.is_some() {
            return Err(DonationError::AmountAlreadyResolved(self.id.clone()));
        }
        self.amount_in_reporting_currency = Some(value);
        Ok(())
    }
}

impl fmt::Display for Donation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} donated {} {} to {} at {}",
            self.donor_id,
            self.amount.amount.round_dp(DISPLAY_DECIMAL_PRECISION),
            self.amount.currency,
            self.charity,
            self.timestamp
        )
    }
}

/// Running aggregate for one charity.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Charity {
    pub name: String,
    pub total_donations: Decimal,
    /// Positions of this charity's donations in the ledger history, in
    /// insertion order.
    #[serde(skip)]
    pub(crate) donation_positions: Vec<usize>,
}

impl Charity {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            total_donations: Decimal::ZERO,
            donation_positions: Vec::new(),
        }
    }

    /// Appends a history position and stores the already summed total.
    pub(crate) fn add_donation(&mut self, position: usize, new_total: Decimal) {
        self.donation_positions.push(position);
        self.total_donations = new_total;
    }

    pub fn donation_count(&self) -> usize {
        self.donation_positions.len()
    }
}

/// Lifetime aggregate for one donor.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    pub donor_id: String,
    pub total: Decimal,
    pub donation_count: usize,
}

impl Donor {
    pub(crate) fn new(donor_id: &str) -> Self {
        Self {
            donor_id: donor_id.to_string(),
            total: Decimal::ZERO,
            donation_count: 0,
        }
    }

    pub(crate) fn add_donation(&mut self, new_total: Decimal) {
        self.total = new_total;
        self.donation_count += 1;
    }
}

/// Grand total plus the running total of every charity.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunningTotals {
    pub total_donations: Decimal,
    pub total_per_charity: BTreeMap<String, Decimal>,
}

/// Result of the trailing-window query.
///
/// `charity` is `None` and `donations` is empty when nothing falls inside the
/// window.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HighestGrossingCharity {
    pub charity: Option<String>,
    pub total: Decimal,
    pub donations: Vec<Donation>,
}

impl HighestGrossingCharity {
    pub fn empty() -> Self {
        Self {
            charity: None,
            total: Decimal::ZERO,
            donations: Vec::new(),
        }
    }
}
