use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::donations_errors::DonationError;
use super::donations_model::{Charity, Donation, Donor, RunningTotals};
use crate::errors::Result;
use crate::fx::FxServiceTrait;

/// Append-only donation history with incrementally maintained aggregates.
///
/// Every aggregate here (grand total, charity totals, donor totals and the
/// most-generous pointer) is updated in `record` and never recomputed.
pub struct Ledger {
    fx_service: Arc<dyn FxServiceTrait>,
    reporting_currency: String,
    donations: Vec<Donation>,
    charities: HashMap<String, Charity>,
    donors: HashMap<String, Donor>,
    most_generous_donor: Option<String>,
    total_donations: Decimal,
}

impl Ledger {
    pub fn new(fx_service: Arc<dyn FxServiceTrait>, reporting_currency: &str) -> Self {
        Ledger {
            fx_service,
            reporting_currency: reporting_currency.to_string(),
            donations: Vec::new(),
            charities: HashMap::new(),
            donors: HashMap::new(),
            most_generous_donor: None,
            total_donations: Decimal::ZERO,
        }
    }

    /// Records a donation, converting it to the reporting currency first when
    /// it has not been converted yet. The rate date is the donation's UTC day.
    ///
    /// A failed conversion leaves the ledger untouched.
    pub fn record(&mut self, mut donation: Donation) -> Result<&Donation> {
        let converted = match donation.amount_in_reporting_currency() {
            Some(value) => value,
            None => {
                let value = self
                    .fx_service
                    .convert_currency_for_date(
                        donation.amount.amount,
                        &donation.amount.currency,
                        &self.reporting_currency,
                        donation.timestamp.date_naive(),
                    )
                    .map_err(|e| {
                        log::warn!("Rejected donation {}: {}", donation, e);
                        e
                    })?;
                donation.resolve_amount(value)?;
                log::debug!(
                    "Converted {} to {} {}",
                    donation.amount,
                    value,
                    self.reporting_currency
                );
                value
            }
        };

        // Every new total is computed before any of them is written.
        let overflow = || DonationError::TotalOverflow(donation.id.clone());
        let total_donations = self
            .total_donations
            .checked_add(converted)
            .ok_or_else(overflow)?;
        let charity_total = self
            .charities
            .get(&donation.charity)
            .map_or(Decimal::ZERO, |c| c.total_donations)
            .checked_add(converted)
            .ok_or_else(overflow)?;
        let donor_total = self
            .donors
            .get(&donation.donor_id)
            .map_or(Decimal::ZERO, |d| d.total)
            .checked_add(converted)
            .ok_or_else(overflow)?;

        let position = self.donations.len();
        self.total_donations = total_donations;

        let charity = self
            .charities
            .entry(donation.charity.clone())
            .or_insert_with(|| Charity::new(&donation.charity));
        charity.add_donation(position, charity_total);

        self.donors
            .entry(donation.donor_id.clone())
            .or_insert_with(|| Donor::new(&donation.donor_id))
            .add_donation(donor_total);

        // Strictly greater: on a tie the donor that got there first stays.
        let current_max = self
            .most_generous_donor
            .as_ref()
            .and_then(|id| self.donors.get(id))
            .map(|d| d.total);
        if current_max.map_or(true, |max| donor_total > max) {
            self.most_generous_donor = Some(donation.donor_id.clone());
        }

        log::info!(
            "Recorded donation {} ({} {})",
            donation,
            converted,
            self.reporting_currency
        );
        self.donations.push(donation);
        Ok(&self.donations[position])
    }

    pub fn get_charity_totals(&self) -> BTreeMap<String, Decimal> {
        self.charities
            .values()
            .map(|c| (c.name.clone(), c.total_donations))
            .collect()
    }

    pub fn get_most_generous_donor(&self) -> Option<&Donor> {
        self.most_generous_donor
            .as_ref()
            .and_then(|id| self.donors.get(id))
    }

    pub fn running_totals(&self) -> RunningTotals {
        RunningTotals {
            total_donations: self.total_donations,
            total_per_charity: self.get_charity_totals(),
        }
    }

    pub fn total_donations(&self) -> Decimal {
        self.total_donations
    }

    /// Full history in insertion order.
    pub fn donations(&self) -> &[Donation] {
        &self.donations
    }

    pub fn get_charity(&self, name: &str) -> Option<&Charity> {
        self.charities.get(name)
    }

    /// A charity's donations in insertion order.
    pub fn get_charity_donations(&self, name: &str) -> Vec<&Donation> {
        self.charities
            .get(name)
            .map(|c| {
                c.donation_positions
                    .iter()
                    .filter_map(|&p| self.donations.get(p))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get_donor(&self, donor_id: &str) -> Option<&Donor> {
        self.donors.get(donor_id)
    }

    pub fn len(&self) -> usize {
        self.donations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.donations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::donations::NewDonation;
    use crate::errors::Error;
    use crate::fx::{ExchangeRate, FxService, Money};
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fx_service() -> Arc<FxService> {
        Arc::new(
            FxService::with_rates(vec![
                ExchangeRate::new("GBP", "EUR", dec!(1.18), dec!(0.3), day(2023, 1, 21)).unwrap(),
                ExchangeRate::new("USD", "EUR", dec!(0.92), dec!(0.4), day(2023, 1, 21)).unwrap(),
            ])
            .unwrap(),
        )
    }

    fn donation(donor: &str, charity: &str, amount: Decimal, currency: &str) -> Donation {
        Donation::new(NewDonation::new(
            donor,
            charity,
            at(2023, 1, 21, 12, 0),
            Money::new(amount, currency),
        ))
        .unwrap()
    }

    #[test]
    fn test_record_converts_to_reporting_currency() {
        let mut ledger = Ledger::new(fx_service(), "EUR");
        let recorded = ledger
            .record(donation("User1", "Charity1", dec!(10), "USD"))
            .unwrap();

        // $10 - 0.4% fee = $9.96 * 0.92 = 9.1632
        assert_eq!(recorded.amount_in_reporting_currency(), Some(dec!(9.1632)));
        assert_eq!(ledger.len(), 1);
        assert!(ledger.get_charity("Charity1").is_some());
        assert!(ledger.get_donor("User1").is_some());
    }

    #[test]
    fn test_reporting_currency_donation_is_kept_as_is() {
        let mut ledger = Ledger::new(fx_service(), "EUR");
        let recorded = ledger
            .record(donation("User1", "Charity1", dec!(4), "EUR"))
            .unwrap();
        assert_eq!(recorded.amount_in_reporting_currency(), Some(dec!(4)));
    }

    #[test]
    fn test_pre_resolved_amount_is_not_converted_again() {
        let mut ledger = Ledger::new(fx_service(), "EUR");
        let mut d = donation("User1", "Charity1", dec!(10), "JPY");
        d.resolve_amount(dec!(0.07)).unwrap();

        let recorded = ledger.record(d).unwrap();
        assert_eq!(recorded.amount_in_reporting_currency(), Some(dec!(0.07)));
    }

    #[test]
    fn test_conversion_failure_rejects_donation() {
        let mut ledger = Ledger::new(fx_service(), "EUR");
        ledger
            .record(donation("User1", "Charity1", dec!(4), "EUR"))
            .unwrap();

        let err = ledger
            .record(donation("User2", "Charity2", dec!(1000), "JPY"))
            .unwrap_err();
        assert!(err.is_conversion_failure());
        assert!(matches!(err, Error::Fx(_)));

        assert_eq!(ledger.len(), 1);
        assert!(ledger.get_charity("Charity2").is_none());
        assert!(ledger.get_donor("User2").is_none());
        assert_eq!(ledger.total_donations(), dec!(4));
        assert_eq!(ledger.get_most_generous_donor().unwrap().donor_id, "User1");
    }

    #[test]
    fn test_charity_totals_accumulate() {
        let mut ledger = Ledger::new(fx_service(), "EUR");
        ledger.record(donation("User1", "Charity1", dec!(5), "EUR")).unwrap();
        ledger.record(donation("User2", "Charity1", dec!(2.5), "EUR")).unwrap();
        ledger.record(donation("User2", "Charity2", dec!(1), "EUR")).unwrap();

        let totals = ledger.get_charity_totals();
        assert_eq!(totals.get("Charity1"), Some(&dec!(7.5)));
        assert_eq!(totals.get("Charity2"), Some(&dec!(1)));

        let running = ledger.running_totals();
        assert_eq!(running.total_donations, dec!(8.5));
        assert_eq!(running.total_per_charity, totals);

        let history: Vec<&str> = ledger
            .get_charity_donations("Charity1")
            .iter()
            .map(|d| d.donor_id.as_str())
            .collect();
        assert_eq!(history, vec!["User1", "User2"]);
        assert_eq!(ledger.get_charity("Charity1").unwrap().donation_count(), 2);
    }

    #[test]
    fn test_most_generous_donor_tracks_lifetime_total() {
        let mut ledger = Ledger::new(fx_service(), "EUR");
        assert!(ledger.get_most_generous_donor().is_none());

        ledger.record(donation("User1", "Charity1", dec!(10), "EUR")).unwrap();
        ledger.record(donation("User2", "Charity1", dec!(6), "EUR")).unwrap();
        assert_eq!(ledger.get_most_generous_donor().unwrap().donor_id, "User1");

        ledger.record(donation("User2", "Charity2", dec!(5), "EUR")).unwrap();
        let top = ledger.get_most_generous_donor().unwrap();
        assert_eq!(top.donor_id, "User2");
        assert_eq!(top.total, dec!(11));
        assert_eq!(top.donation_count, 2);
    }

    #[test]
    fn test_most_generous_donor_tie_keeps_earlier_donor() {
        let mut ledger = Ledger::new(fx_service(), "EUR");
        ledger.record(donation("User1", "Charity1", dec!(10), "EUR")).unwrap();
        ledger.record(donation("User2", "Charity1", dec!(10), "EUR")).unwrap();

        assert_eq!(ledger.get_most_generous_donor().unwrap().donor_id, "User1");
    }
}
