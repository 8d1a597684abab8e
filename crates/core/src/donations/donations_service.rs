use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use super::donations_model::{Donation, Donor, HighestGrossingCharity, NewDonation, RunningTotals};
use super::donations_traits::DonationServiceTrait;
use super::ledger::Ledger;
use super::window_query::WindowQuery;
use crate::errors::{Error, Result};
use crate::fx::FxServiceTrait;
use crate::settings::EngineSettings;

/// Query and recording surface over a shared [`Ledger`].
///
/// `record_*` holds the ledger's write lock across conversion and every
/// aggregate update, so readers never observe a half-recorded donation.
/// Queries share the read lock.
pub struct DonationService {
    ledger: Arc<RwLock<Ledger>>,
    settings: EngineSettings,
}

impl DonationService {
    pub fn new(fx_service: Arc<dyn FxServiceTrait>, settings: EngineSettings) -> Self {
        let ledger = Ledger::new(fx_service, &settings.reporting_currency);
        DonationService {
            ledger: Arc::new(RwLock::new(ledger)),
            settings,
        }
    }

    fn read_ledger<T>(&self, f: impl FnOnce(&Ledger) -> T) -> Result<T> {
        let ledger = self
            .ledger
            .read()
            .map_err(|e| Error::Lock(e.to_string()))?;
        Ok(f(&ledger))
    }
}

impl DonationServiceTrait for DonationService {
    fn record_donation(&self, new_donation: NewDonation) -> Result<Donation> {
        let donation = Donation::new(new_donation)?;
        let mut ledger = self
            .ledger
            .write()
            .map_err(|e| Error::Lock(e.to_string()))?;
        let recorded = ledger.record(donation)?;
        Ok(recorded.clone())
    }

    fn record_raw_donation(
        &self,
        donor_id: &str,
        raw_amount: &str,
        charity: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<Donation> {
        let new_donation = NewDonation::parse(
            donor_id,
            raw_amount,
            charity,
            timestamp,
            &self.settings.default_currency,
        )?;
        self.record_donation(new_donation)
    }

    fn get_most_generous_donor(&self) -> Result<Option<Donor>> {
        self.read_ledger(|ledger| ledger.get_most_generous_donor().cloned())
    }

    fn get_charity_totals(&self) -> Result<BTreeMap<String, Decimal>> {
        self.read_ledger(Ledger::get_charity_totals)
    }

    fn get_running_totals(&self) -> Result<RunningTotals> {
        self.read_ledger(Ledger::running_totals)
    }

    fn get_charity_donations(&self, charity: &str) -> Result<Vec<Donation>> {
        self.read_ledger(|ledger| {
            ledger
                .get_charity_donations(charity)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    fn get_highest_grossing_charity(&self, end: DateTime<Utc>) -> Result<HighestGrossingCharity> {
        let window = self.settings.window();
        let limit = self.settings.recent_donations_limit;
        self.read_ledger(|ledger| {
            WindowQuery::new(ledger.donations()).highest_charity_in_window(end, window, limit)
        })
    }
}
