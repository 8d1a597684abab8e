use super::currency::normalize_currency_code;
use super::currency_converter::{CurrencyConverter, RatePath};
use super::fx_errors::FxError;
use super::fx_model::{ExchangeRate, NewExchangeRate};
use super::fx_traits::FxServiceTrait;
use super::rate_table::RateTable;
use crate::errors::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::{Arc, RwLock};

/// Thread-safe rate store and resolver.
///
/// Writers take the table's write lock for the duration of one insert; every
/// resolution runs under a read lock so it never sees a half-applied batch.
#[derive(Clone, Default)]
pub struct FxService {
    rate_table: Arc<RwLock<RateTable>>,
}

impl FxService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rates(rates: Vec<ExchangeRate>) -> Result<Self> {
        let service = Self::new();
        service.add_exchange_rates(rates)?;
        Ok(service)
    }

    /// Number of rates currently stored.
    pub fn rate_count(&self) -> Result<usize> {
        let table = self
            .rate_table
            .read()
            .map_err(|e| FxError::CacheError(e.to_string()))?;
        Ok(table.len())
    }

    fn store(table: &mut RateTable, rate: ExchangeRate) -> Result<()> {
        let pair = rate.pair_symbol();
        let date = rate.date;
        if let Some(previous) = table.put(rate)? {
            log::debug!(
                "Replaced {} rate for {} (was {})",
                pair,
                date,
                previous.rate
            );
        } else {
            log::info!("Added {} exchange rate for {}", pair, date);
        }
        Ok(())
    }

    fn resolve(&self, from_currency: &str, to_currency: &str, date: NaiveDate) -> Result<RatePath> {
        let from = normalize_currency_code(from_currency)?;
        let to = normalize_currency_code(to_currency)?;
        let table = self
            .rate_table
            .read()
            .map_err(|e| FxError::CacheError(e.to_string()))?;
        let path = CurrencyConverter::new(&table).resolve(&from, &to, date)?;
        Ok(path)
    }
}

impl FxServiceTrait for FxService {
    fn add_exchange_rate(&self, new_rate: NewExchangeRate) -> Result<ExchangeRate> {
        let rate = ExchangeRate::try_from(new_rate)?;
        let mut table = self
            .rate_table
            .write()
            .map_err(|e| FxError::CacheError(e.to_string()))?;
        Self::store(&mut table, rate.clone())?;
        Ok(rate)
    }

    fn add_exchange_rates(&self, rates: Vec<ExchangeRate>) -> Result<usize> {
        // Validate the whole batch first so a bad rate leaves the table untouched.
        for rate in &rates {
            rate.validate()?;
            if rate.from_currency == rate.to_currency {
                return Err(FxError::InvalidRate(format!(
                    "cannot store a rate from {} to itself",
                    rate.from_currency
                ))
                .into());
            }
        }

        let mut table = self
            .rate_table
            .write()
            .map_err(|e| FxError::CacheError(e.to_string()))?;
        let count = rates.len();
        for rate in rates {
            Self::store(&mut table, rate)?;
        }
        Ok(count)
    }

    fn get_exchange_rate_for_date(
        &self,
        from_currency: &str,
        to_currency: &str,
        date: NaiveDate,
    ) -> Result<RatePath> {
        self.resolve(from_currency, to_currency, date)
    }

    fn convert_currency_for_date(
        &self,
        amount: Decimal,
        from_currency: &str,
        to_currency: &str,
        date: NaiveDate,
    ) -> Result<Decimal> {
        let path = self.resolve(from_currency, to_currency, date)?;
        Ok(path.convert(amount)?)
    }
}
