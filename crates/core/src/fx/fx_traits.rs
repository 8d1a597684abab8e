use super::currency_converter::RatePath;
use super::fx_model::{ExchangeRate, NewExchangeRate};
use crate::errors::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Trait defining the contract for FX service operations.
pub trait FxServiceTrait: Send + Sync {
    /// Validates and stores a rate. A rate already stored for the same
    /// (date, source, target) is replaced.
    fn add_exchange_rate(&self, new_rate: NewExchangeRate) -> Result<ExchangeRate>;

    /// Stores a batch of already-built rates, returning how many were stored.
    fn add_exchange_rates(&self, rates: Vec<ExchangeRate>) -> Result<usize>;

    fn get_exchange_rate_for_date(
        &self,
        from_currency: &str,
        to_currency: &str,
        date: NaiveDate,
    ) -> Result<RatePath>;

    fn convert_currency_for_date(
        &self,
        amount: Decimal,
        from_currency: &str,
        to_currency: &str,
        date: NaiveDate,
    ) -> Result<Decimal>;
}
