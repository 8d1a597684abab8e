use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::currency::normalize_currency_code;
use super::fx_errors::FxError;
use crate::constants::RATE_DECIMAL_PRECISION;

/// An exchange rate effective for one calendar day.
///
/// `fee` is a percentage taken from the amount before the rate is applied:
/// `convert(amount) = (amount - amount * fee / 100) * rate`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub from_currency: String,
    pub to_currency: String,
    #[serde(serialize_with = "serialize_decimal_6")]
    pub rate: Decimal,
    pub fee: Decimal,
    pub date: NaiveDate,
}

impl ExchangeRate {
    /// Builds a validated rate. Currency codes are normalized to upper case.
    pub fn new(
        from_currency: &str,
        to_currency: &str,
        rate: Decimal,
        fee: Decimal,
        date: NaiveDate,
    ) -> Result<Self, FxError> {
        let rate = ExchangeRate {
            from_currency: normalize_currency_code(from_currency)?,
            to_currency: normalize_currency_code(to_currency)?,
            rate,
            fee,
            date,
        };
        rate.validate()?;
        Ok(rate)
    }

    /// The rate used when source and target currency are the same.
    pub fn identity(currency: &str, date: NaiveDate) -> Self {
        ExchangeRate {
            from_currency: currency.to_string(),
            to_currency: currency.to_string(),
            rate: Decimal::ONE,
            fee: Decimal::ZERO,
            date,
        }
    }

    pub fn validate(&self) -> Result<(), FxError> {
        if self.rate <= Decimal::ZERO {
            return Err(FxError::InvalidRate(format!(
                "rate for {} must be positive, got {}",
                self.pair_symbol(),
                self.rate
            )));
        }
        if self.fee < Decimal::ZERO || self.fee > dec!(100) {
            return Err(FxError::InvalidRate(format!(
                "fee for {} must be within [0, 100], got {}",
                self.pair_symbol(),
                self.fee
            )));
        }
        Ok(())
    }

    pub fn convert(&self, amount: Decimal) -> Result<Decimal, FxError> {
        let overflow = || {
            FxError::ConversionOverflow(format!("{} at {}", amount, self.pair_symbol()))
        };
        let fee = amount.checked_mul(self.fee).ok_or_else(overflow)? / dec!(100);
        amount
            .checked_sub(fee)
            .and_then(|net| net.checked_mul(self.rate))
            .ok_or_else(overflow)
    }

    /// Serves the opposite direction with `1 / rate`.
    ///
    /// The fee is carried over unchanged, which only approximates a true inverse.
    pub fn inverted(&self) -> Self {
        ExchangeRate {
            from_currency: self.to_currency.clone(),
            to_currency: self.from_currency.clone(),
            rate: Decimal::ONE / self.rate,
            fee: self.fee,
            date: self.date,
        }
    }

    /// Returns format: "GBP/USD"
    pub fn pair_symbol(&self) -> String {
        Self::make_pair_symbol(&self.from_currency, &self.to_currency)
    }

    pub fn make_pair_symbol(from: &str, to: &str) -> String {
        format!("{}/{}", from, to)
    }
}

fn serialize_decimal_6<S>(decimal: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let rounded = decimal.round_dp(RATE_DECIMAL_PRECISION);
    serializer.serialize_str(&rounded.to_string())
}

/// Input model for registering a new exchange rate.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewExchangeRate {
    pub from_currency: String,
    pub to_currency: String,
    pub rate: Decimal,
    #[serde(default)]
    pub fee: Decimal,
    pub date: NaiveDate,
}

impl TryFrom<NewExchangeRate> for ExchangeRate {
    type Error = FxError;

    fn try_from(new_rate: NewExchangeRate) -> Result<Self, Self::Error> {
        ExchangeRate::new(
            &new_rate.from_currency,
            &new_rate.to_currency,
            new_rate.rate,
            new_rate.fee,
            new_rate.date,
        )
    }
}
