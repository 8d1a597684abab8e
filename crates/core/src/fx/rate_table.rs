use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::fx_errors::FxError;
use super::fx_model::ExchangeRate;

/// Exchange rates keyed by (source, target) and effective date.
///
/// Each stored direction is its own time series; the inverse direction is not
/// materialized. The adjacency list links both directions so a path search can
/// walk a stored rate either way.
#[derive(Debug, Default, Clone)]
pub struct RateTable {
    /// Key: (From_Currency, To_Currency)
    /// Value: BTreeMap<Date, Rate> for O(log N) date lookups.
    rates: HashMap<(String, String), BTreeMap<NaiveDate, ExchangeRate>>,

    /// Currency -> currencies it shares at least one stored rate with.
    adj: BTreeMap<String, BTreeSet<String>>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a rate, replacing any rate already stored for the same
    /// (date, source, target). Returns the replaced rate.
    pub fn put(&mut self, rate: ExchangeRate) -> Result<Option<ExchangeRate>, FxError> {
        rate.validate()?;
        if rate.from_currency == rate.to_currency {
            return Err(FxError::InvalidRate(format!(
                "cannot store a rate from {} to itself",
                rate.from_currency
            )));
        }

        self.adj
            .entry(rate.from_currency.clone())
            .or_default()
            .insert(rate.to_currency.clone());
        self.adj
            .entry(rate.to_currency.clone())
            .or_default()
            .insert(rate.from_currency.clone());

        let key = (rate.from_currency.clone(), rate.to_currency.clone());
        let previous = self.rates.entry(key).or_default().insert(rate.date, rate);
        Ok(previous)
    }

    pub fn lookup_exact(&self, from: &str, to: &str, date: NaiveDate) -> Option<&ExchangeRate> {
        self.history(from, to)?.get(&date)
    }

    /// Finds the stored (from, to) rate whose date is closest to `date`.
    ///
    /// Only the stored direction is searched. When a past and a future rate are
    /// equally far away the earlier one wins.
    pub fn lookup_nearest(&self, from: &str, to: &str, date: NaiveDate) -> Option<&ExchangeRate> {
        let history = self.history(from, to)?;

        // Closest rate on or before the date
        let prev = history.range(..=date).next_back();
        // Closest rate on or after the date
        let next = history.range(date..).next();

        match (prev, next) {
            (Some((d1, r1)), Some((d2, r2))) => {
                if d1 == d2 {
                    return Some(r1);
                }
                let dist_prev = (date - *d1).num_days().abs();
                let dist_next = (*d2 - date).num_days().abs();
                if dist_prev <= dist_next {
                    Some(r1)
                } else {
                    Some(r2)
                }
            }
            (Some((_, r)), None) => Some(r),
            (None, Some((_, r))) => Some(r),
            (None, None) => None,
        }
    }

    /// Currencies connected to `currency` by a stored rate in either direction,
    /// in code order.
    pub fn neighbors<'a>(&'a self, currency: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.adj
            .get(currency)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Number of stored rates across all pairs and dates.
    pub fn len(&self) -> usize {
        self.rates.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    fn history(&self, from: &str, to: &str) -> Option<&BTreeMap<NaiveDate, ExchangeRate>> {
        self.rates.get(&(from.to_string(), to.to_string()))
    }
}
