use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use super::fx_errors::FxError;
use super::fx_model::ExchangeRate;
use super::rate_table::RateTable;

/// How a conversion between two currencies was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolutionMethod {
    /// Source and target are the same currency.
    Identity,
    /// A rate stored for exactly (date, source, target).
    Direct,
    /// A rate stored for exactly (date, target, source), inverted.
    Inverse,
    /// The closest-date rate stored for (source, target).
    NearestDate,
    /// The closest-date rate stored for (target, source), inverted.
    NearestDateInverse,
    /// Two or more rates composed through intermediate currencies.
    Transitive,
}

/// The chain of rates used to convert between two currencies.
///
/// An identity path has no hops.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatePath {
    pub method: ResolutionMethod,
    pub hops: Vec<ExchangeRate>,
}

impl RatePath {
    fn single(method: ResolutionMethod, rate: ExchangeRate) -> Self {
        RatePath {
            method,
            hops: vec![rate],
        }
    }

    /// Applies every hop in order, fee then rate, to the running amount.
    pub fn convert(&self, amount: Decimal) -> Result<Decimal, FxError> {
        self.hops.iter().try_fold(amount, |acc, hop| hop.convert(acc))
    }

    /// Product of the hop rates, ignoring fees. `None` if the product overflows.
    pub fn effective_rate(&self) -> Option<Decimal> {
        self.hops
            .iter()
            .try_fold(Decimal::ONE, |acc, hop| acc.checked_mul(hop.rate))
    }

    /// Sum of the hop fee percentages.
    pub fn total_fee(&self) -> Decimal {
        self.hops.iter().map(|hop| hop.fee).sum()
    }
}

/// Partial route kept per currency during the path search.
#[derive(Clone)]
struct Route {
    fee: Decimal,
    hops: Vec<ExchangeRate>,
}

/// Resolves conversions against a [`RateTable`].
///
/// Resolution order, first success wins:
/// 1. identity
/// 2. direct rate on the date
/// 3. inverse rate on the date
/// 4. closest-date rate in the stored direction
/// 5. breadth-first search over the currency graph, where every stored pair is
///    an edge in both directions, priced at the date or the nearest date
pub struct CurrencyConverter<'a> {
    table: &'a RateTable,
}

impl<'a> CurrencyConverter<'a> {
    pub fn new(table: &'a RateTable) -> Self {
        CurrencyConverter { table }
    }

    pub fn resolve(
        &self,
        from_currency: &str,
        to_currency: &str,
        date: NaiveDate,
    ) -> Result<RatePath, FxError> {
        if from_currency == to_currency {
            return Ok(RatePath {
                method: ResolutionMethod::Identity,
                hops: Vec::new(),
            });
        }

        if let Some(rate) = self.table.lookup_exact(from_currency, to_currency, date) {
            return Ok(RatePath::single(ResolutionMethod::Direct, rate.clone()));
        }

        if let Some(rate) = self.table.lookup_exact(to_currency, from_currency, date) {
            return Ok(RatePath::single(ResolutionMethod::Inverse, rate.inverted()));
        }

        if let Some(rate) = self.table.lookup_nearest(from_currency, to_currency, date) {
            log::warn!(
                "No {}/{} rate on {}. Using nearest rate from {}",
                from_currency,
                to_currency,
                date,
                rate.date
            );
            return Ok(RatePath::single(ResolutionMethod::NearestDate, rate.clone()));
        }

        match self.find_path(from_currency, to_currency, date) {
            Some(hops) => {
                let method = if hops.len() == 1 {
                    ResolutionMethod::NearestDateInverse
                } else {
                    ResolutionMethod::Transitive
                };
                log::debug!(
                    "Resolved {}/{} on {} via {:?} over {} hop(s)",
                    from_currency,
                    to_currency,
                    date,
                    method,
                    hops.len()
                );
                Ok(RatePath { method, hops })
            }
            None => Err(FxError::conversion_failure(from_currency, to_currency, date)),
        }
    }

    pub fn convert_amount(
        &self,
        amount: Decimal,
        from_currency: &str,
        to_currency: &str,
        date: NaiveDate,
    ) -> Result<Decimal, FxError> {
        let path = self.resolve(from_currency, to_currency, date)?;
        path.convert(amount)
    }

    /// Prices one graph edge. Exact-date rates beat nearest-date ones and the
    /// stored direction beats the inverse when both are equally close.
    fn edge_rate(&self, from: &str, to: &str, date: NaiveDate) -> Option<ExchangeRate> {
        if let Some(rate) = self.table.lookup_exact(from, to, date) {
            return Some(rate.clone());
        }
        if let Some(rate) = self.table.lookup_exact(to, from, date) {
            return Some(rate.inverted());
        }

        let distance = |rate: &ExchangeRate| (rate.date - date).num_days().abs();
        match (
            self.table.lookup_nearest(from, to, date),
            self.table.lookup_nearest(to, from, date),
        ) {
            (Some(direct), Some(inverse)) => {
                if distance(direct) <= distance(inverse) {
                    Some(direct.clone())
                } else {
                    Some(inverse.inverted())
                }
            }
            (Some(direct), None) => Some(direct.clone()),
            (None, Some(inverse)) => Some(inverse.inverted()),
            (None, None) => None,
        }
    }

    /// Level-by-level BFS. Among the routes of the fewest hops the one with the
    /// smallest fee sum wins; remaining ties go to the route found first while
    /// walking currencies in code order.
    fn find_path(&self, from: &str, to: &str, date: NaiveDate) -> Option<Vec<ExchangeRate>> {
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(from.to_string());

        let mut frontier: BTreeMap<String, Route> = BTreeMap::new();
        frontier.insert(
            from.to_string(),
            Route {
                fee: Decimal::ZERO,
                hops: Vec::new(),
            },
        );

        while !frontier.is_empty() {
            if let Some(route) = frontier.remove(to) {
                return Some(route.hops);
            }

            let mut next: BTreeMap<String, Route> = BTreeMap::new();
            for (currency, route) in &frontier {
                for neighbor in self.table.neighbors(currency) {
                    if visited.contains(neighbor) {
                        continue;
                    }
                    let Some(edge) = self.edge_rate(currency, neighbor, date) else {
                        continue;
                    };

                    let fee = route.fee + edge.fee;
                    let improves = next
                        .get(neighbor)
                        .map(|existing| fee < existing.fee)
                        .unwrap_or(true);
                    if improves {
                        let mut hops = route.hops.clone();
                        hops.push(edge);
                        next.insert(neighbor.to_string(), Route { fee, hops });
                    }
                }
            }

            visited.extend(next.keys().cloned());
            frontier = next;
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn table_with(rates: &[(&str, &str, Decimal, Decimal, NaiveDate)]) -> RateTable {
        let mut table = RateTable::new();
        for (from, to, rate, fee, date) in rates {
            table
                .put(ExchangeRate::new(from, to, *rate, *fee, *date).unwrap())
                .unwrap();
        }
        table
    }

    fn standard_table() -> RateTable {
        let d = day(2023, 1, 21);
        table_with(&[
            ("GBP", "USD", dec!(1.22), dec!(0.5), d),
            ("GBP", "EUR", dec!(1.18), dec!(0.3), d),
            ("USD", "EUR", dec!(0.92), dec!(0.4), d),
        ])
    }

    #[test]
    fn test_identity_returns_amount_unchanged() {
        let table = RateTable::new();
        let converter = CurrencyConverter::new(&table);
        let path = converter.resolve("EUR", "EUR", day(2023, 1, 21)).unwrap();

        assert_eq!(path.method, ResolutionMethod::Identity);
        assert!(path.hops.is_empty());
        assert_eq!(path.effective_rate(), Some(Decimal::ONE));
        assert_eq!(
            converter
                .convert_amount(dec!(100), "EUR", "EUR", day(2023, 1, 21))
                .unwrap(),
            dec!(100)
        );
    }

    #[test]
    fn test_direct_rate() {
        let table = standard_table();
        let converter = CurrencyConverter::new(&table);

        let path = converter.resolve("GBP", "USD", day(2023, 1, 21)).unwrap();
        assert_eq!(path.method, ResolutionMethod::Direct);
        assert_eq!(path.hops[0].rate, dec!(1.22));
        assert_eq!(path.hops[0].fee, dec!(0.5));

        let amount = converter
            .convert_amount(dec!(100), "GBP", "EUR", day(2023, 1, 21))
            .unwrap();
        assert_eq!(amount.round_dp(2), dec!(117.65));
    }

    #[test]
    fn test_inverse_rate_keeps_fee() {
        let table = standard_table();
        let converter = CurrencyConverter::new(&table);

        let path = converter.resolve("USD", "GBP", day(2023, 1, 21)).unwrap();
        assert_eq!(path.method, ResolutionMethod::Inverse);
        let rate = &path.hops[0];
        assert_eq!(rate.from_currency, "USD");
        assert_eq!(rate.to_currency, "GBP");
        assert!(rate.rate > dec!(0.81) && rate.rate < dec!(0.83));
        assert_eq!(rate.fee, dec!(0.5));
    }

    #[test]
    fn test_nearest_date_in_stored_direction() {
        let mut table = standard_table();
        table
            .put(ExchangeRate::new("GBP", "USD", dec!(1.25), dec!(0.5), day(2023, 1, 22)).unwrap())
            .unwrap();
        let converter = CurrencyConverter::new(&table);

        let path = converter.resolve("GBP", "USD", day(2023, 1, 23)).unwrap();
        assert_eq!(path.method, ResolutionMethod::NearestDate);
        assert_eq!(path.hops[0].rate, dec!(1.25));
    }

    #[test]
    fn test_inverse_only_history_resolves_through_graph() {
        let table = table_with(&[("EUR", "GBP", dec!(0.8), dec!(0), day(2023, 1, 20))]);
        let converter = CurrencyConverter::new(&table);

        let path = converter.resolve("GBP", "EUR", day(2023, 1, 23)).unwrap();
        assert_eq!(path.method, ResolutionMethod::NearestDateInverse);
        assert_eq!(path.hops.len(), 1);
        assert_eq!(path.hops[0].rate, dec!(1.25));
        assert_eq!(path.convert(dec!(8)).unwrap(), dec!(10));
    }

    #[test]
    fn test_two_hop_conversion() {
        let d = day(2023, 1, 21);
        let table = table_with(&[
            ("GBP", "USD", dec!(1.22), dec!(0.5), d),
            ("USD", "EUR", dec!(0.92), dec!(0.4), d),
        ]);
        let converter = CurrencyConverter::new(&table);

        // 100 GBP - 0.5% = 99.5 * 1.22 = 121.39 USD
        // 121.39 USD - 0.4% = 120.90444 * 0.92 = 111.2320848 EUR
        let path = converter.resolve("GBP", "EUR", d).unwrap();
        assert_eq!(path.method, ResolutionMethod::Transitive);
        assert_eq!(path.convert(dec!(100)).unwrap(), dec!(111.2320848));
        assert_eq!(path.total_fee(), dec!(0.9));
    }

    #[test]
    fn test_path_may_walk_stored_rates_backwards() {
        let d = day(2023, 1, 20);
        let table = table_with(&[
            ("GBP", "USD", dec!(1.26), dec!(0.5), d),
            ("GBP", "EUR", dec!(1.17), dec!(0.3), d),
        ]);
        let converter = CurrencyConverter::new(&table);

        let path = converter.resolve("USD", "EUR", d).unwrap();
        assert_eq!(path.method, ResolutionMethod::Transitive);
        assert_eq!(path.hops[0].from_currency, "USD");
        assert_eq!(path.hops[0].to_currency, "GBP");
        let amount = path.convert(dec!(10)).unwrap();
        assert!(amount > dec!(9.21) && amount < dec!(9.22));
    }

    #[test]
    fn test_prefers_fewest_hops() {
        let d = day(2023, 1, 21);
        let table = table_with(&[
            ("JPY", "CHF", dec!(0.0065), dec!(0), d),
            ("CHF", "GBP", dec!(0.9), dec!(0), d),
            ("GBP", "EUR", dec!(1.15), dec!(0), d),
            ("JPY", "USD", dec!(0.0068), dec!(2), d),
            ("USD", "EUR", dec!(0.92), dec!(2), d),
        ]);
        let converter = CurrencyConverter::new(&table);

        let path = converter.resolve("JPY", "EUR", d).unwrap();
        assert_eq!(path.hops.len(), 2);
        assert_eq!(path.hops[0].to_currency, "USD");
    }

    #[test]
    fn test_equal_hops_prefers_lower_total_fee() {
        let d = day(2023, 1, 21);
        let table = table_with(&[
            ("USD", "CHF", dec!(0.9), dec!(1), d),
            ("CHF", "EUR", dec!(1.02), dec!(1), d),
            ("USD", "GBP", dec!(0.8), dec!(0.1), d),
            ("GBP", "EUR", dec!(1.15), dec!(0.1), d),
        ]);
        let converter = CurrencyConverter::new(&table);

        let path = converter.resolve("USD", "EUR", d).unwrap();
        assert_eq!(path.hops.len(), 2);
        assert_eq!(path.hops[0].to_currency, "GBP");
        assert_eq!(path.total_fee(), dec!(0.2));
    }

    #[test]
    fn test_graph_edges_use_nearest_dates() {
        let table = table_with(&[
            ("GBP", "USD", dec!(1.26), dec!(0), day(2023, 1, 20)),
            ("USD", "EUR", dec!(0.92), dec!(0), day(2023, 1, 25)),
        ]);
        let converter = CurrencyConverter::new(&table);

        let path = converter.resolve("GBP", "EUR", day(2023, 1, 22)).unwrap();
        assert_eq!(path.hops.len(), 2);
        assert_eq!(path.hops[0].date, day(2023, 1, 20));
        assert_eq!(path.hops[1].date, day(2023, 1, 25));
        assert_eq!(path.effective_rate(), Some(dec!(1.1592)));
    }

    #[test]
    fn test_missing_rate_is_a_conversion_failure() {
        let table = standard_table();
        let converter = CurrencyConverter::new(&table);

        let err = converter
            .convert_amount(dec!(100), "JPY", "EUR", day(2023, 1, 21))
            .unwrap_err();
        assert_eq!(
            err,
            FxError::ConversionFailure {
                from: "JPY".to_string(),
                to: "EUR".to_string(),
                date: day(2023, 1, 21),
            }
        );
    }
}
