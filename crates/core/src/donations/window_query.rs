use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::donations_model::{Donation, HighestGrossingCharity};
use crate::constants::{DEFAULT_RECENT_DONATIONS_LIMIT, DEFAULT_WINDOW_HOURS};

/// Read-only aggregation over a donation history.
///
/// Works from the raw history rather than the ledger's running totals, since
/// those cover every donation ever recorded.
pub struct WindowQuery<'a> {
    donations: &'a [Donation],
}

impl<'a> WindowQuery<'a> {
    pub fn new(donations: &'a [Donation]) -> Self {
        WindowQuery { donations }
    }

    /// Highest-grossing charity over `[end - 24h, end]` with its 5 most recent
    /// donations in that window.
    pub fn highest_charity_in_last_24h(&self, end: DateTime<Utc>) -> HighestGrossingCharity {
        self.highest_charity_in_window(
            end,
            Duration::hours(DEFAULT_WINDOW_HOURS),
            DEFAULT_RECENT_DONATIONS_LIMIT,
        )
    }

    /// Aggregates donations with `end - window <= timestamp <= end` per charity.
    ///
    /// The leader is the charity with the largest total; on an exact tie the
    /// lexicographically smallest name wins. Its qualifying donations are sorted
    /// by timestamp (insertion order for equal timestamps) and the last `limit`
    /// are returned, oldest first.
    pub fn highest_charity_in_window(
        &self,
        end: DateTime<Utc>,
        window: Duration,
        limit: usize,
    ) -> HighestGrossingCharity {
        let Some(start) = end.checked_sub_signed(window) else {
            return HighestGrossingCharity::empty();
        };
        let in_window = |d: &&Donation| start <= d.timestamp && d.timestamp <= end;

        let mut totals: BTreeMap<&str, Decimal> = BTreeMap::new();
        for donation in self.donations.iter().filter(in_window) {
            let Some(amount) = donation.amount_in_reporting_currency() else {
                continue;
            };
            let total = totals.entry(donation.charity.as_str()).or_default();
            *total = total.saturating_add(amount);
        }

        let mut leader: Option<(&str, Decimal)> = None;
        for (charity, total) in totals {
            if leader.map_or(true, |(_, best)| total > best) {
                leader = Some((charity, total));
            }
        }

        let Some((charity, total)) = leader else {
            return HighestGrossingCharity::empty();
        };

        let mut qualifying: Vec<&Donation> = self
            .donations
            .iter()
            .filter(in_window)
            .filter(|d| d.charity == charity && d.is_resolved())
            .collect();
        qualifying.sort_by_key(|d| d.timestamp);
        let skip = qualifying.len().saturating_sub(limit);

        HighestGrossingCharity {
            charity: Some(charity.to_string()),
            total,
            donations: qualifying.into_iter().skip(skip).cloned().collect(),
        }
    }
}
