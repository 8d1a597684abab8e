/// Currency every total is reported in unless configured otherwise
pub const DEFAULT_REPORTING_CURRENCY: &str = "EUR";

/// Currency assigned to bare amounts that carry no symbol or code
pub const DEFAULT_INPUT_CURRENCY: &str = "USD";

/// Length of the trailing window used by the highest-grossing charity query
pub const DEFAULT_WINDOW_HOURS: i64 = 24;

/// Number of most recent donations returned with the leading charity
pub const DEFAULT_RECENT_DONATIONS_LIMIT: usize = 5;

/// Decimal precision used when serializing exchange rates
pub const RATE_DECIMAL_PRECISION: u32 = 6;

/// Decimal precision for display
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;
