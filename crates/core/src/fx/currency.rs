//! Currency codes, monetary values and raw amount parsing.
//!
//! Parsing lives here because it is the last stop before a donation reaches the
//! ledger: a malformed amount must be rejected with
//! [`ValidationError::InvalidAmountFormat`] rather than recorded as zero.

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use super::fx_errors::FxError;
use crate::errors::ValidationError;

/// A decimal amount tagged with its ISO-4217-like currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub amount: Decimal,
    pub currency: String,
}

impl Money {
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

static CURRENCY_SYMBOLS: OnceLock<HashMap<char, &'static str>> = OnceLock::new();

fn get_symbols() -> &'static HashMap<char, &'static str> {
    CURRENCY_SYMBOLS.get_or_init(|| {
        let mut map = HashMap::new();
        map.insert('$', "USD");
        map.insert('£', "GBP");
        map.insert('€', "EUR");
        map.insert('¥', "JPY");
        map
    })
}

/// Returns the currency code for a leading currency symbol, if known.
pub fn currency_for_symbol(symbol: char) -> Option<&'static str> {
    get_symbols().get(&symbol).copied()
}

/// Validates and upper-cases a three letter currency code.
pub fn normalize_currency_code(code: &str) -> Result<String, FxError> {
    let trimmed = code.trim();
    if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(FxError::InvalidCurrencyCode(code.to_string()));
    }
    Ok(trimmed.to_ascii_uppercase())
}

struct AmountPatterns {
    symbol_prefixed: Regex,
    code_suffixed: Regex,
    code_prefixed: Regex,
    bare: Regex,
}

static AMOUNT_PATTERNS: OnceLock<AmountPatterns> = OnceLock::new();

fn get_patterns() -> &'static AmountPatterns {
    AMOUNT_PATTERNS.get_or_init(|| AmountPatterns {
        // "£15", "$10.50"
        symbol_prefixed: Regex::new(r"^(\D)\s*(\d+(?:\.\d+)?)$").expect("Invalid regex pattern"),
        // "15 GBP"
        code_suffixed: Regex::new(r"^(\d+(?:\.\d+)?)\s*([A-Za-z]{3})$")
            .expect("Invalid regex pattern"),
        // "GBP 15"
        code_prefixed: Regex::new(r"^([A-Za-z]{3})\s*(\d+(?:\.\d+)?)$")
            .expect("Invalid regex pattern"),
        bare: Regex::new(r"^\d+(?:\.\d+)?$").expect("Invalid regex pattern"),
    })
}

/// Parses a raw amount string into [`Money`].
///
/// Accepted forms are a known currency symbol followed by a number (`£15`),
/// a number followed or preceded by a currency code (`15 GBP`, `GBP 15`) and a
/// bare number, which is assigned `default_currency`.
pub fn parse_money(raw: &str, default_currency: &str) -> Result<Money, ValidationError> {
    let input = raw.trim();
    let patterns = get_patterns();
    let invalid = || ValidationError::InvalidAmountFormat(raw.to_string());

    let (number, currency) = if let Some(caps) = patterns.symbol_prefixed.captures(input) {
        let symbol = caps[1].chars().next().ok_or_else(invalid)?;
        let code = currency_for_symbol(symbol).ok_or_else(invalid)?;
        (caps[2].to_string(), code.to_string())
    } else if let Some(caps) = patterns.code_suffixed.captures(input) {
        (caps[1].to_string(), caps[2].to_ascii_uppercase())
    } else if let Some(caps) = patterns.code_prefixed.captures(input) {
        (caps[2].to_string(), caps[1].to_ascii_uppercase())
    } else if patterns.bare.is_match(input) {
        let code = normalize_currency_code(default_currency)
            .map_err(|e| ValidationError::InvalidInput(e.to_string()))?;
        (input.to_string(), code)
    } else {
        return Err(invalid());
    };

    let amount = Decimal::from_str(&number)?;
    Ok(Money::new(amount, currency))
}
