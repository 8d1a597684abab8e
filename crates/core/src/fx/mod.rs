//! FX (Foreign Exchange) module - rate storage, conversion path resolution and services.

pub mod currency;
pub mod currency_converter;
mod fx_errors;
mod fx_model;
mod fx_service;
mod fx_traits;
pub mod rate_table;

pub use currency::{currency_for_symbol, normalize_currency_code, parse_money, Money};
pub use currency_converter::{CurrencyConverter, RatePath, ResolutionMethod};
pub use fx_errors::FxError;
pub use fx_model::{ExchangeRate, NewExchangeRate};
pub use fx_service::FxService;
pub use fx_traits::FxServiceTrait;
pub use rate_table::RateTable;
