//! Donatrack Core - donation ledger, currency conversion and reporting.
//!
//! Donations arrive already parsed (donor, charity, UTC timestamp, amount and
//! currency). The [`donations::Ledger`] converts each one into the reporting
//! currency through the [`fx`] resolver and keeps running totals; the
//! [`donations::WindowQuery`] answers trailing-window questions from the raw
//! history. Everything is held in memory.

pub mod constants;
pub mod donations;
pub mod errors;
pub mod fx;
pub mod settings;

// Re-export common types
pub use donations::{DonationService, DonationServiceTrait, Ledger, WindowQuery};
pub use fx::{FxService, FxServiceTrait};
pub use settings::EngineSettings;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
