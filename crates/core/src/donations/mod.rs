//! Donations module - ledger, trailing-window reporting, services and traits.

mod donations_errors;
mod donations_model;
mod donations_service;
mod donations_traits;
pub mod ledger;
pub mod window_query;


pub use donations_errors::DonationError;
pub use donations_model::{
    Charity, Donation, Donor, HighestGrossingCharity, NewDonation, RunningTotals,
};
pub use donations_service::DonationService;
pub use donations_traits::DonationServiceTrait;
pub use ledger::Ledger;
pub use window_query::WindowQuery;
