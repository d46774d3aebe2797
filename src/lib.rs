pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{ConsoleHost, HttpShippingRpc, LocalStorage};
pub use config::DeskConfig;
pub use crate::core::{form::ShipmentForm, quote_selector::QuoteDialog, tracking::TrackingLink};
pub use utils::error::{Result, ShipmentError};
