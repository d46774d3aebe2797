pub mod form;
pub mod label;
pub mod quote_selector;
pub mod tracking;

pub use crate::domain::model::{
    CarrierQuote, CreateShipment, FormAction, Indicator, LabelPayload, Notice, QuoteRow,
    QuoteTable, Shipment, ShipmentCreated, ShipmentRequest, TrackingQuery, WindowFeatures,
};
pub use crate::domain::ports::{FormHost, ShippingRpc, Storage};
pub use crate::utils::error::Result;
