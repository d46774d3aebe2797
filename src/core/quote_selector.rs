use crate::core::{CarrierQuote, CreateShipment, QuoteRow, QuoteTable, ShipmentRequest};
use crate::utils::error::{Result, ShipmentError};
use crate::utils::format::CurrencyFormat;

pub const DIALOG_TITLE: &str = "Select Service to Create Shipment";
pub const HEADERS: [&str; 5] = [
    "Service Provider",
    "Parcel Service",
    "Parcel Service Type",
    "Price",
    "",
];

/// View model of the service selection dialog. It owns the quotes in the
/// order they were received; row `i` of the rendered table is quote `i`.
/// Selecting consumes the dialog, so one dialog yields at most one order.
#[derive(Debug, Clone)]
pub struct QuoteDialog {
    shipment: String,
    request: ShipmentRequest,
    quotes: Vec<CarrierQuote>,
    delivery_notes: Vec<String>,
}

impl QuoteDialog {
    /// Returns `None` for an empty quote list; there is nothing to choose.
    pub fn open(
        shipment: impl Into<String>,
        request: ShipmentRequest,
        quotes: Vec<CarrierQuote>,
        delivery_notes: Vec<String>,
    ) -> Option<Self> {
        if quotes.is_empty() {
            return None;
        }
        Some(Self {
            shipment: shipment.into(),
            request,
            quotes,
            delivery_notes,
        })
    }

    pub fn shipment(&self) -> &str {
        &self.shipment
    }

    /// Number of selectable rows. Never zero.
    pub fn service_count(&self) -> usize {
        self.quotes.len()
    }

    pub fn render(&self, currency: &CurrencyFormat) -> QuoteTable {
        let rows = self
            .quotes
            .iter()
            .enumerate()
            .map(|(index, quote)| QuoteRow {
                index,
                service_provider: quote.service_provider.clone(),
                carrier_name: quote.carrier_name.clone(),
                service_name: quote.service_name.clone(),
                price: currency.format(quote.total_price),
            })
            .collect();

        QuoteTable {
            title: DIALOG_TITLE.to_string(),
            headers: HEADERS,
            rows,
        }
    }

    pub fn select(self, row: usize) -> Result<CreateShipment> {
        let available = self.quotes.len();
        let service_data = self
            .quotes
            .into_iter()
            .nth(row)
            .ok_or(ShipmentError::InvalidSelection {
                index: row,
                available,
            })?;

        tracing::debug!(
            "Selected row {} of {}: {} / {}",
            row,
            available,
            service_data.carrier_name,
            service_data.service_name
        );

        Ok(CreateShipment {
            shipment: self.shipment,
            request: self.request,
            service_data,
            delivery_notes: self.delivery_notes,
        })
    }
}
