use crate::domain::model::{
    CarrierQuote, CreateShipment, LabelPayload, Notice, QuoteTable, Shipment, ShipmentCreated,
    ShipmentRequest, TrackingQuery, WindowFeatures,
};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Server-side shipping methods plus document reads.
#[async_trait]
pub trait ShippingRpc: Send + Sync {
    async fn fetch_shipping_rates(&self, request: &ShipmentRequest) -> Result<Vec<CarrierQuote>>;
    async fn create_shipment(&self, order: &CreateShipment) -> Result<ShipmentCreated>;
    async fn print_shipping_label(
        &self,
        shipment_id: &str,
        service_provider: &str,
    ) -> Result<Option<LabelPayload>>;
    async fn show_tracking(&self, query: &TrackingQuery) -> Result<Option<String>>;
    async fn get_shipment(&self, name: &str) -> Result<Shipment>;
}

/// What the form can do to the user: messages, dialogs and windows.
#[async_trait]
pub trait FormHost: Send + Sync {
    async fn notify(&self, notice: Notice);

    /// Shows the quote dialog and returns the chosen row, or `None` when
    /// the dialog is dismissed.
    async fn choose_quote(&self, table: &QuoteTable) -> Option<usize>;

    async fn open_url(&self, url: &str, window: Option<&WindowFeatures>) -> Result<()>;

    async fn open_pdf(&self, file_name: &str, data: &[u8]) -> Result<()>;
}
