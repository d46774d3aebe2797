use crate::core::quote_selector::QuoteDialog;
use crate::core::tracking::TrackingLink;
use crate::core::{
    FormAction, FormHost, Indicator, LabelPayload, Notice, Shipment, ShipmentCreated,
    ShipmentRequest, ShippingRpc, TrackingQuery,
};
use crate::utils::error::{Result, ShipmentError};
use crate::utils::format::CurrencyFormat;
use crate::utils::validation::Validate;
use url::Url;

impl Validate for ShipmentRequest {
    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("Pickup address", &self.pickup_address_name),
            ("Delivery address", &self.delivery_address_name),
        ] {
            if value.trim().is_empty() {
                return Err(ShipmentError::ValidationError {
                    message: format!("{} is required", field),
                });
            }
        }
        if self.shipment_parcel.is_empty() {
            return Err(ShipmentError::ValidationError {
                message: "Shipment has no parcels".to_string(),
            });
        }
        Ok(())
    }
}

/// File name for a saved PDF label. The id comes from the server, so it
/// must not name anything outside the label directory.
fn label_file_name(shipment_id: &str) -> Result<String> {
    if shipment_id.contains(['/', '\\']) || shipment_id.contains("..") {
        return Err(ShipmentError::unexpected(
            "print_shipping_label",
            format!("shipment id '{}' is not a valid file name", shipment_id),
        ));
    }
    Ok(format!("{}.pdf", shipment_id))
}

/// Outcome of a label request, by display branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelDisplay {
    Binary { file_name: String, bytes: usize },
    Single(String),
    Multiple(Vec<String>),
}

/// Controller for one Shipment form. Holds the current document snapshot
/// and drives the rate, creation, label and tracking calls.
pub struct ShipmentForm<R: ShippingRpc, H: FormHost> {
    rpc: R,
    host: H,
    doc: Shipment,
    tracking: TrackingLink,
    currency: CurrencyFormat,
}

impl<R: ShippingRpc, H: FormHost> ShipmentForm<R, H> {
    pub fn new(rpc: R, host: H, doc: Shipment) -> Self {
        Self {
            rpc,
            host,
            doc,
            tracking: TrackingLink::default(),
            currency: CurrencyFormat::default(),
        }
    }

    pub fn with_tracking(mut self, tracking: TrackingLink) -> Self {
        self.tracking = tracking;
        self
    }

    pub fn with_currency(mut self, currency: CurrencyFormat) -> Self {
        self.currency = currency;
        self
    }

    pub fn doc(&self) -> &Shipment {
        &self.doc
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Actions offered for the current document state.
    pub fn refresh(&self) -> Vec<FormAction> {
        let mut actions = Vec::new();
        match self.doc.created_id() {
            None => {
                if self.doc.is_submitted() {
                    actions.push(FormAction::FetchShippingRates);
                }
            }
            Some(_) => {
                actions.push(FormAction::PrintShippingLabel);
                if !self.doc.is_delivered() {
                    actions.push(FormAction::TrackStatus);
                }
            }
        }
        actions
    }

    /// Runs an action the way its button would. Actions not offered by
    /// `refresh` fail without contacting the server.
    pub async fn trigger(&mut self, action: FormAction) -> Result<()> {
        if !self.refresh().contains(&action) {
            let err = self.unavailable(action);
            self.report(&err).await;
            return Err(err);
        }

        match action {
            FormAction::FetchShippingRates => {
                self.run_shipping_workflow().await?;
            }
            FormAction::PrintShippingLabel => {
                self.print_shipping_label().await?;
            }
            FormAction::TrackStatus => {
                self.show_tracking().await?;
            }
        }
        Ok(())
    }

    fn unavailable(&self, action: FormAction) -> ShipmentError {
        if let Some(id) = self.doc.created_id() {
            return match action {
                FormAction::FetchShippingRates => self.already_created(id),
                _ => ShipmentError::ActionUnavailable {
                    action: action.label().to_string(),
                    shipment: self.doc.name.clone(),
                    reason: "shipment is already delivered".to_string(),
                },
            };
        }
        match action {
            FormAction::FetchShippingRates => ShipmentError::ActionUnavailable {
                action: action.label().to_string(),
                shipment: self.doc.name.clone(),
                reason: "shipment is not submitted".to_string(),
            },
            _ => self.not_created(),
        }
    }

    fn already_created(&self, shipment_id: &str) -> ShipmentError {
        ShipmentError::ShipmentAlreadyCreated {
            shipment: self.doc.name.clone(),
            shipment_id: shipment_id.to_string(),
        }
    }

    fn not_created(&self) -> ShipmentError {
        ShipmentError::ShipmentNotCreated {
            shipment: self.doc.name.clone(),
        }
    }

    async fn report(&self, err: &ShipmentError) {
        tracing::error!("❌ {} (Category: {:?})", err, err.category());
        self.host
            .notify(Notice::failure(err.user_friendly_message()))
            .await;
    }

    async fn precheck_not_created(&self) -> Result<()> {
        if let Some(id) = self.doc.created_id() {
            let err = self.already_created(id);
            self.report(&err).await;
            return Err(err);
        }
        Ok(())
    }

    /// Requests rates for the current document. Returns the selection
    /// dialog, or `None` after telling the user no service is available.
    pub async fn fetch_shipping_rates(&self) -> Result<Option<QuoteDialog>> {
        self.precheck_not_created().await?;

        let request = ShipmentRequest::from_shipment(&self.doc);
        if let Err(err) = request.validate() {
            self.report(&err).await;
            return Err(err);
        }

        tracing::info!("Fetching Shipping Rates for {}", self.doc.name);
        let quotes = match self.rpc.fetch_shipping_rates(&request).await {
            Ok(quotes) => quotes,
            Err(err) => {
                self.report(&err).await;
                return Err(err);
            }
        };
        match QuoteDialog::open(
            self.doc.name.clone(),
            request,
            quotes,
            self.doc.delivery_notes(),
        ) {
            Some(dialog) => {
                tracing::info!("Received {} shipping services", dialog.service_count());
                Ok(Some(dialog))
            }
            None => {
                self.host.notify(Notice::no_services()).await;
                Ok(None)
            }
        }
    }

    /// Creates the shipment for the chosen row. The dialog is consumed
    /// whether or not creation succeeds.
    pub async fn select_service(&mut self, dialog: QuoteDialog, row: usize) -> Result<ShipmentCreated> {
        self.precheck_not_created().await?;
        let order = match dialog.select(row) {
            Ok(order) => order,
            Err(err) => {
                self.report(&err).await;
                return Err(err);
            }
        };

        tracing::info!(
            "Creating Shipment {} with {} ({})",
            order.shipment,
            order.service_data.service_provider,
            order.service_data.service_name
        );
        let created = match self.rpc.create_shipment(&order).await {
            Ok(created) => created,
            Err(err) => {
                self.report(&err).await;
                return Err(err);
            }
        };

        self.reload().await;
        self.host.notify(Notice::shipment_created(&created)).await;

        let query = TrackingQuery {
            shipment: order.shipment,
            shipment_id: created.shipment_id.clone(),
            service_provider: created.service_provider.clone(),
            delivery_notes: order.delivery_notes,
        };
        // The shipment exists now; tracking is best effort.
        if let Err(err) = self.open_tracking(&query).await {
            tracing::warn!("Tracking after creation failed: {}", err);
        }

        Ok(created)
    }

    /// Fetch rates, let the user pick a row, create the shipment.
    /// `Ok(None)` means no services were offered or the dialog was dismissed.
    pub async fn run_shipping_workflow(&mut self) -> Result<Option<ShipmentCreated>> {
        let Some(dialog) = self.fetch_shipping_rates().await? else {
            return Ok(None);
        };

        let table = dialog.render(&self.currency);
        match self.host.choose_quote(&table).await {
            Some(row) => self.select_service(dialog, row).await.map(Some),
            None => {
                tracing::info!("Service selection dismissed for {}", self.doc.name);
                Ok(None)
            }
        }
    }

    /// Re-reads the document from the server.
    pub async fn reload(&mut self) {
        match self.rpc.get_shipment(&self.doc.name).await {
            Ok(doc) => {
                tracing::debug!("Reloaded {}", doc.name);
                self.doc = doc;
            }
            Err(err) => {
                tracing::warn!("Could not reload {}: {}", self.doc.name, err);
                self.host
                    .notify(Notice::new(
                        "Reload Failed",
                        format!("Could not reload {}: {}", self.doc.name, err),
                        Indicator::Orange,
                    ))
                    .await;
            }
        }
    }

    fn created_pair(&self) -> Result<(String, String)> {
        let id = self.doc.created_id().ok_or_else(|| self.not_created())?;
        let provider = self.doc.service_provider.clone().unwrap_or_default();
        Ok((id.to_string(), provider))
    }

    pub async fn print_shipping_label(&self) -> Result<LabelDisplay> {
        let (shipment_id, provider) = match self.created_pair() {
            Ok(pair) => pair,
            Err(err) => {
                self.report(&err).await;
                return Err(err);
            }
        };

        tracing::info!("Printing Shipping Label for {}", shipment_id);
        let result = match self.rpc.print_shipping_label(&shipment_id, &provider).await {
            Ok(Some(payload)) => self.display_label(&shipment_id, payload).await,
            Ok(None) => Err(ShipmentError::LabelUnavailable {
                shipment_id: shipment_id.clone(),
            }),
            Err(err) => Err(err),
        };

        if let Err(err) = &result {
            self.report(err).await;
        }
        result
    }

    async fn display_label(&self, shipment_id: &str, payload: LabelPayload) -> Result<LabelDisplay> {
        match payload {
            LabelPayload::Pdf(bytes) => {
                let file_name = label_file_name(shipment_id)?;
                self.host.open_pdf(&file_name, &bytes).await?;
                Ok(LabelDisplay::Binary {
                    file_name,
                    bytes: bytes.len(),
                })
            }
            LabelPayload::Url(url) => {
                self.host.open_url(&url, None).await?;
                Ok(LabelDisplay::Single(url))
            }
            LabelPayload::Urls(urls) => {
                for url in &urls {
                    self.host.open_url(url, None).await?;
                }
                Ok(LabelDisplay::Multiple(urls))
            }
        }
    }

    pub async fn show_tracking(&self) -> Result<Url> {
        let (shipment_id, service_provider) = match self.created_pair() {
            Ok(pair) => pair,
            Err(err) => {
                self.report(&err).await;
                return Err(err);
            }
        };

        let query = TrackingQuery {
            shipment: self.doc.name.clone(),
            shipment_id,
            service_provider,
            delivery_notes: self.doc.delivery_notes(),
        };
        self.open_tracking(&query).await
    }

    async fn open_tracking(&self, query: &TrackingQuery) -> Result<Url> {
        tracing::info!("Updating Tracking for {}", query.shipment_id);
        let result = match self.rpc.show_tracking(query).await {
            Ok(Some(number)) => self.tracking.lookup_url(&query.shipment_id, &number),
            Ok(None) => Err(ShipmentError::TrackingUnavailable {
                shipment_id: query.shipment_id.clone(),
            }),
            Err(err) => Err(err),
        };

        let url = match result {
            Ok(url) => url,
            Err(err) => {
                self.report(&err).await;
                return Err(err);
            }
        };

        if let Err(err) = self
            .host
            .open_url(url.as_str(), Some(self.tracking.window()))
            .await
        {
            self.report(&err).await;
            return Err(err);
        }
        Ok(url)
    }
}
