use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SUBMITTED: i64 = 1;
pub const DELIVERED: &str = "Delivered";
pub const COMPANY: &str = "Company";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
    #[serde(default)]
    pub length: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub weight: f64,
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentDeliveryNote {
    pub delivery_note: String,
}

/// Snapshot of the ERP Shipment document. Read-only on this side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shipment {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub docstatus: i64,
    pub status: Option<String>,
    pub shipment_id: Option<String>,
    pub service_provider: Option<String>,
    pub tracking_status: Option<String>,
    pub carrier: Option<String>,
    pub carrier_service: Option<String>,
    pub awb_number: Option<String>,
    pub shipment_amount: Option<Decimal>,
    #[serde(deserialize_with = "null_as_default")]
    pub pickup_from_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub delivery_to_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub pickup_address_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub delivery_address_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub shipment_parcel: Vec<Parcel>,
    pub description_of_content: Option<String>,
    pub pickup_date: Option<NaiveDate>,
    pub pickup_contact_person: Option<String>,
    pub pickup_contact_name: Option<String>,
    pub delivery_contact_name: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub value_of_goods: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub shipment_delivery_note: Vec<ShipmentDeliveryNote>,
}

/// Frappe sends `null` for empty fields; treat it like a missing one.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Shipment {
    /// The id assigned by the provider, if the shipment has been created.
    /// Blank ids count as absent.
    pub fn created_id(&self) -> Option<&str> {
        self.shipment_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn is_submitted(&self) -> bool {
        self.docstatus == SUBMITTED
    }

    pub fn is_delivered(&self) -> bool {
        self.tracking_status.as_deref() == Some(DELIVERED)
    }

    pub fn delivery_notes(&self) -> Vec<String> {
        self.shipment_delivery_note
            .iter()
            .map(|d| d.delivery_note.clone())
            .collect()
    }
}

/// Shipment particulars sent with rate lookups and creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentRequest {
    pub pickup_from_type: String,
    pub delivery_to_type: String,
    pub pickup_address_name: String,
    pub delivery_address_name: String,
    pub shipment_parcel: Vec<Parcel>,
    pub description_of_content: Option<String>,
    pub pickup_date: Option<NaiveDate>,
    pub pickup_contact_name: Option<String>,
    pub delivery_contact_name: Option<String>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub value_of_goods: Decimal,
}

impl ShipmentRequest {
    pub fn from_shipment(doc: &Shipment) -> Self {
        // Company pickups name the internal user, not a contact record.
        let pickup_contact_name = if doc.pickup_from_type == COMPANY {
            doc.pickup_contact_person.clone()
        } else {
            doc.pickup_contact_name.clone()
        };

        Self {
            pickup_from_type: doc.pickup_from_type.clone(),
            delivery_to_type: doc.delivery_to_type.clone(),
            pickup_address_name: doc.pickup_address_name.clone(),
            delivery_address_name: doc.delivery_address_name.clone(),
            shipment_parcel: doc.shipment_parcel.clone(),
            description_of_content: doc.description_of_content.clone(),
            pickup_date: doc.pickup_date,
            pickup_contact_name,
            delivery_contact_name: doc.delivery_contact_name.clone(),
            value_of_goods: doc.value_of_goods,
        }
    }
}

/// A priced service offer. Fields the server sends beyond the displayed
/// ones are kept so the quote can be forwarded to creation unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarrierQuote {
    pub service_provider: String,
    #[serde(rename = "carriername")]
    pub carrier_name: String,
    #[serde(rename = "servicename")]
    pub service_name: String,
    // Sent back as a number, the way the server quoted it.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub total_price: Decimal,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Everything `create_shipment` needs, produced by a quote selection.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateShipment {
    pub shipment: String,
    pub request: ShipmentRequest,
    pub service_data: CarrierQuote,
    pub delivery_notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentCreated {
    pub service_provider: String,
    #[serde(deserialize_with = "string_or_number")]
    pub shipment_id: String,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub carrier_service: Option<String>,
    #[serde(default)]
    pub shipment_amount: Option<Decimal>,
    #[serde(default)]
    pub awb_number: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackingQuery {
    pub shipment: String,
    pub shipment_id: String,
    pub service_provider: String,
    pub delivery_notes: Vec<String>,
}

/// Decoded `print_shipping_label` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelPayload {
    Pdf(Vec<u8>),
    Url(String),
    Urls(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Blue,
    Green,
    Orange,
    Red,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub indicator: Indicator,
}

impl Notice {
    pub fn new(title: impl Into<String>, message: impl Into<String>, indicator: Indicator) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            indicator,
        }
    }

    pub fn no_services() -> Self {
        Self::new("Note", "No Shipment Services available", Indicator::Blue)
    }

    pub fn shipment_created(created: &ShipmentCreated) -> Self {
        Self::new(
            "Shipment Created",
            format!(
                "Shipment {} has been created with {}.",
                created.shipment_id, created.service_provider
            ),
            Indicator::Green,
        )
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::new("Error", message, Indicator::Red)
    }
}

/// Buttons offered on the Shipment form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormAction {
    FetchShippingRates,
    PrintShippingLabel,
    TrackStatus,
}

impl FormAction {
    pub fn label(&self) -> &'static str {
        match self {
            FormAction::FetchShippingRates => "Fetch Shipping Rates",
            FormAction::PrintShippingLabel => "Print Shipping Label",
            FormAction::TrackStatus => "Track Status",
        }
    }

    pub fn group(&self) -> Option<&'static str> {
        match self {
            FormAction::FetchShippingRates => None,
            FormAction::PrintShippingLabel | FormAction::TrackStatus => Some("Tools"),
        }
    }
}

impl fmt::Display for FormAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.group() {
            Some(group) => write!(f, "{} > {}", group, self.label()),
            None => f.write_str(self.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRow {
    pub index: usize,
    pub service_provider: String,
    pub carrier_name: String,
    pub service_name: String,
    pub price: String,
}

/// Rendered quote comparison table. Row `i` is quote `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteTable {
    pub title: String,
    pub headers: [&'static str; 5],
    pub rows: Vec<QuoteRow>,
}

impl fmt::Display for QuoteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<[String; 5]> = self
            .rows
            .iter()
            .map(|row| {
                [
                    row.service_provider.clone(),
                    row.carrier_name.clone(),
                    row.service_name.clone(),
                    row.price.clone(),
                    format!("[{}] Select", row.index),
                ]
            })
            .collect();

        let mut widths = self.headers.map(|h| h.chars().count());
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.chars().count());
            }
        }

        writeln!(f, "{}", self.title)?;
        let header: Vec<String> = self
            .headers
            .iter()
            .zip(widths.iter())
            .map(|(h, w)| format!("{:<w$}", h, w = *w))
            .collect();
        writeln!(f, "| {} |", header.join(" | "))?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "|-{}-|", rule.join("-|-"))?;
        for row in &cells {
            let line: Vec<String> = row
                .iter()
                .zip(widths.iter())
                .map(|(c, w)| format!("{:<w$}", c, w = *w))
                .collect();
            writeln!(f, "| {} |", line.join(" | "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowFeatures {
    pub target: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowFeatures {
    fn default() -> Self {
        Self {
            target: "_blank".to_string(),
            width: 600,
            height: 400,
        }
    }
}

impl fmt::Display for WindowFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "width={},height={}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_company_pickup_uses_contact_person() {
        let doc = Shipment {
            pickup_from_type: "Company".to_string(),
            pickup_contact_person: Some("admin@example.com".to_string()),
            pickup_contact_name: Some("Jane Roe".to_string()),
            ..Default::default()
        };
        let request = ShipmentRequest::from_shipment(&doc);
        assert_eq!(request.pickup_contact_name.as_deref(), Some("admin@example.com"));

        let doc = Shipment {
            pickup_from_type: "Customer".to_string(),
            ..doc
        };
        let request = ShipmentRequest::from_shipment(&doc);
        assert_eq!(request.pickup_contact_name.as_deref(), Some("Jane Roe"));
    }

    #[test]
    fn test_blank_shipment_id_is_not_created() {
        let mut doc = Shipment {
            shipment_id: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(doc.created_id(), None);
        doc.shipment_id = Some("SS-77".to_string());
        assert_eq!(doc.created_id(), Some("SS-77"));
    }

    #[test]
    fn test_quote_keeps_unknown_fields() {
        let quote: CarrierQuote = serde_json::from_value(json!({
            "service_provider": "ShipStation",
            "carriername": "Stamps.com",
            "servicename": "USPS Priority Mail",
            "total_price": 8.75,
            "service_code": "usps_priority_mail",
            "other_cost": 0.0
        }))
        .unwrap();

        assert_eq!(quote.carrier_name, "Stamps.com");
        assert_eq!(quote.total_price, Decimal::new(875, 2));
        assert_eq!(quote.extra["service_code"], json!("usps_priority_mail"));

        let back = serde_json::to_value(&quote).unwrap();
        assert_eq!(back["servicename"], json!("USPS Priority Mail"));
        assert_eq!(back["service_code"], json!("usps_priority_mail"));
        assert_eq!(back["total_price"], json!(8.75));
    }

    #[test]
    fn test_shipment_created_accepts_numeric_id() {
        let created: ShipmentCreated = serde_json::from_value(json!({
            "service_provider": "ShipStation",
            "shipment_id": 123456
        }))
        .unwrap();
        assert_eq!(created.shipment_id, "123456");
        assert_eq!(
            Notice::shipment_created(&created).message,
            "Shipment 123456 has been created with ShipStation."
        );
    }

    #[test]
    fn test_shipment_reads_frappe_document() {
        let doc: Shipment = serde_json::from_value(json!({
            "name": "SHIPMENT-00012",
            "docstatus": 1,
            "pickup_from_type": "Company",
            "delivery_to_type": "Customer",
            "pickup_address_name": "Main Warehouse-Shipping",
            "delivery_address_name": "Jane Roe-Shipping",
            "pickup_date": "2026-10-20",
            "value_of_goods": 125.5,
            "shipment_parcel": [{"length": 30, "width": 20, "height": 10, "weight": 1.5, "count": 1, "idx": 1}],
            "shipment_delivery_note": [{"delivery_note": "DN-0001", "idx": 1}],
            "modified": "2026-10-18 10:00:00"
        }))
        .unwrap();

        assert!(doc.is_submitted());
        assert_eq!(doc.created_id(), None);
        assert_eq!(doc.pickup_date, NaiveDate::from_ymd_opt(2026, 10, 20));
        assert_eq!(doc.value_of_goods, Decimal::new(1255, 1));
        assert_eq!(doc.delivery_notes(), vec!["DN-0001".to_string()]);
    }

    #[test]
    fn test_action_display_includes_group() {
        assert_eq!(FormAction::FetchShippingRates.to_string(), "Fetch Shipping Rates");
        assert_eq!(FormAction::TrackStatus.to_string(), "Tools > Track Status");
    }
}
