#![allow(dead_code)]

use async_trait::async_trait;
use httpmock::MockServer;
use serde_json::{json, Value};
use shipment_desk::config::toml_config::DEFAULT_METHOD_PREFIX;
use shipment_desk::core::{FormHost, Indicator, Notice, QuoteTable, Shipment, WindowFeatures};
use shipment_desk::{HttpShippingRpc, Result, ShipmentForm};
use std::sync::Mutex;
use std::time::Duration;

pub const SHIPMENT: &str = "SHIPMENT-00012";

#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Notice(Notice),
    Dialog(QuoteTable),
    OpenUrl {
        url: String,
        window: Option<WindowFeatures>,
    },
    OpenPdf {
        file_name: String,
        data: Vec<u8>,
    },
}

/// Form host that records what the user would have seen.
pub struct RecordingHost {
    events: Mutex<Vec<HostEvent>>,
    selection: Option<usize>,
}

impl RecordingHost {
    pub fn new(selection: Option<usize>) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            selection,
        }
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Notice(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    pub fn notices_with(&self, indicator: Indicator) -> Vec<Notice> {
        self.notices()
            .into_iter()
            .filter(|n| n.indicator == indicator)
            .collect()
    }

    pub fn dialogs(&self) -> Vec<QuoteTable> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Dialog(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn opened_urls(&self) -> Vec<(String, Option<WindowFeatures>)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::OpenUrl { url, window } => Some((url, window)),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: HostEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl FormHost for RecordingHost {
    async fn notify(&self, notice: Notice) {
        self.push(HostEvent::Notice(notice));
    }

    async fn choose_quote(&self, table: &QuoteTable) -> Option<usize> {
        self.push(HostEvent::Dialog(table.clone()));
        self.selection
    }

    async fn open_url(&self, url: &str, window: Option<&WindowFeatures>) -> Result<()> {
        self.push(HostEvent::OpenUrl {
            url: url.to_string(),
            window: window.cloned(),
        });
        Ok(())
    }

    async fn open_pdf(&self, file_name: &str, data: &[u8]) -> Result<()> {
        self.push(HostEvent::OpenPdf {
            file_name: file_name.to_string(),
            data: data.to_vec(),
        });
        Ok(())
    }
}

pub fn method_path(method: &str) -> String {
    format!("/api/method/{}.{}", DEFAULT_METHOD_PREFIX, method)
}

pub fn rpc(server: &MockServer) -> HttpShippingRpc {
    HttpShippingRpc::new(
        &server.base_url(),
        DEFAULT_METHOD_PREFIX,
        Some(("key", "secret")),
        Duration::from_secs(5),
    )
    .unwrap()
}

/// A submitted shipment that has not been booked yet.
pub fn draft_json() -> Value {
    json!({
        "name": SHIPMENT,
        "docstatus": 1,
        "status": "Submitted",
        "shipment_id": null,
        "service_provider": null,
        "tracking_status": null,
        "pickup_from_type": "Company",
        "delivery_to_type": "Customer",
        "pickup_address_name": "Main Warehouse-Shipping",
        "delivery_address_name": "Jane Roe-Shipping",
        "pickup_contact_person": "admin@example.com",
        "pickup_contact_name": null,
        "delivery_contact_name": "Jane Roe",
        "description_of_content": "Books",
        "pickup_date": "2026-10-20",
        "value_of_goods": 125.5,
        "shipment_parcel": [
            {"length": 30, "width": 20, "height": 10, "weight": 1.5, "count": 1}
        ],
        "shipment_delivery_note": [
            {"delivery_note": "DN-0001"},
            {"delivery_note": "DN-0002"}
        ]
    })
}

pub fn booked_json(shipment_id: &str) -> Value {
    let mut doc = draft_json();
    doc["status"] = json!("Booked");
    doc["shipment_id"] = json!(shipment_id);
    doc["service_provider"] = json!("ShipStation");
    doc
}

pub fn draft() -> Shipment {
    serde_json::from_value(draft_json()).unwrap()
}

pub fn booked(shipment_id: &str) -> Shipment {
    serde_json::from_value(booked_json(shipment_id)).unwrap()
}

pub fn form(
    server: &MockServer,
    doc: Shipment,
    selection: Option<usize>,
) -> ShipmentForm<HttpShippingRpc, RecordingHost> {
    ShipmentForm::new(rpc(server), RecordingHost::new(selection), doc)
}

pub fn quotes_json() -> Value {
    json!([
        {
            "service_provider": "ShipStation",
            "carriername": "Stamps.com",
            "servicename": "USPS Ground Advantage",
            "service_code": "usps_ground_advantage",
            "total_price": 5.4,
            "other_cost": 0.0
        },
        {
            "service_provider": "ShipStation",
            "carriername": "Stamps.com",
            "servicename": "USPS Priority Mail",
            "service_code": "usps_priority_mail",
            "total_price": 8.75,
            "other_cost": 0.0
        },
        {
            "service_provider": "ShipStation",
            "carriername": "Stamps.com",
            "servicename": "USPS Priority Mail Express",
            "service_code": "usps_priority_mail_express",
            "total_price": 31.5,
            "other_cost": 0.0
        }
    ])
}
