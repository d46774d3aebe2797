use crate::config::DeskConfig;
use crate::core::label::decode_label;
use crate::core::{
    CarrierQuote, CreateShipment, LabelPayload, Shipment, ShipmentCreated, ShipmentRequest,
    ShippingRpc, TrackingQuery,
};
use crate::utils::error::{Result, ShipmentError};
use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder};
use rust_decimal::prelude::ToPrimitive;
use serde_json::{json, Value};
use std::sync::OnceLock;
use std::time::Duration;

pub const FETCH_SHIPPING_RATES: &str = "fetch_shipping_rates";
pub const CREATE_SHIPMENT: &str = "create_shipment";
pub const PRINT_SHIPPING_LABEL: &str = "print_shipping_label";
pub const SHOW_TRACKING: &str = "show_tracking";

/// Whitelisted server methods reached over `/api/method`, plus document
/// reads over `/api/resource`.
#[derive(Clone)]
pub struct HttpShippingRpc {
    client: Client,
    base_url: String,
    prefix: String,
}

impl HttpShippingRpc {
    pub fn new(
        base_url: &str,
        prefix: &str,
        credentials: Option<(&str, &str)>,
        timeout: Duration,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some((key, secret)) = credentials {
            let value = HeaderValue::from_str(&format!("token {}:{}", key, secret)).map_err(
                |e| ShipmentError::InvalidConfigValueError {
                    field: "server.api_key".to_string(),
                    value: key.to_string(),
                    reason: e.to_string(),
                },
            )?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            prefix: prefix.trim_end_matches('.').to_string(),
        })
    }

    pub fn from_config(config: &DeskConfig) -> Result<Self> {
        let credentials = match (&config.server.api_key, &config.server.api_secret) {
            (Some(key), Some(secret)) => Some((key.as_str(), secret.as_str())),
            _ => None,
        };
        Self::new(
            &config.server.base_url,
            &config.methods.prefix,
            credentials,
            Duration::from_secs(config.timeout_seconds()),
        )
    }

    pub fn method_url(&self, method: &str) -> String {
        format!("{}/api/method/{}.{}", self.base_url, self.prefix, method)
    }

    /// Calls a whitelisted method and returns its `message`.
    async fn call(&self, method: &str, args: Value) -> Result<Value> {
        let url = self.method_url(method);
        tracing::debug!("POST {}", url);
        let mut body = self.send(method, self.client.post(&url).json(&args)).await?;
        Ok(body
            .as_object_mut()
            .and_then(|map| map.remove("message"))
            .unwrap_or(Value::Null))
    }

    async fn send(&self, method: &str, request: RequestBuilder) -> Result<Value> {
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("{} response status: {}", method, status);
        let text = response.text().await?;

        let body: Value = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                return Err(ShipmentError::remote(method, format!("HTTP {}", status)));
            }
            Err(e) => return Err(ShipmentError::SerializationError(e)),
        };

        if !status.is_success() || has_exception(&body) {
            let message =
                server_message(&body).unwrap_or_else(|| format!("HTTP {}", status));
            return Err(ShipmentError::remote(method, message));
        }
        Ok(body)
    }
}

fn has_exception(body: &Value) -> bool {
    match body.get("exc") {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

fn strip_tags(text: &str) -> String {
    static TAGS: OnceLock<Option<Regex>> = OnceLock::new();
    match TAGS.get_or_init(|| Regex::new(r"<[^>]+>").ok()) {
        Some(re) => re.replace_all(text, "").trim().to_string(),
        None => text.trim().to_string(),
    }
}

/// The most readable error text in a failed response. `_server_messages`
/// is a JSON string holding a list of JSON-encoded message objects.
fn server_message(body: &Value) -> Option<String> {
    let from_server_messages = body
        .get("_server_messages")
        .and_then(Value::as_str)
        .and_then(|raw| serde_json::from_str::<Vec<String>>(raw).ok())
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| {
                    let parsed: Value = serde_json::from_str(entry).ok()?;
                    parsed
                        .get("message")
                        .and_then(Value::as_str)
                        .map(strip_tags)
                })
                .filter(|m| !m.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .filter(|m| !m.is_empty());

    from_server_messages
        .or_else(|| {
            body.get("exception")
                .and_then(Value::as_str)
                .map(|e| strip_tags(e.split_once(": ").map_or(e, |(_, text)| text)))
        })
        .or_else(|| body.get("exc_type").and_then(Value::as_str).map(str::to_string))
}

/// Rate-lookup arguments. Parcels travel as a JSON string; the server
/// decodes them itself.
pub fn rate_args(request: &ShipmentRequest) -> Result<serde_json::Map<String, Value>> {
    let args = json!({
        "pickup_from_type": request.pickup_from_type,
        "delivery_to_type": request.delivery_to_type,
        "pickup_address_name": request.pickup_address_name,
        "delivery_address_name": request.delivery_address_name,
        "shipment_parcel": serde_json::to_string(&request.shipment_parcel)?,
        "description_of_content": request.description_of_content,
        "pickup_date": request.pickup_date,
        "pickup_contact_name": request.pickup_contact_name,
        "delivery_contact_name": request.delivery_contact_name,
        "value_of_goods": request.value_of_goods.to_f64(),
    });
    match args {
        Value::Object(map) => Ok(map),
        other => Err(ShipmentError::unexpected(
            FETCH_SHIPPING_RATES,
            format!("arguments did not serialize to an object: {}", other),
        )),
    }
}

pub fn create_args(order: &CreateShipment) -> Result<serde_json::Map<String, Value>> {
    let mut args = rate_args(&order.request)?;
    args.insert("shipment".to_string(), json!(order.shipment));
    args.insert(
        "service_data".to_string(),
        json!(serde_json::to_string(&order.service_data)?),
    );
    args.insert(
        "delivery_notes".to_string(),
        json!(serde_json::to_string(&order.delivery_notes)?),
    );
    Ok(args)
}

#[async_trait]
impl ShippingRpc for HttpShippingRpc {
    async fn fetch_shipping_rates(&self, request: &ShipmentRequest) -> Result<Vec<CarrierQuote>> {
        let args = rate_args(request)?;
        match self.call(FETCH_SHIPPING_RATES, Value::Object(args)).await? {
            Value::Null => Ok(Vec::new()),
            message @ Value::Array(_) => Ok(serde_json::from_value(message)?),
            other => Err(ShipmentError::unexpected(
                FETCH_SHIPPING_RATES,
                format!("expected a list of services, got {}", other),
            )),
        }
    }

    async fn create_shipment(&self, order: &CreateShipment) -> Result<ShipmentCreated> {
        let args = create_args(order)?;
        match self.call(CREATE_SHIPMENT, Value::Object(args)).await? {
            Value::Null => Err(ShipmentError::remote(
                CREATE_SHIPMENT,
                format!(
                    "{} did not create a shipment",
                    order.service_data.service_provider
                ),
            )),
            message => Ok(serde_json::from_value(message)?),
        }
    }

    async fn print_shipping_label(
        &self,
        shipment_id: &str,
        service_provider: &str,
    ) -> Result<Option<LabelPayload>> {
        let args = json!({
            "shipment_id": shipment_id,
            "service_provider": service_provider,
        });
        decode_label(self.call(PRINT_SHIPPING_LABEL, args).await?)
    }

    async fn show_tracking(&self, query: &TrackingQuery) -> Result<Option<String>> {
        let args = json!({
            "shipment": query.shipment,
            "shipment_id": query.shipment_id,
            "service_provider": query.service_provider,
            "delivery_notes": serde_json::to_string(&query.delivery_notes)?,
        });
        match self.call(SHOW_TRACKING, args).await? {
            Value::Null => Ok(None),
            Value::String(number) if number.trim().is_empty() => Ok(None),
            Value::String(number) => Ok(Some(number)),
            Value::Number(number) => Ok(Some(number.to_string())),
            other => Err(ShipmentError::unexpected(
                SHOW_TRACKING,
                format!("expected a tracking number, got {}", other),
            )),
        }
    }

    async fn get_shipment(&self, name: &str) -> Result<Shipment> {
        let url = format!(
            "{}/api/resource/Shipment/{}",
            self.base_url,
            urlencoding::encode(name)
        );
        tracing::debug!("GET {}", url);
        let mut body = self.send("get_shipment", self.client.get(&url)).await?;
        let data = body
            .as_object_mut()
            .and_then(|map| map.remove("data"))
            .ok_or_else(|| ShipmentError::unexpected("get_shipment", "response has no data"))?;
        Ok(serde_json::from_value(data)?)
    }
}
