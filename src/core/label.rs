use crate::core::LabelPayload;
use crate::utils::error::{Result, ShipmentError};
use base64::Engine;
use serde_json::Value;

const METHOD: &str = "print_shipping_label";
const PDF_MAGIC: &[u8] = b"%PDF";

fn is_web_url(candidate: &str) -> bool {
    match url::Url::parse(candidate) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Decodes a label response by its shape: a list is a set of label URLs,
/// a string is either one URL or a base64 PDF. Empty responses are `None`.
pub fn decode_label(message: Value) -> Result<Option<LabelPayload>> {
    match message {
        Value::Null => Ok(None),
        Value::Array(items) => {
            let urls = items
                .into_iter()
                .map(|item| match item {
                    Value::String(url) if !url.trim().is_empty() => Ok(url.trim().to_string()),
                    other => Err(ShipmentError::unexpected(
                        METHOD,
                        format!("label list entry is not a URL: {}", other),
                    )),
                })
                .collect::<Result<Vec<_>>>()?;
            if urls.is_empty() {
                Ok(None)
            } else {
                Ok(Some(LabelPayload::Urls(urls)))
            }
        }
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            if is_web_url(text) {
                return Ok(Some(LabelPayload::Url(text.to_string())));
            }
            // Providers wrap base64 at 76 columns.
            let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
            let bytes = base64::engine::general_purpose::STANDARD.decode(compact)?;
            if !bytes.starts_with(PDF_MAGIC) {
                tracing::warn!("Decoded label ({} bytes) has no PDF header", bytes.len());
            }
            Ok(Some(LabelPayload::Pdf(bytes)))
        }
        other => Err(ShipmentError::unexpected(
            METHOD,
            format!("expected label data, got {}", other),
        )),
    }
}
