use crate::core::WindowFeatures;
use crate::utils::error::{Result, ShipmentError};
use url::Url;

pub const TRACKING_PLACEHOLDER: &str = "{tracking_number}";

pub const DEFAULT_TRACKING_TEMPLATE: &str = "https://tools.usps.com/go/TrackConfirmAction?tRef=fullpage&tLc=2&text28777=&tLabels={tracking_number}%2C&tABt=true";

/// Carrier lookup page for a tracking number, and the window it opens in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingLink {
    template: String,
    window: WindowFeatures,
}

impl Default for TrackingLink {
    fn default() -> Self {
        Self::new(DEFAULT_TRACKING_TEMPLATE, WindowFeatures::default())
    }
}

impl TrackingLink {
    pub fn new(template: impl Into<String>, window: WindowFeatures) -> Self {
        Self {
            template: template.into(),
            window,
        }
    }

    pub fn window(&self) -> &WindowFeatures {
        &self.window
    }

    pub fn lookup_url(&self, shipment_id: &str, tracking_number: &str) -> Result<Url> {
        let tracking_number = tracking_number.trim();
        if tracking_number.is_empty() {
            return Err(ShipmentError::TrackingUnavailable {
                shipment_id: shipment_id.to_string(),
            });
        }

        let encoded = urlencoding::encode(tracking_number);
        let url = self.template.replace(TRACKING_PLACEHOLDER, &encoded);
        Ok(Url::parse(&url)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usps_lookup_url() {
        let url = TrackingLink::default().lookup_url("SS-1", "12345").unwrap();
        assert!(url.as_str().contains("tLabels=12345%2C"));
        assert!(url.as_str().starts_with("https://tools.usps.com/go/TrackConfirmAction?"));
    }

    #[test]
    fn test_tracking_number_is_trimmed_and_encoded() {
        let url = TrackingLink::default()
            .lookup_url("SS-1", " 9400 1000&x ")
            .unwrap();
        assert!(url.as_str().contains("tLabels=9400%201000%26x%2C"));
    }

    #[test]
    fn test_blank_tracking_number_is_unavailable() {
        let err = TrackingLink::default().lookup_url("SS-1", "  ").unwrap_err();
        assert!(matches!(err, ShipmentError::TrackingUnavailable { .. }));
    }

    #[test]
    fn test_custom_template_and_window() {
        let link = TrackingLink::new(
            "https://track.example.com/{tracking_number}",
            WindowFeatures {
                target: "_blank".to_string(),
                width: 800,
                height: 600,
            },
        );
        let url = link.lookup_url("SS-1", "1Z999").unwrap();
        assert_eq!(url.as_str(), "https://track.example.com/1Z999");
        assert_eq!(link.window().to_string(), "width=800,height=600");
    }
}
