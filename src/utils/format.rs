use rust_decimal::{Decimal, RoundingStrategy};

/// Currency display used by the quote table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormat {
    pub currency: String,
    pub precision: u32,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            precision: 2,
        }
    }
}

impl CurrencyFormat {
    pub fn new(currency: impl Into<String>, precision: u32) -> Self {
        Self {
            currency: currency.into(),
            precision,
        }
    }

    pub fn format(&self, amount: Decimal) -> String {
        format_currency(amount, &self.currency, self.precision)
    }
}

fn currency_symbol(currency: &str) -> Option<&'static str> {
    match currency {
        "USD" | "CAD" | "AUD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" => Some("¥"),
        "KRW" => Some("₩"),
        "INR" => Some("₹"),
        _ => None,
    }
}

/// Formats `amount` as `"$ 1,234.50"`, rounding half away from zero.
/// Unknown currencies are prefixed with their code.
pub fn format_currency(amount: Decimal, currency: &str, precision: u32) -> String {
    let mut rounded = amount.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(precision);

    let digits = rounded.abs().to_string();
    let (whole, fraction) = match digits.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (digits.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let prefix = currency_symbol(currency).unwrap_or(currency);
    format!("{}{} {}", sign, prefix, grouped)
}
