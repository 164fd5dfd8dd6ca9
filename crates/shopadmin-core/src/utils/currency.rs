//! Price formatting and conversion for the currencies the shop sells in.

use super::format::format_thousands;

/// Exchange rates from USD
const EXCHANGE_RATES: &[(&str, f64)] = &[
    ("USD", 1.0),
    ("EUR", 0.92),
    ("GBP", 0.79),
    ("JPY", 149.5),
    ("AUD", 1.53),
    ("CAD", 1.36),
    ("CHF", 0.87),
    ("CNY", 7.24),
    ("INR", 83.1),
    ("NGN", 1500.0),
    ("KES", 158.0),
    ("GHS", 14.5),
    ("EGP", 48.0),
    ("ZAR", 18.4),
    ("BRL", 4.97),
    ("MXN", 17.05),
];

const CURRENCY_SYMBOLS: &[(&str, &str)] = &[
    ("USD", "$"),
    ("EUR", "€"),
    ("GBP", "£"),
    ("JPY", "¥"),
    ("AUD", "A$"),
    ("CAD", "C$"),
    ("CHF", "CHF"),
    ("CNY", "¥"),
    ("INR", "₹"),
    ("NGN", "₦"),
    ("KES", "KSh"),
    ("GHS", "GH₵"),
    ("EGP", "E£"),
    ("ZAR", "R"),
    ("BRL", "R$"),
    ("MXN", "$"),
];

/// Currencies priced in whole units
const ZERO_DECIMAL: &[&str] = &["JPY", "VND", "KRW"];

pub fn exchange_rate(code: &str) -> Option<f64> {
    EXCHANGE_RATES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, rate)| *rate)
}

/// Symbol for a currency code, "$" when unknown
pub fn currency_symbol(code: &str) -> &'static str {
    CURRENCY_SYMBOLS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, symbol)| *symbol)
        .unwrap_or("$")
}

pub fn format_price_with_currency(price: f64, code: &str) -> String {
    let symbol = currency_symbol(code);
    if ZERO_DECIMAL.contains(&code) {
        format!("{}{}", symbol, format_thousands(price.round() as i64))
    } else {
        format!("{}{:.2}", symbol, price)
    }
}

/// Convert through USD. Unknown currencies count as rate 1.
pub fn convert_price(price: f64, from: &str, to: &str) -> f64 {
    if from == to {
        return price;
    }
    let from_rate = exchange_rate(from).unwrap_or(1.0);
    let to_rate = exchange_rate(to).unwrap_or(1.0);
    price / from_rate * to_rate
}
