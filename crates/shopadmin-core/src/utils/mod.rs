//! Utility functions for display formatting and prices.

pub mod currency;
pub mod format;

// Re-export commonly used functions at module level
pub use currency::{convert_price, currency_symbol, format_price_with_currency};
pub use format::{format_date, format_flag, format_optional, format_thousands, truncate_string};
