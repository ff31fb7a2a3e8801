//! Indicator library
//!
//! Stateless functions over an ordered window of samples. Each indicator
//! documents a minimum sample count; below it the indicator returns its
//! neutral default with a zero contribution and `sufficient = false`, so the
//! composer never needs to special-case missing data.

pub mod levels;
pub mod oscillators;
pub mod trend;
pub mod volatility;

pub use levels::{bollinger, support_resistance};
pub use oscillators::{momentum, rsi, rsi_value};
pub use trend::{ema_series, ma_confluence, macd, sma, sma_value};
pub use volatility::{obv_trend, volatility, volume_profile};

use crate::types::Sample;

/// Prices of a sample window, oldest first
pub(crate) fn prices(samples: &[Sample]) -> Vec<f64> {
    samples.iter().map(|s| s.price).collect()
}

/// `value` expressed in percent of `price`, scaled so `saturation_pct` maps to 1
pub(crate) fn scaled_percent(value: f64, price: f64, saturation_pct: f64) -> f64 {
    if price <= 0.0 || saturation_pct <= 0.0 {
        return 0.0;
    }
    value / price * 100.0 / saturation_pct
}
