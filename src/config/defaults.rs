//! Built-in board: dollar quotes from dolarapi.com
//!
//! Fallback values are last-known-good quotes and change only with a release.

use std::collections::BTreeMap;

pub const OFFICIAL: &str = "Official";
pub const INFORMAL: &str = "Informal";
pub const SAVINGS_EQUIVALENT: &str = "SavingsEquivalent";
pub const STOCK_EXCHANGE_EQUIVALENT: &str = "StockExchangeEquivalent";
pub const CARD_SURCHARGED: &str = "CardSurcharged";

pub const DEFAULT_BOARD: &str = "dolares";
pub const DEFAULT_TIMEOUT_MS: u64 = 3000;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Monthly CPI table used by `pizarra inflation` when no source is given
pub const INFLATION_URL: &str = "https://calcularsueldo.com.ar/inflacion/inflacion-argentina-2025";

pub fn default_fallback() -> BTreeMap<String, f64> {
    [
        (OFFICIAL, 1030.50),
        (INFORMAL, 1485.00),
        (SAVINGS_EQUIVALENT, 1478.20),
        (STOCK_EXCHANGE_EQUIVALENT, 1510.40),
        (CARD_SURCHARGED, 1339.65),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

/// dolarapi.com "nombre" values to logical names
pub fn default_name_map() -> BTreeMap<String, String> {
    [
        ("Oficial", OFFICIAL),
        ("Blue", INFORMAL),
        ("Bolsa", SAVINGS_EQUIVALENT),
        ("Contado con liquidación", STOCK_EXCHANGE_EQUIVALENT),
        ("Tarjeta", CARD_SURCHARGED),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
