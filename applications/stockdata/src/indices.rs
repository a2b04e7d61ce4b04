use crate::state::State;
use crate::stocks::quote_for;
use axum::{extract::State as AxumState, Json};
use chrono::Utc;
use marketpulse::quote::{round_to, signed, Quote, Symbol};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// (symbol, display name, fallback value, fallback change, fallback percent)
const US_INDICES: [(&str, &str, &str, &str, &str); 3] = [
    ("^GSPC", "S&P 500", "4,567.89", "+12.34", "+0.27%"),
    ("^IXIC", "NASDAQ", "14,234.56", "+45.67", "+0.32%"),
    ("^DJI", "DOW", "34,567.89", "-23.45", "-0.07%"),
];

const EUROPE: [(&str, &str, &str, &str); 3] = [
    ("FTSE 100", "7,456.78", "+23.45", "+0.32%"),
    ("DAX", "15,678.90", "-12.34", "-0.08%"),
    ("CAC 40", "7,234.56", "+34.56", "+0.48%"),
];

const ASIA: [(&str, &str, &str, &str); 3] = [
    ("Nikkei 225", "32,456.78", "+123.45", "+0.38%"),
    ("Hang Seng", "18,234.56", "-45.67", "-0.25%"),
    ("Shanghai", "3,234.56", "+12.34", "+0.38%"),
];

const CURRENCIES: [(&str, &str, &str, &str); 3] = [
    ("EUR/USD", "1.0876", "+0.0023", "+0.21%"),
    ("GBP/USD", "1.2654", "-0.0012", "-0.09%"),
    ("USD/JPY", "149.23", "+0.45", "+0.30%"),
];

const CRYPTO: [(&str, &str, &str, &str); 3] = [
    ("BTC/USD", "43,567.89", "+1,234.56", "+2.92%"),
    ("ETH/USD", "2,345.67", "+45.67", "+1.98%"),
    ("ADA/USD", "0.4567", "-0.0123", "-2.63%"),
];

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub name: String,
    pub value: String,
    pub change: String,
    pub percent: String,
    pub trend: String,
}

impl IndexEntry {
    fn fixed(name: &str, value: &str, change: &str, percent: &str) -> Self {
        let trend = if percent.starts_with('-') { "down" } else { "up" };

        Self {
            name: name.to_string(),
            value: value.to_string(),
            change: change.to_string(),
            percent: percent.to_string(),
            trend: trend.to_string(),
        }
    }

    pub fn from_quote(name: &str, quote: &Quote) -> Self {
        Self::fixed(
            name,
            &thousands(quote.price),
            &signed(quote.change, 2),
            &format!("{}%", signed(quote.change_percent, 2)),
        )
    }
}

#[derive(Serialize)]
pub struct IndicesResponse {
    success: bool,
    data: BTreeMap<&'static str, Vec<IndexEntry>>,
    timestamp: String,
}

/// `6753.1234` renders as `6,753.12`.
pub fn thousands(value: Decimal) -> String {
    let rounded = round_to(value, 2);
    let formatted = format!("{:.2}", rounded.abs());
    let (whole, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, fraction)
}

fn fixed_rows(rows: &[(&str, &str, &str, &str)]) -> Vec<IndexEntry> {
    rows.iter()
        .map(|(name, value, change, percent)| IndexEntry::fixed(name, value, change, percent))
        .collect()
}

pub async fn get(AxumState(state): AxumState<State>) -> Json<IndicesResponse> {
    let mut us = Vec::with_capacity(US_INDICES.len());

    for (symbol, name, value, change, percent) in US_INDICES {
        let quote = quote_for(&state, &Symbol::new(symbol)).await;

        if quote.is_real_time && quote.is_usable() {
            info!("{} at {} from {}", name, quote.price, quote.data_source);
            us.push(IndexEntry::from_quote(name, &quote));
        } else {
            info!("no real data for {}, using fallback row", name);
            us.push(IndexEntry::fixed(name, value, change, percent));
        }
    }

    let mut data = BTreeMap::new();
    data.insert("US", us);
    data.insert("Europe", fixed_rows(&EUROPE));
    data.insert("Asia", fixed_rows(&ASIA));
    data.insert("Currencies", fixed_rows(&CURRENCIES));
    data.insert("Crypto", fixed_rows(&CRYPTO));

    Json(IndicesResponse {
        success: true,
        data,
        timestamp: Utc::now().to_rfc3339(),
    })
}
