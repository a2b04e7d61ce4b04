//! Console reports. Each one runs its checks strictly in sequence, prints a
//! line per check to `out` and never stops on a failed check.

pub mod all_real;
pub mod backend;
pub mod consistency;
pub mod index_details;
pub mod providers;
pub mod setup;

use marketpulse::backend::{IndexEntry, StockData};
use std::collections::BTreeMap;
use std::io::Write;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub passed: usize,
    pub failed: usize,
}

impl Tally {
    pub fn pass(&mut self) {
        self.passed += 1;
    }

    pub fn fail(&mut self) {
        self.failed += 1;
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

pub(crate) fn real_or_mock(stock: &StockData) -> &'static str {
    if stock.is_mock() {
        "Mock"
    } else {
        "Real"
    }
}

/// `AAPL: $189.5 (finnhub) - Real`
pub(crate) fn stock_line(symbol: &str, stock: &StockData) -> String {
    format!(
        "{}: ${} ({}) - {}",
        symbol,
        stock.price,
        stock.source(),
        real_or_mock(stock)
    )
}

/// `S&P 500: 4,567.89 (+12.34) +0.27%`
pub(crate) fn index_line(entry: &IndexEntry) -> String {
    format!(
        "{}: {} ({}) {}",
        entry.name, entry.value, entry.change, entry.percent
    )
}

pub(crate) fn write_us_indices(
    indices: &BTreeMap<String, Vec<IndexEntry>>,
    out: &mut dyn Write,
) -> std::io::Result<bool> {
    match indices.get("US") {
        Some(entries) if !entries.is_empty() => {
            for entry in entries {
                writeln!(out, "{}", index_line(entry))?;
            }
            Ok(true)
        }
        _ => {
            writeln!(out, "❌ No US indices in response")?;
            Ok(false)
        }
    }
}
