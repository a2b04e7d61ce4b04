use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ticker symbol as accepted by the providers, e.g. `AAPL` or `^GSPC`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(symbol: impl AsRef<str>) -> Self {
        Symbol(symbol.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(symbol: &str) -> Self {
        Symbol::new(symbol)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum DataSource {
    YahooFinance,
    TwelveData,
    AlphaVantage,
    Finnhub,
    Polygon,
    EnhancedMock,
}

impl DataSource {
    pub fn is_real_time(&self) -> bool {
        !matches!(self, DataSource::EnhancedMock)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::YahooFinance => "yahoo-finance",
            DataSource::TwelveData => "twelve-data",
            DataSource::AlphaVantage => "alpha-vantage",
            DataSource::Finnhub => "finnhub",
            DataSource::Polygon => "polygon",
            DataSource::EnhancedMock => "enhanced-mock",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single provider's price snapshot for one symbol.
///
/// Money is held as `Decimal` and serialized as JSON numbers in the
/// camelCase shape the dashboard and the backend facade exchange
/// (`changePercent`, `dataSource`, `isRealTime`, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: Symbol,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub change: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub change_percent: Decimal,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub open: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub high: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub low: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub previous_close: Option<Decimal>,
    pub volume: Option<u64>,
    pub data_source: DataSource,
    pub is_real_time: bool,
    pub timestamp: DateTime<Utc>,
}

impl Quote {
    pub fn new(symbol: Symbol, price: Decimal, data_source: DataSource) -> Self {
        Quote {
            symbol,
            price,
            change: Decimal::ZERO,
            change_percent: Decimal::ZERO,
            open: None,
            high: None,
            low: None,
            previous_close: None,
            volume: None,
            data_source,
            is_real_time: data_source.is_real_time(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_change(mut self, change: Decimal, change_percent: Decimal) -> Self {
        self.change = change;
        self.change_percent = change_percent;
        self
    }

    pub fn with_range(
        mut self,
        open: Option<Decimal>,
        high: Option<Decimal>,
        low: Option<Decimal>,
    ) -> Self {
        self.open = open;
        self.high = high;
        self.low = low;
        self
    }

    pub fn with_previous_close(mut self, previous_close: Option<Decimal>) -> Self {
        self.previous_close = previous_close;
        self
    }

    pub fn with_volume(mut self, volume: Option<u64>) -> Self {
        self.volume = volume;
        self
    }

    pub fn is_usable(&self) -> bool {
        self.price > Decimal::ZERO
    }
}

/// Shortest decimal that reads back as `value`; non-finite input is zero.
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Parses a percent value the way providers format it: `"1.23%"`, `"-0.5 %"`
/// or a bare number.
pub fn parse_percent(value: &str) -> Option<Decimal> {
    Decimal::from_str(value.trim().trim_end_matches('%').trim()).ok()
}

/// Absolute and relative change of `current` against `reference`.
pub fn change_between(current: Decimal, reference: Decimal) -> (Decimal, Decimal) {
    let change = current - reference;
    if reference.is_zero() {
        return (change, Decimal::ZERO);
    }
    (change, change / reference * Decimal::ONE_HUNDRED)
}

/// Rounds half away from zero to `places` decimals.
pub fn round_to(value: Decimal, places: u32) -> Decimal {
    value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// Price normalized to cents, used to compare prices reported by different
/// endpoints.
pub fn price_in_cents(price: f64) -> Option<Decimal> {
    Decimal::from_f64(price).map(|decimal| round_to(decimal, 2))
}

/// `+1.23` / `-0.40` style signed rendering. Values that round to zero,
/// negative zero included, render as `+0.00`.
pub fn signed(value: Decimal, places: u32) -> String {
    let rounded = round_to(value, places);

    if rounded.is_zero() || rounded.is_sign_positive() {
        format!("+{:.*}", places as usize, rounded.abs())
    } else {
        format!("{:.*}", places as usize, rounded)
    }
}

/// `$189.12 (+1.23%)`
pub fn format_price_change(price: Decimal, change: Decimal, change_percent: Decimal) -> String {
    let percent = round_to(change_percent, 2);

    if change.is_sign_negative() && !change.is_zero() {
        let percent = if percent.is_zero() { Decimal::ZERO } else { percent };
        format!("${:.2} ({:.2}%)", round_to(price, 2), percent)
    } else {
        format!("${:.2} ({}%)", round_to(price, 2), signed(percent, 2))
    }
}
