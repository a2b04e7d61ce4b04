//! Quote provider clients.
//!
//! Every external market-data API sits behind [`Provider`] and reports into
//! the same [`Outcome`] type, so reports and the backend facade can walk a
//! list of providers without knowing any provider's JSON shape.

use crate::errors::Error;
use crate::quote::{DataSource, Quote, Symbol};
use async_trait::async_trait;
use mockall::automock;
use reqwest::{Client as HTTPClient, RequestBuilder};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub mod alpha_vantage;
pub mod chain;
pub mod finnhub;
pub mod polygon;
pub mod twelve_data;
pub mod yahoo;

const DEFAULT_API_KEY: &str = "demo";

const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProviderKind {
    Yahoo,
    TwelveData,
    AlphaVantage,
    Finnhub,
    Polygon,
}

impl ProviderKind {
    /// Priority order used when falling back from one provider to the next.
    pub const FALLBACK_ORDER: [ProviderKind; 5] = [
        ProviderKind::Yahoo,
        ProviderKind::TwelveData,
        ProviderKind::AlphaVantage,
        ProviderKind::Finnhub,
        ProviderKind::Polygon,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::Yahoo => "Yahoo Finance",
            ProviderKind::TwelveData => "Twelve Data",
            ProviderKind::AlphaVantage => "Alpha Vantage",
            ProviderKind::Finnhub => "Finnhub",
            ProviderKind::Polygon => "Polygon",
        }
    }

    pub fn data_source(&self) -> DataSource {
        match self {
            ProviderKind::Yahoo => DataSource::YahooFinance,
            ProviderKind::TwelveData => DataSource::TwelveData,
            ProviderKind::AlphaVantage => DataSource::AlphaVantage,
            ProviderKind::Finnhub => DataSource::Finnhub,
            ProviderKind::Polygon => DataSource::Polygon,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "yahoo" | "yahoo-finance" => Ok(ProviderKind::Yahoo),
            "twelve-data" | "twelvedata" => Ok(ProviderKind::TwelveData),
            "alpha-vantage" | "alphavantage" => Ok(ProviderKind::AlphaVantage),
            "finnhub" => Ok(ProviderKind::Finnhub),
            "polygon" => Ok(ProviderKind::Polygon),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

#[automock]
#[async_trait]
pub trait Provider: Send + Sync {
    fn kind(&self) -> ProviderKind;
    async fn quote(&self, symbol: &Symbol) -> Result<Quote, Error>;
}

/// Uniform result of asking one provider for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Quote),
    RateLimited(String),
    Unavailable(String),
}

impl Outcome {
    pub fn from_result(result: Result<Quote, Error>) -> Self {
        match result {
            Ok(quote) if quote.is_usable() => Outcome::Success(quote),
            Ok(quote) => Outcome::Unavailable(format!("unusable price {}", quote.price)),
            Err(error) if error.is_rate_limited() => Outcome::RateLimited(error.to_string()),
            Err(error) => Outcome::Unavailable(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn quote(&self) -> Option<&Quote> {
        match self {
            Outcome::Success(quote) => Some(quote),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiSecrets {
    pub base: String,
    pub key: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProviderSettings {
    pub timeout: Duration,
    pub yahoo_base: String,
    pub yahoo_proxy: Option<String>,
    pub twelve_data: ApiSecrets,
    pub alpha_vantage: ApiSecrets,
    pub finnhub: ApiSecrets,
    pub polygon: ApiSecrets,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        let secrets = |base: &str| ApiSecrets {
            base: base.to_string(),
            key: DEFAULT_API_KEY.to_string(),
        };

        ProviderSettings {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            yahoo_base: yahoo::BASE_URL.to_string(),
            yahoo_proxy: None,
            twelve_data: secrets(twelve_data::BASE_URL),
            alpha_vantage: secrets(alpha_vantage::BASE_URL),
            finnhub: secrets(finnhub::BASE_URL),
            polygon: secrets(polygon::BASE_URL),
        }
    }
}

impl ProviderSettings {
    pub fn from_env() -> Self {
        let secrets = |base_variable: &str, key_variable: &str, base: &str| ApiSecrets {
            base: env::var(base_variable).unwrap_or(base.to_string()),
            key: env::var(key_variable).unwrap_or(DEFAULT_API_KEY.to_string()),
        };

        let timeout = env::var("PROVIDER_TIMEOUT_SECONDS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS);

        ProviderSettings {
            timeout: Duration::from_secs(timeout),
            yahoo_base: env::var("YAHOO_BASE_URL").unwrap_or(yahoo::BASE_URL.to_string()),
            yahoo_proxy: env::var("YAHOO_PROXY_URL")
                .ok()
                .filter(|value| !value.trim().is_empty()),
            twelve_data: secrets(
                "TWELVE_DATA_BASE_URL",
                "TWELVE_DATA_API_KEY",
                twelve_data::BASE_URL,
            ),
            alpha_vantage: secrets(
                "ALPHA_VANTAGE_BASE_URL",
                "ALPHA_VANTAGE_API_KEY",
                alpha_vantage::BASE_URL,
            ),
            finnhub: secrets("FINNHUB_BASE_URL", "FINNHUB_API_KEY", finnhub::BASE_URL),
            polygon: secrets("POLYGON_BASE_URL", "POLYGON_API_KEY", polygon::BASE_URL),
        }
    }

    pub fn http_client(&self) -> Result<HTTPClient, Error> {
        Ok(HTTPClient::builder().timeout(self.timeout).build()?)
    }
}

pub fn build(
    kind: ProviderKind,
    settings: &ProviderSettings,
    http_client: HTTPClient,
) -> Arc<dyn Provider> {
    match kind {
        ProviderKind::Yahoo => Arc::new(yahoo::Client::new(
            http_client,
            settings.yahoo_base.clone(),
            settings.yahoo_proxy.clone(),
        )),
        ProviderKind::TwelveData => Arc::new(twelve_data::Client::new(
            http_client,
            settings.twelve_data.clone(),
        )),
        ProviderKind::AlphaVantage => Arc::new(alpha_vantage::Client::new(
            http_client,
            settings.alpha_vantage.clone(),
        )),
        ProviderKind::Finnhub => Arc::new(finnhub::Client::new(
            http_client,
            settings.finnhub.clone(),
        )),
        ProviderKind::Polygon => Arc::new(polygon::Client::new(
            http_client,
            settings.polygon.clone(),
        )),
    }
}

/// Builds the given providers on one shared HTTP client.
pub fn build_all(
    kinds: &[ProviderKind],
    settings: &ProviderSettings,
) -> Result<Vec<Arc<dyn Provider>>, Error> {
    let http_client = settings.http_client()?;

    Ok(kinds
        .iter()
        .map(|kind| build(*kind, settings, http_client.clone()))
        .collect())
}

/// Sends the request and decodes a JSON body, folding transport and status
/// failures into the provider error taxonomy.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    provider: ProviderKind,
    request: RequestBuilder,
) -> Result<T, Error> {
    let response = request
        .header("accept", "application/json")
        .send()
        .await
        .map_err(|error| transport_error(provider, error))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::from_status(provider, status));
    }

    let body = response
        .text()
        .await
        .map_err(|error| transport_error(provider, error))?;

    Ok(serde_json::from_str(&body)?)
}

fn transport_error(provider: ProviderKind, error: reqwest::Error) -> Error {
    if error.is_timeout() {
        Error::Timeout { provider }
    } else {
        Error::Http(error)
    }
}

/// Providers disagree on whether numbers are JSON numbers or strings.
pub(crate) fn as_number(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => Decimal::from_str(&number.to_string()).ok(),
        Value::String(text) => Decimal::from_str(text.trim()).ok(),
        _ => None,
    }
}
