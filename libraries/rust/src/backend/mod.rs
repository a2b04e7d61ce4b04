//! Client for the local stock-data facade (`/api/health`, `/api/stock`,
//! `/api/stocks`, `/api/indices`).

use crate::errors::Error;
use crate::providers::chain::DEFAULT_DEADLINE;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{Client as HTTPClient, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::time::Duration;
use tracing::debug;
use url::form_urlencoded::byte_serialize;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5003";

/// Outlasts the facade's own provider deadline so a slow lookup that still
/// succeeds is not reported as a transport failure.
pub const REQUEST_TIMEOUT: Duration = DEFAULT_DEADLINE.saturating_add(Duration::from_secs(5));

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Health {
    pub status: String,
    pub cache_size: u64,
    pub timestamp: String,
}

impl Health {
    /// Accepts RFC 3339 as well as the naive ISO 8601 form Python backends
    /// emit (`2024-06-14T20:00:00.123456`), read as UTC.
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|timestamp| timestamp.and_utc())
        })
}

/// One stock as the facade reports it. Only `price` is required.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockData {
    pub symbol: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub change: f64,
    #[serde(default)]
    pub change_percent: f64,
    pub data_source: Option<String>,
    #[serde(default)]
    pub is_real_time: bool,
    pub timestamp: Option<String>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub previous_close: Option<f64>,
    pub volume: Option<f64>,
}

impl StockData {
    pub fn source(&self) -> &str {
        self.data_source.as_deref().unwrap_or("unknown")
    }

    pub fn is_mock(&self) -> bool {
        self.source() == "enhanced-mock" || !self.is_real_time
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub name: String,
    pub value: String,
    pub change: String,
    pub percent: String,
    pub trend: String,
}

#[derive(Deserialize, Debug)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T> Envelope<T> {
    fn into_data(self) -> Result<T, Error> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (_, _) => Err(Error::Backend(
                self.error
                    .unwrap_or_else(|| "response reported no success".to_string()),
            )),
        }
    }
}

#[derive(Serialize)]
struct BatchRequest<'a> {
    symbols: &'a [String],
}

#[derive(Clone)]
pub struct Client {
    base_url: String,
    http_client: HTTPClient,
}

impl Client {
    pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
        let http_client = HTTPClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Client {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    pub fn from_env() -> Result<Self, Error> {
        let base_url =
            env::var("MARKETPULSE_BACKEND_URL").unwrap_or(DEFAULT_BASE_URL.to_string());
        Client::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<Health, Error> {
        let url = format!("{}/api/health", self.base_url);
        send_json(self.http_client.get(&url)).await
    }

    pub async fn stock(&self, symbol: &str) -> Result<StockData, Error> {
        let encoded: String = byte_serialize(symbol.as_bytes()).collect();
        let url = format!("{}/api/stock/{}", self.base_url, encoded);

        let envelope: Envelope<StockData> = send_json(self.http_client.get(&url)).await?;
        envelope.into_data()
    }

    pub async fn stocks(&self, symbols: &[String]) -> Result<BTreeMap<String, StockData>, Error> {
        let url = format!("{}/api/stocks", self.base_url);

        let request = self
            .http_client
            .post(&url)
            .json(&BatchRequest { symbols });

        let envelope: Envelope<BTreeMap<String, StockData>> = send_json(request).await?;
        envelope.into_data()
    }

    pub async fn indices(&self) -> Result<BTreeMap<String, Vec<IndexEntry>>, Error> {
        let url = format!("{}/api/indices", self.base_url);

        let envelope: Envelope<BTreeMap<String, Vec<IndexEntry>>> =
            send_json(self.http_client.get(&url)).await?;
        envelope.into_data()
    }
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, Error> {
    let response = request.send().await?;

    let status = response.status();
    debug!("backend responded {} for {}", status, response.url());

    let body = response.text().await?;
    if !status.is_success() {
        let reason = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
            .ok()
            .and_then(|envelope| envelope.error)
            .unwrap_or_else(|| status.to_string());
        return Err(Error::Backend(format!("HTTP {}: {}", status.as_u16(), reason)));
    }

    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn stock_json(symbol: &str, price: f64, source: &str) -> serde_json::Value {
        json!({
            "symbol": symbol,
            "price": price,
            "change": 1.25,
            "changePercent": 0.66,
            "dataSource": source,
            "isRealTime": source != "enhanced-mock",
            "timestamp": "2024-06-14T20:00:00.123456",
            "high": price + 1.0,
            "low": price - 1.0,
            "volume": 1234567,
            "open": price,
            "previousClose": price
        })
    }

    #[tokio::test]
    async fn test_health() {
        let mut mock_server = mockito::Server::new_async().await;

        mock_server
            .mock("GET", "/api/health")
            .with_status(200)
            .with_body(
                json!({"status": "healthy", "cache_size": 4, "timestamp": "2024-06-14T20:00:00.123456"})
                    .to_string(),
            )
            .create_async()
            .await;

        let client = Client::new(mock_server.url()).expect("failed to build client");

        let health = client.health().await.expect("health failed");

        assert_eq!(health.status, "healthy");
        assert_eq!(health.cache_size, 4);
        assert!(health.parsed_timestamp().is_some());
    }

    #[test]
    fn test_request_timeout_outlasts_chain_deadline() {
        use crate::providers::chain::ChainPolicy;

        assert!(REQUEST_TIMEOUT > ChainPolicy::default().deadline);
        assert!(REQUEST_TIMEOUT > crate::providers::ProviderSettings::default().timeout);
    }

    #[test]
    fn test_parse_timestamp() {
        assert!(parse_timestamp("2024-06-14T20:00:00Z").is_some());
        assert!(parse_timestamp("2024-06-14T20:00:00+02:00").is_some());
        assert!(parse_timestamp("2024-06-14T20:00:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[tokio::test]
    async fn test_stock_encodes_index_symbol() {
        let mut mock_server = mockito::Server::new_async().await;

        mock_server
            .mock("GET", "/api/stock/%5EGSPC")
            .with_status(200)
            .with_body(
                json!({"success": true, "data": stock_json("^GSPC", 5431.6, "yahoo-finance")})
                    .to_string(),
            )
            .create_async()
            .await;

        let client = Client::new(mock_server.url()).expect("failed to build client");

        let stock = client.stock("^GSPC").await.expect("stock failed");

        assert_eq!(stock.price, 5431.6);
        assert_eq!(stock.source(), "yahoo-finance");
        assert!(!stock.is_mock());
        assert_eq!(stock.volume, Some(1234567.0));
    }

    #[tokio::test]
    async fn test_stock_error_status_carries_message() {
        let mut mock_server = mockito::Server::new_async().await;

        mock_server
            .mock("GET", "/api/stock/AAPL")
            .with_status(500)
            .with_body(
                json!({"success": false, "error": "upstream exploded", "data": stock_json("AAPL", 178.2, "enhanced-mock")})
                    .to_string(),
            )
            .create_async()
            .await;

        let client = Client::new(mock_server.url()).expect("failed to build client");

        let error = client.stock("AAPL").await.expect_err("expected failure");

        assert_eq!(
            error.to_string(),
            "Backend error: HTTP 500: upstream exploded"
        );
    }

    #[tokio::test]
    async fn test_stocks_batch() {
        let mut mock_server = mockito::Server::new_async().await;

        mock_server
            .mock("POST", "/api/stocks")
            .match_body(Matcher::Json(json!({"symbols": ["AAPL", "MSFT"]})))
            .with_status(200)
            .with_body(
                json!({
                    "success": true,
                    "data": {
                        "AAPL": stock_json("AAPL", 189.5, "finnhub"),
                        "MSFT": stock_json("MSFT", 378.45, "enhanced-mock")
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = Client::new(mock_server.url()).expect("failed to build client");

        let stocks = client
            .stocks(&["AAPL".to_string(), "MSFT".to_string()])
            .await
            .expect("batch failed");

        assert_eq!(stocks.len(), 2);
        assert_eq!(stocks["AAPL"].price, 189.5);
        assert!(stocks["MSFT"].is_mock());
    }

    #[tokio::test]
    async fn test_indices() {
        let mut mock_server = mockito::Server::new_async().await;

        mock_server
            .mock("GET", "/api/indices")
            .with_status(200)
            .with_body(
                json!({
                    "success": true,
                    "data": {
                        "US": [{"name": "S&P 500", "value": "4,567.89", "change": "+12.34", "percent": "+0.27%", "trend": "up"}],
                        "Crypto": []
                    },
                    "timestamp": "2024-06-14T20:00:00"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = Client::new(mock_server.url()).expect("failed to build client");

        let indices = client.indices().await.expect("indices failed");

        assert_eq!(indices["US"][0].name, "S&P 500");
        assert_eq!(indices["US"][0].trend, "up");
        assert!(indices["Crypto"].is_empty());
    }

    #[tokio::test]
    async fn test_unsuccessful_envelope() {
        let mut mock_server = mockito::Server::new_async().await;

        mock_server
            .mock("GET", "/api/indices")
            .with_status(200)
            .with_body(json!({"success": false, "error": "no indices"}).to_string())
            .create_async()
            .await;

        let client = Client::new(mock_server.url()).expect("failed to build client");

        let result = client.indices().await;

        assert!(matches!(result, Err(Error::Backend(reason)) if reason == "no indices"));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let client = Client::new("http://127.0.0.1:9").expect("failed to build client");

        let error = client.health().await.expect_err("expected connection failure");

        assert!(error.is_connection_refused());
    }
}
