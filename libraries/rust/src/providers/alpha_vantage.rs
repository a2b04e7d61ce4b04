use crate::errors::Error;
use crate::providers::{fetch_json, ApiSecrets, Provider, ProviderKind};
use crate::quote::{parse_percent, Quote, Symbol};
use async_trait::async_trait;
use reqwest::Client as HTTPClient;
use serde::Deserialize;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, warn};

pub const BASE_URL: &str = "https://www.alphavantage.co";

#[derive(Deserialize, Debug)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<HashMap<String, String>>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

#[derive(Clone)]
pub struct Client {
    base_url: String,
    api_key: String,
    http_client: HTTPClient,
}

impl Client {
    pub fn new(http_client: HTTPClient, secrets: ApiSecrets) -> Self {
        Client {
            base_url: secrets.base,
            api_key: secrets.key,
            http_client,
        }
    }
}

fn field(fields: &HashMap<String, String>, key: &str) -> Option<Decimal> {
    fields
        .get(key)
        .and_then(|value| Decimal::from_str(value.trim()).ok())
}

#[async_trait]
impl Provider for Client {
    fn kind(&self) -> ProviderKind {
        ProviderKind::AlphaVantage
    }

    async fn quote(&self, symbol: &Symbol) -> Result<Quote, Error> {
        let url = format!("{}/query", self.base_url.trim_end_matches('/'));

        debug!("requesting {} for {}", url, symbol);

        let request = self.http_client.get(&url).query(&[
            ("function", "GLOBAL_QUOTE"),
            ("symbol", symbol.as_str()),
            ("apikey", self.api_key.as_str()),
        ]);

        let response: GlobalQuoteResponse = fetch_json(self.kind(), request).await?;

        // throttled responses come back as 200 with an explanatory note
        if let Some(note) = response.note.or(response.information) {
            warn!("Alpha Vantage throttled {}: {}", symbol, note);
            return Err(Error::RateLimited {
                provider: self.kind(),
            });
        }

        if let Some(message) = response.error_message {
            return Err(Error::no_data(self.kind(), message));
        }

        let fields = response
            .global_quote
            .filter(|fields| !fields.is_empty())
            .ok_or_else(|| Error::no_data(self.kind(), "Global Quote missing"))?;

        let price = field(&fields, "05. price")
            .ok_or_else(|| Error::no_data(self.kind(), "price missing"))?;

        let change = field(&fields, "09. change").unwrap_or_default();

        let change_percent = fields
            .get("10. change percent")
            .and_then(|value| parse_percent(value))
            .unwrap_or_default();

        Ok(Quote::new(symbol.clone(), price, self.kind().data_source())
            .with_change(change, change_percent)
            .with_range(
                field(&fields, "02. open"),
                field(&fields, "03. high"),
                field(&fields, "04. low"),
            )
            .with_previous_close(field(&fields, "08. previous close"))
            .with_volume(
                fields
                    .get("06. volume")
                    .and_then(|volume| volume.trim().parse::<u64>().ok()),
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::DataSource;
    use mockito::Matcher;
    use serde_json::json;

    fn client(base_url: String) -> Client {
        Client::new(
            HTTPClient::new(),
            ApiSecrets {
                base: base_url,
                key: "alpha_vantage_api_key".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_quote() {
        let mut mock_server = mockito::Server::new_async().await;

        let mock_response = json!({
            "Global Quote": {
                "01. symbol": "MSFT",
                "02. open": "420.0000",
                "03. high": "425.5000",
                "04. low": "418.2500",
                "05. price": "424.1000",
                "06. volume": "18734522",
                "07. latest trading day": "2024-06-14",
                "08. previous close": "421.0000",
                "09. change": "3.1000",
                "10. change percent": "0.7363%"
            }
        });

        mock_server
            .mock("GET", "/query")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("function".into(), "GLOBAL_QUOTE".into()),
                Matcher::UrlEncoded("symbol".into(), "MSFT".into()),
                Matcher::UrlEncoded("apikey".into(), "alpha_vantage_api_key".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(mock_response.to_string())
            .create_async()
            .await;

        let quote = client(mock_server.url())
            .quote(&Symbol::new("MSFT"))
            .await
            .expect("quote failed");

        assert_eq!(quote.price, Decimal::new(4241, 1));
        assert_eq!(quote.change, Decimal::new(31, 1));
        assert_eq!(quote.change_percent, Decimal::new(7363, 4));
        assert_eq!(quote.open, Some(Decimal::new(420, 0)));
        assert_eq!(quote.previous_close, Some(Decimal::new(421, 0)));
        assert_eq!(quote.volume, Some(18_734_522));
        assert_eq!(quote.data_source, DataSource::AlphaVantage);
    }

    #[tokio::test]
    async fn test_quote_note_is_rate_limited() {
        let mut mock_server = mockito::Server::new_async().await;

        mock_server
            .mock("GET", "/query")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!({
                    "Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."
                })
                .to_string(),
            )
            .create_async()
            .await;

        let result = client(mock_server.url()).quote(&Symbol::new("MSFT")).await;

        assert!(matches!(result, Err(Error::RateLimited { .. })));
    }

    #[tokio::test]
    async fn test_quote_empty_global_quote_is_no_data() {
        let mut mock_server = mockito::Server::new_async().await;

        mock_server
            .mock("GET", "/query")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"Global Quote": {}}).to_string())
            .create_async()
            .await;

        let result = client(mock_server.url()).quote(&Symbol::new("NOPE")).await;

        assert!(matches!(result, Err(Error::NoData { .. })));
    }
}
