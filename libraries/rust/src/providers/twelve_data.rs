use crate::errors::Error;
use crate::providers::{as_number, fetch_json, ApiSecrets, Provider, ProviderKind};
use crate::quote::{Quote, Symbol};
use async_trait::async_trait;
use reqwest::Client as HTTPClient;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

pub const BASE_URL: &str = "https://api.twelvedata.com";

#[derive(Deserialize, Debug)]
struct PriceResponse {
    price: Option<Value>,
    status: Option<String>,
    code: Option<u16>,
    message: Option<String>,
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

#[async_trait]
impl Provider for Client {
    fn kind(&self) -> ProviderKind {
        ProviderKind::TwelveData
    }

    async fn quote(&self, symbol: &Symbol) -> Result<Quote, Error> {
        let url = format!("{}/price", self.base_url.trim_end_matches('/'));

        debug!("requesting {} for {}", url, symbol);

        let request = self
            .http_client
            .get(&url)
            .query(&[("symbol", symbol.as_str()), ("apikey", self.api_key.as_str())]);

        let response: PriceResponse = fetch_json(self.kind(), request).await?;

        if response.status.as_deref() == Some("error") {
            if response.code == Some(429) {
                return Err(Error::RateLimited {
                    provider: self.kind(),
                });
            }
            return Err(Error::no_data(
                self.kind(),
                response.message.unwrap_or("error response".to_string()),
            ));
        }

        let price = response
            .price
            .as_ref()
            .and_then(as_number)
            .ok_or_else(|| Error::no_data(self.kind(), "price missing"))?;

        // the price endpoint carries no change information
        Ok(Quote::new(symbol.clone(), price, self.kind().data_source())
            .with_range(Some(price), Some(price), Some(price))
            .with_previous_close(Some(price)))
    }
}
