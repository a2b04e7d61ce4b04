use crate::errors::Error;
use crate::providers::{fetch_json, ApiSecrets, Provider, ProviderKind};
use crate::quote::{change_between, Quote, Symbol};
use async_trait::async_trait;
use reqwest::Client as HTTPClient;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

pub const BASE_URL: &str = "https://finnhub.io";

#[derive(Deserialize, Debug)]
struct QuoteResponse {
    #[serde(rename = "c")]
    current: Option<Decimal>,
    #[serde(rename = "d")]
    change: Option<Decimal>,
    #[serde(rename = "dp")]
    change_percent: Option<Decimal>,
    #[serde(rename = "h")]
    high: Option<Decimal>,
    #[serde(rename = "l")]
    low: Option<Decimal>,
    #[serde(rename = "o")]
    open: Option<Decimal>,
    #[serde(rename = "pc")]
    previous_close: Option<Decimal>,
}

#[derive(Clone)]
pub struct Client {
    base_url: String,
    token: String,
    http_client: HTTPClient,
}

impl Client {
    pub fn new(http_client: HTTPClient, secrets: ApiSecrets) -> Self {
        Client {
            base_url: secrets.base,
            token: secrets.key,
            http_client,
        }
    }
}

#[async_trait]
impl Provider for Client {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Finnhub
    }

    async fn quote(&self, symbol: &Symbol) -> Result<Quote, Error> {
        let url = format!("{}/api/v1/quote", self.base_url.trim_end_matches('/'));

        debug!("requesting {} for {}", url, symbol);

        let request = self
            .http_client
            .get(&url)
            .query(&[("symbol", symbol.as_str()), ("token", self.token.as_str())]);

        let response: QuoteResponse = fetch_json(self.kind(), request).await?;

        // unknown symbols come back as an all-zero quote
        let price = response
            .current
            .filter(|price| *price > Decimal::ZERO)
            .ok_or_else(|| Error::no_data(self.kind(), "no current price"))?;

        let (change, change_percent) = match (response.change, response.change_percent) {
            (Some(change), Some(change_percent)) => (change, change_percent),
            _ => response
                .previous_close
                .map(|previous_close| change_between(price, previous_close))
                .unwrap_or_default(),
        };

        Ok(Quote::new(symbol.clone(), price, self.kind().data_source())
            .with_change(change, change_percent)
            .with_range(response.open, response.high, response.low)
            .with_previous_close(response.previous_close))
    }
}
