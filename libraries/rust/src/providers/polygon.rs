use crate::errors::Error;
use crate::providers::{fetch_json, ApiSecrets, Provider, ProviderKind};
use crate::quote::{change_between, Quote, Symbol};
use async_trait::async_trait;
use reqwest::Client as HTTPClient;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

pub const BASE_URL: &str = "https://api.polygon.io";

#[derive(Deserialize, Debug)]
struct BarResult {
    c: Decimal,
    o: Decimal,
    h: Option<Decimal>,
    l: Option<Decimal>,
    v: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct PreviousCloseResponse {
    status: Option<String>,
    results: Option<Vec<BarResult>>,
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
        ProviderKind::Polygon
    }

    /// Previous-day aggregate; change is measured against the day's open.
    async fn quote(&self, symbol: &Symbol) -> Result<Quote, Error> {
        let url = format!(
            "{}/v2/aggs/ticker/{}/prev",
            self.base_url.trim_end_matches('/'),
            symbol
        );

        debug!("requesting {}", url);

        let request = self
            .http_client
            .get(&url)
            .query(&[("adjusted", "true"), ("apiKey", self.api_key.as_str())]);

        let response: PreviousCloseResponse = fetch_json(self.kind(), request).await?;

        let bar = response
            .results
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| {
                Error::no_data(
                    self.kind(),
                    format!(
                        "no results (status {})",
                        response.status.as_deref().unwrap_or("unknown")
                    ),
                )
            })?;

        let (change, change_percent) = change_between(bar.c, bar.o);

        Ok(Quote::new(symbol.clone(), bar.c, self.kind().data_source())
            .with_change(change, change_percent)
            .with_range(Some(bar.o), bar.h, bar.l)
            .with_previous_close(Some(bar.o))
            .with_volume(bar.v.map(|volume| volume as u64)))
    }
}
