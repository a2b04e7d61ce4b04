use crate::errors::Error;
use crate::providers::{fetch_json, Provider, ProviderKind};
use crate::quote::{change_between, Quote, Symbol};
use async_trait::async_trait;
use reqwest::Client as HTTPClient;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;
use url::form_urlencoded::byte_serialize;

pub const BASE_URL: &str = "https://query1.finance.yahoo.com";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<Decimal>,
    regular_market_change: Option<Decimal>,
    previous_close: Option<Decimal>,
    chart_previous_close: Option<Decimal>,
    regular_market_open: Option<Decimal>,
    regular_market_day_high: Option<Decimal>,
    regular_market_day_low: Option<Decimal>,
    regular_market_volume: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    meta: Option<ChartMeta>,
}

#[derive(Deserialize, Debug)]
struct ChartError {
    description: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Clone)]
pub struct Client {
    base_url: String,
    proxy_url: Option<String>,
    http_client: HTTPClient,
}

impl Client {
    pub fn new(http_client: HTTPClient, base_url: String, proxy_url: Option<String>) -> Self {
        Client {
            base_url,
            proxy_url,
            http_client,
        }
    }

    fn chart_url(&self, symbol: &Symbol) -> String {
        let target = format!(
            "{}/v8/finance/chart/{}",
            self.base_url.trim_end_matches('/'),
            symbol
        );

        match &self.proxy_url {
            Some(proxy_url) => {
                let encoded: String = byte_serialize(target.as_bytes()).collect();
                format!("{}{}", proxy_url, encoded)
            }
            None => target,
        }
    }
}

#[async_trait]
impl Provider for Client {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Yahoo
    }

    async fn quote(&self, symbol: &Symbol) -> Result<Quote, Error> {
        let url = self.chart_url(symbol);

        debug!("requesting {}", url);

        let request = self
            .http_client
            .get(&url)
            .header("user-agent", USER_AGENT);

        let response: ChartResponse = fetch_json(self.kind(), request).await?;

        if let Some(error) = response.chart.error {
            return Err(Error::no_data(
                self.kind(),
                error
                    .description
                    .unwrap_or_else(|| "chart error".to_string()),
            ));
        }

        let meta = response
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .and_then(|result| result.meta)
            .ok_or_else(|| Error::no_data(self.kind(), "chart result missing"))?;

        let price = meta
            .regular_market_price
            .filter(|price| *price > Decimal::ZERO)
            .ok_or_else(|| Error::no_data(self.kind(), "regularMarketPrice missing"))?;

        let previous_close = meta.previous_close.or(meta.chart_previous_close);

        let (change, change_percent) = match (meta.regular_market_change, previous_close) {
            (Some(change), Some(previous_close)) if !previous_close.is_zero() => {
                (change, change / previous_close * Decimal::ONE_HUNDRED)
            }
            (Some(change), _) => (change, Decimal::ZERO),
            (None, Some(previous_close)) => change_between(price, previous_close),
            (None, None) => (Decimal::ZERO, Decimal::ZERO),
        };

        Ok(Quote::new(symbol.clone(), price, self.kind().data_source())
            .with_change(change, change_percent)
            .with_range(
                meta.regular_market_open,
                meta.regular_market_day_high,
                meta.regular_market_day_low,
            )
            .with_previous_close(previous_close)
            .with_volume(meta.regular_market_volume))
    }
}
