use crate::errors::Error;
use crate::mock;
use crate::state::State;
use axum::{
    extract::{Path, State as AxumState},
    Json,
};
use chrono::Local;
use marketpulse::quote::{Quote, Symbol};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

const BATCH_CONCURRENCY: usize = 5;

const MAX_SYMBOL_LENGTH: usize = 20;

#[derive(Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

#[derive(Deserialize)]
pub struct BatchRequest {
    pub symbols: Vec<String>,
}

/// Accepts tickers like `AAPL`, `BRK.B`, `BTC-USD`, `^GSPC` and `EURUSD=X`.
pub fn parse_symbol(raw: &str) -> Result<Symbol, Error> {
    let trimmed = raw.trim();

    let valid = !trimmed.is_empty()
        && trimmed.len() <= MAX_SYMBOL_LENGTH
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '^' | '.' | '-' | '='));

    if valid {
        Ok(Symbol::new(trimmed))
    } else {
        Err(Error::InvalidSymbol(raw.to_string()))
    }
}

/// Cached quote, else the provider chain, else mock data. Only real quotes
/// are cached.
pub async fn quote_for(state: &State, symbol: &Symbol) -> Quote {
    if let Some(quote) = state.cache.get(symbol).await {
        debug!("serving {} from cache", symbol);
        return quote;
    }

    match state.chain.fetch(symbol).await.quote {
        Some(quote) => {
            state.cache.insert(quote.clone()).await;
            quote
        }
        None => {
            warn!("all providers failed for {}, using mock data", symbol);
            mock::enhanced(symbol, Local::now())
        }
    }
}

pub async fn get(
    AxumState(state): AxumState<State>,
    Path(symbol): Path<String>,
) -> Result<Json<Envelope<Quote>>, Error> {
    let symbol = parse_symbol(&symbol)?;

    let quote = quote_for(&state, &symbol).await;

    info!(
        "{}: {} from {}",
        symbol, quote.price, quote.data_source
    );

    Ok(Json(Envelope {
        success: true,
        data: quote,
    }))
}

pub async fn batch(
    AxumState(state): AxumState<State>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<Envelope<BTreeMap<String, Quote>>>, Error> {
    let mut symbols: Vec<Symbol> = Vec::with_capacity(request.symbols.len());
    for raw in &request.symbols {
        let symbol = parse_symbol(raw)?;
        if !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }

    info!("batch request for {} symbols", symbols.len());

    let mut results = BTreeMap::new();
    let mut missing = Vec::new();

    for symbol in symbols {
        match state.cache.get(&symbol).await {
            Some(quote) => {
                results.insert(symbol.to_string(), quote);
            }
            None => missing.push(symbol),
        }
    }

    for report in state.chain.fetch_all(&missing, BATCH_CONCURRENCY).await {
        let quote = match report.quote {
            Some(quote) => {
                state.cache.insert(quote.clone()).await;
                quote
            }
            None => mock::enhanced(&report.symbol, Local::now()),
        };
        results.insert(report.symbol.to_string(), quote);
    }

    Ok(Json(Envelope {
        success: true,
        data: results,
    }))
}
