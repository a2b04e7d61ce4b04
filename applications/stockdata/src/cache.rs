use marketpulse::quote::{Quote, Symbol};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

struct Entry {
    stored_at: Instant,
    quote: Quote,
}

/// Real quotes keyed by symbol, each valid for `ttl` after it was stored.
pub struct QuoteCache {
    ttl: Duration,
    entries: Mutex<HashMap<Symbol, Entry>>,
}

impl QuoteCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get(&self, symbol: &Symbol) -> Option<Quote> {
        let entries = self.entries.lock().await;

        entries
            .get(symbol)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.quote.clone())
    }

    /// Stores the quote and drops every expired entry.
    pub async fn insert(&self, quote: Quote) {
        let mut entries = self.entries.lock().await;

        let ttl = self.ttl;
        entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);

        debug!("caching {} from {}", quote.symbol, quote.data_source);

        entries.insert(
            quote.symbol.clone(),
            Entry {
                stored_at: Instant::now(),
                quote,
            },
        );
    }

    /// Live entries only.
    pub async fn len(&self) -> usize {
        let entries = self.entries.lock().await;

        entries
            .values()
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
