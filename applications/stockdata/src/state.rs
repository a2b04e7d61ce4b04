use crate::cache::QuoteCache;
use marketpulse::providers::chain::{ChainPolicy, ProviderChain};
use marketpulse::providers::{build_all, Provider, ProviderKind, ProviderSettings};
use marketpulse::Error;
use std::env;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_PORT: u16 = 5003;

const DEFAULT_CACHE_SECONDS: u64 = 30;

#[derive(Clone, Debug)]
pub struct ServiceSettings {
    pub port: u16,
    pub cache_duration: Duration,
    pub providers: ProviderSettings,
    pub policy: ChainPolicy,
}

impl ServiceSettings {
    pub fn from_env() -> Self {
        let port = env::var("SERVER_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let cache_seconds = env::var("CACHE_DURATION_SECONDS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_CACHE_SECONDS);

        Self {
            port,
            cache_duration: Duration::from_secs(cache_seconds),
            providers: ProviderSettings::from_env(),
            policy: ChainPolicy::default(),
        }
    }
}

#[derive(Clone)]
pub struct State {
    pub chain: Arc<ProviderChain>,
    pub cache: Arc<QuoteCache>,
}

impl State {
    pub fn new(providers: Vec<Arc<dyn Provider>>, policy: ChainPolicy, cache_duration: Duration) -> Self {
        Self {
            chain: Arc::new(ProviderChain::new(providers, policy)),
            cache: Arc::new(QuoteCache::new(cache_duration)),
        }
    }

    /// Providers in fallback order, sharing one HTTP client.
    pub fn from_settings(settings: &ServiceSettings) -> Result<Self, Error> {
        let providers = build_all(&ProviderKind::FALLBACK_ORDER, &settings.providers)?;

        Ok(Self::new(providers, settings.policy, settings.cache_duration))
    }
}
