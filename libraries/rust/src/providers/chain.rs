//! Ordered provider fallback with a shared deadline and per-provider
//! circuit breakers.

use crate::providers::{Outcome, Provider, ProviderKind};
use crate::quote::{Quote, Symbol};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{timeout, Instant};
use tracing::{debug, info, warn};

const DEADLINE_EXCEEDED: &str = "deadline exceeded";

pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainPolicy {
    /// Budget shared by every provider call of one `fetch`.
    pub deadline: Duration,
    pub failure_threshold: u32,
    pub cooldown: Duration,
}

impl Default for ChainPolicy {
    fn default() -> Self {
        ChainPolicy {
            deadline: DEFAULT_DEADLINE,
            failure_threshold: 3,
            cooldown: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Attempt {
    Called {
        provider: ProviderKind,
        outcome: Outcome,
    },
    Skipped {
        provider: ProviderKind,
    },
}

impl Attempt {
    pub fn provider(&self) -> ProviderKind {
        match self {
            Attempt::Called { provider, .. } | Attempt::Skipped { provider } => *provider,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChainReport {
    pub symbol: Symbol,
    pub quote: Option<Quote>,
    pub attempts: Vec<Attempt>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BreakerState {
    Closed,
    Open { since: Instant },
    /// A trial call started at `since` and has not reported back yet.
    HalfOpen { since: Instant },
}

#[derive(Debug, Clone, Copy)]
struct Breaker {
    consecutive_failures: u32,
    state: BreakerState,
}

impl Default for Breaker {
    fn default() -> Self {
        Breaker {
            consecutive_failures: 0,
            state: BreakerState::Closed,
        }
    }
}

impl Breaker {
    /// Whether a call may go through. An open breaker whose cooldown has
    /// elapsed lets exactly one trial call through. A trial that never
    /// reports back, because its future was dropped, is replaced by a new
    /// one after another cooldown.
    fn admit(&mut self, cooldown: Duration, now: Instant) -> bool {
        match self.state {
            BreakerState::Closed => true,
            BreakerState::Open { since } | BreakerState::HalfOpen { since }
                if now.duration_since(since) >= cooldown =>
            {
                self.state = BreakerState::HalfOpen { since: now };
                true
            }
            BreakerState::Open { .. } | BreakerState::HalfOpen { .. } => false,
        }
    }

    fn record_success(&mut self) {
        self.consecutive_failures = 0;
        self.state = BreakerState::Closed;
    }

    /// Returns true when this failure opened the breaker.
    fn record_failure(&mut self, threshold: u32, now: Instant) -> bool {
        self.consecutive_failures += 1;

        let opens = match self.state {
            BreakerState::HalfOpen { .. } => true,
            BreakerState::Closed => self.consecutive_failures >= threshold,
            BreakerState::Open { .. } => false,
        };

        if opens {
            self.state = BreakerState::Open { since: now };
        }
        opens
    }
}

pub struct ProviderChain {
    providers: Vec<Arc<dyn Provider>>,
    policy: ChainPolicy,
    breakers: Mutex<HashMap<ProviderKind, Breaker>>,
}

impl ProviderChain {
    pub fn new(providers: Vec<Arc<dyn Provider>>, policy: ChainPolicy) -> Self {
        ProviderChain {
            providers,
            policy,
            breakers: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> ChainPolicy {
        self.policy
    }

    pub fn kinds(&self) -> Vec<ProviderKind> {
        self.providers.iter().map(|provider| provider.kind()).collect()
    }

    /// Tries each provider in order until one returns a usable quote.
    pub async fn fetch(&self, symbol: &Symbol) -> ChainReport {
        let started = Instant::now();
        let mut attempts = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            let kind = provider.kind();

            let remaining = self.policy.deadline.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                attempts.push(Attempt::Called {
                    provider: kind,
                    outcome: Outcome::Unavailable(DEADLINE_EXCEEDED.to_string()),
                });
                continue;
            }

            if !self.admit(kind) {
                debug!("{} breaker open, skipping {}", kind, symbol);
                attempts.push(Attempt::Skipped { provider: kind });
                continue;
            }

            let outcome = match timeout(remaining, provider.quote(symbol)).await {
                Ok(result) => Outcome::from_result(result),
                Err(_) => Outcome::Unavailable(DEADLINE_EXCEEDED.to_string()),
            };

            self.record(kind, &outcome);

            match &outcome {
                Outcome::Success(quote) => info!("{} served {} at {}", kind, symbol, quote.price),
                Outcome::RateLimited(reason) => {
                    warn!("{} rate limited {}: {}", kind, symbol, reason)
                }
                Outcome::Unavailable(reason) => info!("{} failed for {}: {}", kind, symbol, reason),
            }

            let quote = outcome.quote().cloned();
            attempts.push(Attempt::Called {
                provider: kind,
                outcome,
            });

            if quote.is_some() {
                return ChainReport {
                    symbol: symbol.clone(),
                    quote,
                    attempts,
                };
            }
        }

        warn!("all providers failed for {}", symbol);

        ChainReport {
            symbol: symbol.clone(),
            quote: None,
            attempts,
        }
    }

    /// Runs `fetch` for several symbols with at most `concurrency` in flight.
    /// Reports come back in input order.
    pub async fn fetch_all(&self, symbols: &[Symbol], concurrency: usize) -> Vec<ChainReport> {
        let mut reports: Vec<(usize, ChainReport)> = stream::iter(0..symbols.len())
            .map(|index| {
                let symbol = &symbols[index];
                async move { (index, self.fetch(symbol).await) }
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;

        reports.sort_by_key(|(index, _)| *index);
        reports.into_iter().map(|(_, report)| report).collect()
    }

    /// Asks every provider for the symbol, one after another, ignoring the
    /// breakers. Each call gets the full deadline.
    pub async fn probe(&self, symbol: &Symbol) -> Vec<(ProviderKind, Outcome)> {
        let mut outcomes = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            let outcome = match timeout(self.policy.deadline, provider.quote(symbol)).await {
                Ok(result) => Outcome::from_result(result),
                Err(_) => Outcome::Unavailable(DEADLINE_EXCEEDED.to_string()),
            };
            outcomes.push((provider.kind(), outcome));
        }

        outcomes
    }

    fn admit(&self, kind: ProviderKind) -> bool {
        match self.breakers.lock() {
            Ok(mut breakers) => breakers
                .entry(kind)
                .or_default()
                .admit(self.policy.cooldown, Instant::now()),
            Err(_) => true,
        }
    }

    fn record(&self, kind: ProviderKind, outcome: &Outcome) {
        let Ok(mut breakers) = self.breakers.lock() else {
            return;
        };
        let breaker = breakers.entry(kind).or_default();

        if outcome.is_success() {
            breaker.record_success();
        } else if breaker.record_failure(self.policy.failure_threshold, Instant::now()) {
            warn!(
                "{} breaker opened after {} consecutive failures",
                kind, breaker.consecutive_failures
            );
        }
    }
}
