use crate::reports::Tally;
use marketpulse::providers::chain::ProviderChain;
use marketpulse::providers::{Outcome, ProviderKind};
use marketpulse::quote::{format_price_change, round_to, Symbol};
use std::io::Write;
use tracing::info;

fn summary(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::Yahoo => "Best for real-time data (no API key required)",
        ProviderKind::TwelveData => "Free tier with real stock prices",
        ProviderKind::AlphaVantage => "Free tier with detailed quotes",
        ProviderKind::Finnhub => "Free tier with real-time quotes",
        ProviderKind::Polygon => "Free tier with historical data",
    }
}

/// `✅ Finnhub: $189.12 (+1.23%)`. Twelve Data only reports a price.
pub fn outcome_line(kind: ProviderKind, outcome: &Outcome) -> String {
    match outcome {
        Outcome::Success(quote) if kind == ProviderKind::TwelveData => {
            format!("✅ {}: ${:.2}", kind, round_to(quote.price, 2))
        }
        Outcome::Success(quote) => format!(
            "✅ {}: {}",
            kind,
            format_price_change(quote.price, quote.change, quote.change_percent)
        ),
        Outcome::RateLimited(reason) => format!("❌ {}: {}", kind, reason),
        Outcome::Unavailable(reason) => format!("❌ {}: {}", kind, reason),
    }
}

pub async fn run(
    chain: &ProviderChain,
    symbols: &[String],
    out: &mut dyn Write,
) -> anyhow::Result<Tally> {
    let mut tally = Tally::default();

    writeln!(out, "🧪 Testing Real Stock Data Sources...\n")?;

    for symbol in symbols {
        let symbol = Symbol::new(symbol);
        writeln!(out, "📊 Testing {}:", symbol)?;

        for (kind, outcome) in chain.probe(&symbol).await {
            info!("{} {}: success={}", symbol, kind, outcome.is_success());
            if outcome.is_success() {
                tally.pass();
            } else {
                tally.fail();
            }
            writeln!(out, "  {}", outcome_line(kind, &outcome))?;
        }

        writeln!(out)?;
    }

    writeln!(out, "🎯 Summary:")?;
    for kind in chain.kinds() {
        writeln!(out, "- {}: {}", kind, summary(kind))?;
    }
    writeln!(
        out,
        "\n🚀 Your Market Pulse platform will use the best available data source!"
    )?;

    Ok(tally)
}
