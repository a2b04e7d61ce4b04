use crate::reports::{write_us_indices, Tally};
use marketpulse::backend::{Client, StockData};
use marketpulse::quote::price_in_cents;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

/// Distinct prices after rounding to cents, as strings in ascending order.
pub fn distinct_prices(prices: &[f64]) -> Vec<String> {
    prices
        .iter()
        .filter_map(|price| price_in_cents(*price))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|cents| format!("{:.2}", cents))
        .collect()
}

/// Symbols to compare across both endpoints: the list, upper-cased and
/// deduplicated, with `focus` appended when missing.
pub fn compared_symbols(focus: &str, symbols: &[String]) -> Vec<String> {
    let mut compared: Vec<String> = Vec::with_capacity(symbols.len() + 1);
    for symbol in symbols.iter().map(|s| s.trim().to_uppercase()).chain([focus.to_string()]) {
        if !symbol.is_empty() && !compared.contains(&symbol) {
            compared.push(symbol);
        }
    }
    compared
}

pub async fn run(
    client: &Client,
    symbol: &str,
    symbols: &[String],
    repeat: usize,
    out: &mut dyn Write,
) -> anyhow::Result<Tally> {
    let mut tally = Tally::default();
    let symbol = symbol.trim().to_uppercase();
    let compared = compared_symbols(&symbol, symbols);

    writeln!(out, "🧪 Testing Data Consistency...\n")?;

    writeln!(out, "📊 Testing Individual Stock Endpoint:")?;
    let mut singles: BTreeMap<String, StockData> = BTreeMap::new();
    for name in &compared {
        match client.stock(name).await {
            Ok(stock) => {
                writeln!(out, "{}: ${} ({})", name, stock.price, stock.source())?;
                singles.insert(name.clone(), stock);
            }
            Err(err) => {
                writeln!(out, "❌ Individual endpoint failed for {}: {}", name, err)?;
                tally.fail();
            }
        }
    }

    writeln!(out, "\n📊 Testing Batch Endpoint:")?;
    let batches: BTreeMap<String, StockData> = match client.stocks(&compared).await {
        Ok(stocks) => {
            for name in &compared {
                match stocks.get(name) {
                    Some(stock) => writeln!(out, "{}: ${} ({})", name, stock.price, stock.source())?,
                    None => {
                        writeln!(out, "❌ Batch response is missing {}", name)?;
                        tally.fail();
                    }
                }
            }
            stocks
        }
        Err(err) => {
            writeln!(out, "❌ Batch endpoint failed: {}", err)?;
            tally.fail();
            BTreeMap::new()
        }
    };

    writeln!(out, "\n🔍 Individual vs Batch:")?;
    for name in &compared {
        let (Some(single), Some(batched)) = (singles.get(name), batches.get(name)) else {
            continue;
        };

        if price_in_cents(single.price) == price_in_cents(batched.price) {
            writeln!(out, "✅ {}: both endpoints return ${:.2}", name, single.price)?;
            tally.pass();
        } else {
            writeln!(
                out,
                "❌ {}: individual ${} vs batch ${}",
                name, single.price, batched.price
            )?;
            tally.fail();
        }
    }

    let single = singles.get(&symbol).cloned();
    let batch = batches.get(&symbol).cloned();

    writeln!(out, "\n📊 Testing Multiple Individual Calls:")?;
    let mut repeated = Vec::with_capacity(repeat);
    for call in 1..=repeat {
        match client.stock(&symbol).await {
            Ok(stock) => {
                writeln!(out, "Call {}: ${}", call, stock.price)?;
                repeated.push(stock.price);
            }
            Err(err) => {
                writeln!(out, "❌ Call {} failed: {}", call, err)?;
                tally.fail();
            }
        }
    }

    writeln!(out, "\n🔍 Consistency Check:")?;
    let mut prices: Vec<f64> = Vec::new();
    prices.extend(single.as_ref().map(|stock| stock.price));
    prices.extend(batch.as_ref().map(|stock| stock.price));
    prices.extend(repeated.iter().copied());

    let distinct = distinct_prices(&prices);
    if prices.len() < 2 {
        writeln!(out, "❌ Not enough prices to compare")?;
        tally.fail();
    } else if distinct.len() == 1 {
        writeln!(out, "✅ All prices are consistent: {}", distinct[0])?;
        tally.pass();
    } else {
        writeln!(out, "❌ Prices are inconsistent: {}", distinct.join(", "))?;
        tally.fail();
    }

    writeln!(out, "\n📊 Testing Market Indices:")?;
    match client.indices().await {
        Ok(indices) => {
            if write_us_indices(&indices, out)? {
                tally.pass();
            } else {
                tally.fail();
            }
        }
        Err(err) => {
            writeln!(out, "❌ Indices failed: {}", err)?;
            tally.fail();
        }
    }

    writeln!(out, "\n🎯 Summary:")?;
    let price_of = |stock: &Option<StockData>| {
        stock
            .as_ref()
            .map(|stock| format!("${}", stock.price))
            .unwrap_or_else(|| "n/a".to_string())
    };
    writeln!(out, "- Individual endpoint: {}", price_of(&single))?;
    writeln!(out, "- Batch endpoint: {}", price_of(&batch))?;
    writeln!(
        out,
        "- Multiple calls: {}",
        repeated
            .iter()
            .map(|price| format!("${}", price))
            .collect::<Vec<_>>()
            .join(", ")
    )?;
    if let Some(stock) = &single {
        writeln!(out, "- Data source: {}", stock.source())?;
        writeln!(out, "- Is real time: {}", stock.is_real_time)?;
    }

    Ok(tally)
}
