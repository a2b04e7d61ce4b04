use crate::reports::Tally;
use marketpulse::backend::Client;
use std::io::Write;

const BATCH_SIZE: usize = 3;

pub async fn run(client: &Client, symbols: &[String], out: &mut dyn Write) -> anyhow::Result<Tally> {
    let mut tally = Tally::default();

    writeln!(out, "🧪 Testing Frontend-Backend Communication...\n")?;

    writeln!(out, "1. Testing health endpoint...")?;
    match client.health().await {
        Ok(health) => {
            writeln!(out, "✅ Health check: {}", serde_json::to_string(&health)?)?;
            tally.pass();
        }
        Err(err) => {
            writeln!(out, "❌ Health check failed: {}", err)?;
            tally.fail();
        }
    }

    let symbol = symbols.first().map(String::as_str).unwrap_or("AAPL");
    writeln!(out, "\n2. Testing single stock endpoint...")?;
    match client.stock(symbol).await {
        Ok(stock) => {
            writeln!(out, "✅ {} data: {}", symbol, serde_json::to_string(&stock)?)?;
            tally.pass();
        }
        Err(err) => {
            writeln!(out, "❌ {} failed: {}", symbol, err)?;
            tally.fail();
        }
    }

    let batch: Vec<String> = symbols.iter().take(BATCH_SIZE).cloned().collect();
    writeln!(out, "\n3. Testing batch endpoint...")?;
    match client.stocks(&batch).await {
        Ok(stocks) => {
            writeln!(out, "✅ Batch data: {}", serde_json::to_string(&stocks)?)?;
            tally.pass();
        }
        Err(err) => {
            writeln!(out, "❌ Batch failed: {}", err)?;
            tally.fail();
        }
    }

    if tally.is_clean() {
        writeln!(out, "\n🎉 All tests passed! Backend is working correctly.")?;
    }

    Ok(tally)
}
