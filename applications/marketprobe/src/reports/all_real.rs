use crate::reports::{stock_line, write_us_indices, Tally};
use marketpulse::backend::Client;
use std::io::Write;

pub async fn run(client: &Client, symbols: &[String], out: &mut dyn Write) -> anyhow::Result<Tally> {
    let mut tally = Tally::default();

    writeln!(out, "🧪 Testing ALL real data sources...\n")?;

    writeln!(out, "📊 Testing Individual Stocks:")?;
    for symbol in symbols {
        match client.stock(symbol).await {
            Ok(stock) => {
                writeln!(out, "{}", stock_line(symbol, &stock))?;
                if stock.is_mock() {
                    tally.fail();
                } else {
                    tally.pass();
                }
            }
            Err(err) => {
                writeln!(out, "❌ Failed to fetch {}: {}", symbol, err)?;
                tally.fail();
            }
        }
    }

    writeln!(out, "\n📊 Testing Market Indices:")?;
    match client.indices().await {
        Ok(indices) => {
            writeln!(out, "US Indices:")?;
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

    writeln!(out, "\n📊 Testing Batch Request:")?;
    match client.stocks(symbols).await {
        Ok(stocks) => {
            writeln!(out, "Batch Results:")?;
            for (symbol, stock) in &stocks {
                writeln!(out, "{}", stock_line(symbol, stock))?;
                if stock.is_mock() {
                    tally.fail();
                } else {
                    tally.pass();
                }
            }
        }
        Err(err) => {
            writeln!(out, "❌ Batch failed: {}", err)?;
            tally.fail();
        }
    }

    writeln!(out, "\n✅ All tests completed!")?;
    writeln!(out, "\n🎯 Summary: {} real, {} mock or failed", tally.passed, tally.failed)?;

    Ok(tally)
}
