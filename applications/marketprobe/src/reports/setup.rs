use crate::reports::Tally;
use marketpulse::backend::Client;
use marketpulse::Error;
use std::io::Write;

fn write_troubleshooting(out: &mut dyn Write, backend_url: &str) -> std::io::Result<()> {
    writeln!(out, "\n🔧 Troubleshooting:")?;
    writeln!(out, "1. Make sure the backend service is running at {}:", backend_url)?;
    writeln!(out, "   cargo run -p stockdata")?;
    writeln!(out, "\n2. Or point the probe at another backend:")?;
    writeln!(out, "   marketprobe --backend-url http://host:5003 setup")
}

pub async fn run(client: &Client, symbols: &[String], out: &mut dyn Write) -> anyhow::Result<Tally> {
    let mut tally = Tally::default();
    let mut refused = false;
    let mut note = |err: &Error| refused |= err.is_connection_refused();

    writeln!(out, "🧪 Testing Market Pulse Local Setup...\n")?;

    writeln!(out, "1️⃣ Testing Health Check...")?;
    match client.health().await {
        Ok(health) => {
            writeln!(out, "✅ Health Check: {}", health.status)?;
            writeln!(out, "   Cache Size: {}", health.cache_size)?;
            writeln!(out, "   Timestamp: {}\n", health.timestamp)?;
            if health.parsed_timestamp().is_some() {
                tally.pass();
            } else {
                writeln!(out, "❌ Timestamp is not ISO 8601\n")?;
                tally.fail();
            }
        }
        Err(err) => {
            writeln!(out, "❌ Health check failed: {}\n", err)?;
            note(&err);
            tally.fail();
        }
    }

    let symbol = symbols.first().map(String::as_str).unwrap_or("AAPL");
    writeln!(out, "2️⃣ Testing Single Stock ({})...", symbol)?;
    match client.stock(symbol).await {
        Ok(stock) => {
            writeln!(out, "✅ {} Stock Data:", symbol)?;
            writeln!(out, "   Price: ${}", stock.price)?;
            writeln!(out, "   Data Source: {}", stock.source())?;
            writeln!(out, "   Real Time: {}", stock.is_real_time)?;
            writeln!(
                out,
                "   Timestamp: {}\n",
                stock.timestamp.as_deref().unwrap_or("n/a")
            )?;
            tally.pass();
        }
        Err(err) => {
            writeln!(out, "❌ {} failed: {}\n", symbol, err)?;
            note(&err);
            tally.fail();
        }
    }

    writeln!(out, "3️⃣ Testing Batch Stocks...")?;
    match client.stocks(symbols).await {
        Ok(stocks) => {
            writeln!(out, "✅ Batch Stock Data ({} stocks):", stocks.len())?;
            for (symbol, stock) in &stocks {
                let status = if stock.is_mock() { "🟡 MOCK" } else { "🟢 REAL" };
                writeln!(
                    out,
                    "   {}: ${} ({}) {}",
                    symbol,
                    stock.price,
                    stock.source(),
                    status
                )?;
            }
            tally.pass();
        }
        Err(err) => {
            writeln!(out, "❌ Batch failed: {}", err)?;
            note(&err);
            tally.fail();
        }
    }

    if tally.is_clean() {
        writeln!(
            out,
            "\n🎉 All tests passed! Your Market Pulse backend is working correctly."
        )?;
        writeln!(out, "\n📋 Next Steps:")?;
        writeln!(out, "1. Start the AI frontend: npm run dev:ai")?;
        writeln!(out, "2. Open http://localhost:3002")?;
        writeln!(out, "3. Check browser console for real data messages")?;
        writeln!(out, "4. Look for Data Source Indicator showing real vs mock data")?;
    }

    if refused {
        write_troubleshooting(out, client.base_url())?;
    }

    Ok(tally)
}
