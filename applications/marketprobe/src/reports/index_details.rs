use crate::reports::Tally;
use marketpulse::backend::Client;
use std::io::Write;

const INDEX_SYMBOLS: [(&str, &str); 3] = [("^GSPC", "S&P 500"), ("^IXIC", "NASDAQ"), ("^DJI", "DOW")];

fn optional(value: Option<f64>) -> String {
    value
        .map(|value| value.to_string())
        .unwrap_or_else(|| "n/a".to_string())
}

pub async fn run(client: &Client, out: &mut dyn Write) -> anyhow::Result<Tally> {
    let mut tally = Tally::default();

    writeln!(out, "🧪 Testing Index Detail Pages...\n")?;
    writeln!(out, "📊 Testing Index Symbols for Detail Pages:")?;

    for (symbol, name) in INDEX_SYMBOLS {
        match client.stock(symbol).await {
            Ok(stock) => {
                writeln!(out, "{} ({}):", name, symbol)?;
                writeln!(out, "  Price: {}", stock.price)?;
                writeln!(out, "  Change: {} ({}%)", stock.change, stock.change_percent)?;
                writeln!(out, "  Data Source: {}", stock.source())?;
                writeln!(out, "  Is Real Time: {}", stock.is_real_time)?;
                writeln!(out, "  High: {}", optional(stock.high))?;
                writeln!(out, "  Low: {}", optional(stock.low))?;
                writeln!(out, "  Volume: {}", optional(stock.volume))?;
                writeln!(out)?;
                tally.pass();
            }
            Err(err) => {
                writeln!(out, "❌ Failed to fetch {} ({}): {}", name, symbol, err)?;
                tally.fail();
            }
        }
    }

    Ok(tally)
}
