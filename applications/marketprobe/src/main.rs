use clap::Parser;
use marketprobe::args::Cli;
use marketpulse::logger;
use std::io;
use std::process::ExitCode;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    logger::init_tracing();

    let cli = Cli::parse();

    let mut stdout = io::stdout().lock();
    let tally = marketprobe::run(&cli, &mut stdout).await?;

    info!("{} checks passed, {} failed", tally.passed, tally.failed);

    if cli.strict && !tally.is_clean() {
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
