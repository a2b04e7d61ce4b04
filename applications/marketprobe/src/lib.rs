pub mod abtest;
pub mod args;
pub mod reports;

use args::{Cli, Command};
use marketpulse::backend::Client;
use marketpulse::prelude::{ChainPolicy, ProviderChain, ProviderSettings};
use marketpulse::providers::build_all;
use reports::Tally;
use std::io::Write;

pub async fn run(cli: &Cli, out: &mut dyn Write) -> anyhow::Result<Tally> {
    let client = Client::new(cli.backend_url.as_str())?;

    match &cli.command {
        Command::Providers(args) => {
            let settings = ProviderSettings::from_env();
            let providers = build_all(&args.kinds(), &settings)?;
            let chain = ProviderChain::new(providers, ChainPolicy::default());

            reports::providers::run(&chain, &cli.symbols, out).await
        }
        Command::Consistency(args) => {
            reports::consistency::run(&client, &args.symbol, &cli.symbols, args.repeat, out).await
        }
        Command::Backend => reports::backend::run(&client, &cli.symbols, out).await,
        Command::Setup => reports::setup::run(&client, &cli.symbols, out).await,
        Command::AllReal => reports::all_real::run(&client, &cli.symbols, out).await,
        Command::IndexDetails => reports::index_details::run(&client, out).await,
    }
}
