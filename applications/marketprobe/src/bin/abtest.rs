use clap::Parser;
use marketprobe::abtest;
use marketprobe::args::AbTestCli;
use marketpulse::logger;
use marketpulse::variant::VariantStore;
use std::io;

fn main() -> anyhow::Result<()> {
    logger::init_tracing();

    let cli = AbTestCli::parse();
    let store = VariantStore::new(&cli.root);

    let mut stdout = io::stdout().lock();
    abtest::run(&store, cli.command.as_ref(), &mut stdout)
}
