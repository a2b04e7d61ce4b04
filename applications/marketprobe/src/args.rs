use clap::{Args, Parser, Subcommand, ValueEnum};
use marketpulse::backend::DEFAULT_BASE_URL;
use marketpulse::providers::ProviderKind;
use std::path::PathBuf;

pub const DEFAULT_SYMBOLS: &str = "AAPL,MSFT,GOOGL,TSLA,NVDA";

#[derive(Parser, Debug)]
#[command(name = "marketprobe", author, version, about = "Poll quote providers and the stock data facade")]
pub struct Cli {
    /// Base URL of the stock data facade
    #[arg(long, env = "MARKETPULSE_BACKEND_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub backend_url: String,

    /// Comma separated symbols to check
    #[arg(long, value_delimiter = ',', default_value = DEFAULT_SYMBOLS, global = true)]
    pub symbols: Vec<String>,

    /// Exit with status 1 when any check failed
    #[arg(long, global = true)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ask each provider directly for every symbol
    Providers(ProvidersArgs),

    /// Compare single, batch and repeated prices for one symbol
    Consistency(ConsistencyArgs),

    /// Hit health, single and batch endpoints
    Backend,

    /// Check a local facade setup and print troubleshooting hints
    Setup,

    /// Fetch every symbol, the US indices and a batch
    AllReal,

    /// Show details for the US index symbols
    IndexDetails,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderSet {
    /// Twelve Data, Polygon, Alpha Vantage, Finnhub
    FreeTier,
    /// Yahoo Finance, Alpha Vantage, Finnhub
    Realtime,
}

impl ProviderSet {
    pub fn kinds(&self) -> Vec<ProviderKind> {
        match self {
            ProviderSet::FreeTier => vec![
                ProviderKind::TwelveData,
                ProviderKind::Polygon,
                ProviderKind::AlphaVantage,
                ProviderKind::Finnhub,
            ],
            ProviderSet::Realtime => vec![
                ProviderKind::Yahoo,
                ProviderKind::AlphaVantage,
                ProviderKind::Finnhub,
            ],
        }
    }
}

#[derive(Args, Debug)]
pub struct ProvidersArgs {
    #[arg(long, value_enum, default_value_t = ProviderSet::FreeTier)]
    pub set: ProviderSet,

    /// Providers to query instead of the set (repeatable)
    #[arg(long = "provider")]
    pub providers: Vec<ProviderKind>,
}

impl ProvidersArgs {
    pub fn kinds(&self) -> Vec<ProviderKind> {
        if self.providers.is_empty() {
            self.set.kinds()
        } else {
            self.providers.clone()
        }
    }
}

#[derive(Args, Debug)]
pub struct ConsistencyArgs {
    #[arg(long, default_value = "AAPL")]
    pub symbol: String,

    /// Number of repeated single-stock calls
    #[arg(long, default_value_t = 3)]
    pub repeat: usize,
}

#[derive(Parser, Debug)]
#[command(
    name = "abtest",
    about = "Market Pulse A/B Testing Manager",
    disable_help_subcommand = true
)]
pub struct AbTestCli {
    /// Project directory holding .ab-test-version and the build directories
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    #[command(subcommand)]
    pub command: Option<AbTestCommand>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum AbTestCommand {
    /// List all available versions
    List,
    /// Check build status of all versions
    Status,
    /// Switch to specified version (original|ai)
    Switch { version: Option<String> },
    /// Generate A/B test report
    Report,
    /// Show this help message
    Help,
}
