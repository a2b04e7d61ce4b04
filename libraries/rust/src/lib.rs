//! Welcome to marketpulse!

/// Market Pulse error type
pub mod errors;

/// Market Pulse logging setup
pub mod logger;

/// Market Pulse quote model
pub mod quote;

/// Market Pulse quote provider clients
pub mod providers;

/// Market Pulse backend facade client
pub mod backend;

/// Market Pulse A/B variant store
pub mod variant;

pub mod prelude;

pub use errors::Error;
