pub mod cache;
pub mod errors;
pub mod health;
pub mod indices;
pub mod mock;
pub mod router;
pub mod state;
pub mod stocks;

pub use router::create_app;
pub use state::{ServiceSettings, State};
