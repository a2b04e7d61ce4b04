pub use crate::errors::Error;
pub use crate::providers::chain::{ChainPolicy, ChainReport, ProviderChain};
pub use crate::providers::{Outcome, Provider, ProviderKind, ProviderSettings};
pub use crate::quote::{DataSource, Quote, Symbol};
pub use crate::variant::{Variant, VariantStore};
