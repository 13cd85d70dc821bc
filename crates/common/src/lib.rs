//! Cross-cutting helpers shared by the service and server crates:
//! logging setup, runtime directory checks, metrics and small response types.

pub mod types;
pub mod utils;
pub mod env;
pub mod metrics;
