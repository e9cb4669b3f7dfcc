// searcrawl API server - core
//
// HTTP surface over the searcrawl pipeline: environment configuration,
// renderer lifecycle, and the axum router.

pub mod config;
pub mod kernel;
pub mod server;

pub use config::*;
