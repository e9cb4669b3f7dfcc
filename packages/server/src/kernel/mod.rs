//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod logging;

pub use deps::ServerDeps;
