//! Capability traits for the pipeline's collaborators.
//!
//! The pipeline only talks to a search backend and a rendering engine
//! through these traits, so either can be swapped for a test double.

pub mod renderer;
pub mod searcher;
