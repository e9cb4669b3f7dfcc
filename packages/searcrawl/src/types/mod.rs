//! Data types shared by the pipeline, collaborators and callers.

pub mod config;
pub mod render;
pub mod report;
pub mod request;
