//! AWS-facing handler for the CodePipeline env-file action.
//!
//! This crate owns runtime integration details (the Lambda binary, the service
//! adapters and process configuration). Merge and rendering rules come from
//! `pipeline_env_core`.

pub mod adapters;
pub mod config;
pub mod handlers;
