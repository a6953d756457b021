//! Domain primitives for assembling pipeline `.env` artifacts.
//!
//! This crate owns the job-event contract, user-parameter validation, the
//! secret/parameter merge and env-file rendering. It intentionally excludes AWS
//! SDK and Lambda runtime concerns; those live in `pipeline_env_lambda`.

pub mod contract;
pub mod env_file;
pub mod storage_keys;
