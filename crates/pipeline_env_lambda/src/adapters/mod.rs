pub mod job_reporter;
pub mod object_store;
pub mod parameter_store;
pub mod secret_store;
