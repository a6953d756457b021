use pipeline_env_core::contract::{
    decode_job_event, job_id_from_event, truncate_failure_message, validate_job, ValidationError,
};
use pipeline_env_core::env_file::{
    content_fingerprint, merge_parameters, parse_secret_data, render_env_file, EnvFileError,
};
use pipeline_env_core::storage_keys::{env_object_key, ENV_CONTENT_TYPE};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::adapters::job_reporter::JobReporter;
use crate::adapters::object_store::ArtifactStore;
use crate::adapters::parameter_store::{fetch_parameters_by_path, ParameterStore};
use crate::adapters::secret_store::SecretStore;
use crate::config::HandlerConfig;

const COMPONENT: &str = "job_handler";

pub struct JobDependencies<'a> {
    pub secret_store: &'a dyn SecretStore,
    pub parameter_store: &'a dyn ParameterStore,
    pub artifact_store: &'a dyn ArtifactStore,
    pub reporter: &'a dyn JobReporter,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JobSuccessResponse {
    pub status: String,
    pub job_id: String,
    pub artifact_key: String,
    pub variable_count: usize,
    pub content_sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandlerError {
    pub message: String,
    pub failure_reported: bool,
}

#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("ARTIFACT_BUCKET environment variable is not set")]
    MissingArtifactBucket,
    #[error("Failed to get secret: {0}")]
    SecretFetch(String),
    #[error("Secret value is empty")]
    EmptySecret,
    #[error("Failed to get SSM parameters: {0}")]
    ParameterFetch(String),
    #[error(transparent)]
    EnvFile(#[from] EnvFileError),
    #[error("Failed to upload to S3: {0}")]
    Upload(String),
    #[error("Failed to put job success result: {0}")]
    ReportSuccess(String),
}

/// Builds the env artifact for one CodePipeline job and reports the outcome.
///
/// Every job with a readable id is reported exactly once: success after the
/// artifact is written, failure otherwise. The returned error says whether
/// that failure report reached CodePipeline.
pub fn handle_job_event(
    event: Value,
    config: &HandlerConfig,
    deps: &JobDependencies<'_>,
) -> Result<JobSuccessResponse, JobHandlerError> {
    let Some(job_id) = job_id_from_event(&event).map(str::to_string) else {
        let message = ValidationError::MissingJobId.to_string();
        log_job_error("job_rejected", "", json!({ "error": message.clone() }));
        return Err(JobHandlerError {
            message,
            failure_reported: false,
        });
    };

    log_job_info("job_started", &job_id, json!({}));

    let response = match build_artifact(event, config, deps) {
        Ok(response) => response,
        Err(error) => return Err(fail_job(&job_id, error, deps.reporter)),
    };

    if let Err(error) = deps.reporter.report_success(&job_id) {
        let error = JobError::ReportSuccess(error);
        return Err(fail_job(&job_id, error, deps.reporter));
    }

    log_job_info(
        "job_succeeded",
        &job_id,
        json!({
            "artifact_key": response.artifact_key.clone(),
            "variable_count": response.variable_count,
        }),
    );
    Ok(response)
}

fn build_artifact(
    event: Value,
    config: &HandlerConfig,
    deps: &JobDependencies<'_>,
) -> Result<JobSuccessResponse, JobError> {
    let event = decode_job_event(event)?;
    let job = validate_job(&event)?;
    let parameters = &job.parameters;

    let bucket = config
        .artifact_bucket()
        .ok_or(JobError::MissingArtifactBucket)?;

    let secret_string = deps
        .secret_store
        .secret_string(&parameters.secret_name)
        .map_err(JobError::SecretFetch)?
        .ok_or(JobError::EmptySecret)?;
    let mut secret_data = parse_secret_data(&secret_string)?;
    log_job_info(
        "secret_loaded",
        &job.job_id,
        json!({
            "account_id": job.account_id.clone(),
            "secret_name": parameters.secret_name.clone(),
            "secret_keys": secret_data.len(),
        }),
    );

    if let Some(path) = parameters.ssm_parameters_path.as_deref() {
        let store_parameters = fetch_parameters_by_path(deps.parameter_store, path)
            .map_err(JobError::ParameterFetch)?;
        let fetched = store_parameters.len();
        let merged = merge_parameters(&mut secret_data, path, store_parameters);
        log_job_info(
            "parameters_merged",
            &job.job_id,
            json!({
                "path": path,
                "fetched": fetched,
                "merged": merged,
            }),
        );
    }

    let content = render_env_file(&secret_data)?;
    let artifact_key = env_object_key(&parameters.project_name);
    deps.artifact_store
        .put_text_object(bucket, &artifact_key, &content.text, ENV_CONTENT_TYPE)
        .map_err(JobError::Upload)?;

    let content_sha256 = content_fingerprint(&content.text);
    log_job_info(
        "artifact_uploaded",
        &job.job_id,
        json!({
            "bucket": bucket,
            "artifact_key": artifact_key.clone(),
            "variable_count": content.variable_count,
            "content_sha256": content_sha256.clone(),
        }),
    );

    Ok(JobSuccessResponse {
        status: "ok".to_string(),
        job_id: job.job_id,
        artifact_key,
        variable_count: content.variable_count,
        content_sha256,
    })
}

fn fail_job(job_id: &str, error: JobError, reporter: &dyn JobReporter) -> JobHandlerError {
    let message = error.to_string();
    log_job_error("job_failed", job_id, json!({ "error": message.clone() }));

    match reporter.report_failure(job_id, &truncate_failure_message(&message)) {
        Ok(()) => JobHandlerError {
            message,
            failure_reported: true,
        },
        Err(report_error) => {
            log_job_error(
                "failure_report_failed",
                job_id,
                json!({ "error": report_error.clone() }),
            );
            JobHandlerError {
                message: unreported_failure_message(&message, &report_error),
                failure_reported: false,
            }
        }
    }
}

fn unreported_failure_message(cause: &str, report_error: &str) -> String {
    format!("{cause}; additionally failed to report job failure: {report_error}")
}

fn log_job_info(event: &str, job_id: &str, details: Value) {
    tracing::info!(
        component = COMPONENT,
        event = event,
        job_id = job_id,
        details = %details
    );
}

fn log_job_error(event: &str, job_id: &str, details: Value) {
    tracing::error!(
        component = COMPONENT,
        event = event,
        job_id = job_id,
        details = %details
    );
}
