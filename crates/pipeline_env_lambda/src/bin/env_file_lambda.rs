use std::future::Future;

use aws_sdk_codepipeline::types::{FailureDetails, FailureType};
use aws_sdk_s3::primitives::ByteStream;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use pipeline_env_core::env_file::StoreParameter;
use pipeline_env_lambda::adapters::job_reporter::JobReporter;
use pipeline_env_lambda::adapters::object_store::ArtifactStore;
use pipeline_env_lambda::adapters::parameter_store::{ParameterPage, ParameterStore};
use pipeline_env_lambda::adapters::secret_store::SecretStore;
use pipeline_env_lambda::config::HandlerConfig;
use pipeline_env_lambda::handlers::job::{handle_job_event, JobDependencies, JobSuccessResponse};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

struct SecretsManagerStore {
    client: aws_sdk_secretsmanager::Client,
}

impl SecretStore for SecretsManagerStore {
    fn secret_string(&self, secret_id: &str) -> Result<Option<String>, String> {
        let client = self.client.clone();
        let secret_id = secret_id.to_string();

        block_on_runtime(async move {
            client
                .get_secret_value()
                .secret_id(secret_id)
                .send()
                .await
                .map(|output| output.secret_string().map(str::to_string))
                .map_err(|error| {
                    aws_sdk_secretsmanager::error::DisplayErrorContext(error).to_string()
                })
        })
    }
}

struct SsmParameterStore {
    client: aws_sdk_ssm::Client,
}

impl ParameterStore for SsmParameterStore {
    fn parameters_page(
        &self,
        path: &str,
        next_token: Option<&str>,
    ) -> Result<ParameterPage, String> {
        let client = self.client.clone();
        let path = path.to_string();
        let next_token = next_token.map(str::to_string);

        block_on_runtime(async move {
            let output = client
                .get_parameters_by_path()
                .path(path)
                .recursive(true)
                .with_decryption(true)
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|error| aws_sdk_ssm::error::DisplayErrorContext(error).to_string())?;

            let parameters = output
                .parameters()
                .iter()
                .filter_map(|parameter| match (parameter.name(), parameter.value()) {
                    (Some(name), Some(value)) => Some(StoreParameter::new(name, value)),
                    _ => None,
                })
                .collect();

            Ok(ParameterPage {
                parameters,
                next_token: output.next_token().map(str::to_string),
            })
        })
    }
}

struct S3ArtifactStore {
    client: aws_sdk_s3::Client,
}

impl ArtifactStore for S3ArtifactStore {
    fn put_text_object(
        &self,
        bucket: &str,
        key: &str,
        body: &str,
        content_type: &str,
    ) -> Result<(), String> {
        let client = self.client.clone();
        let bucket = bucket.to_string();
        let object_key = key.to_string();
        let body_bytes = body.as_bytes().to_vec();
        let content_type = content_type.to_string();

        block_on_runtime(async move {
            client
                .put_object()
                .bucket(bucket)
                .key(object_key)
                .content_type(content_type)
                .body(ByteStream::from(body_bytes))
                .send()
                .await
                .map(|_| ())
                .map_err(|error| aws_sdk_s3::error::DisplayErrorContext(error).to_string())
        })
    }
}

struct CodePipelineReporter {
    client: aws_sdk_codepipeline::Client,
}

impl JobReporter for CodePipelineReporter {
    fn report_success(&self, job_id: &str) -> Result<(), String> {
        let client = self.client.clone();
        let job_id = job_id.to_string();

        block_on_runtime(async move {
            client
                .put_job_success_result()
                .job_id(job_id)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| {
                    aws_sdk_codepipeline::error::DisplayErrorContext(error).to_string()
                })
        })
    }

    fn report_failure(&self, job_id: &str, message: &str) -> Result<(), String> {
        let client = self.client.clone();
        let job_id = job_id.to_string();
        let details = FailureDetails::builder()
            .r#type(FailureType::JobFailed)
            .message(message)
            .build()
            .map_err(|error| format!("invalid failure details: {error}"))?;

        block_on_runtime(async move {
            client
                .put_job_failure_result()
                .job_id(job_id)
                .failure_details(details)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| {
                    aws_sdk_codepipeline::error::DisplayErrorContext(error).to_string()
                })
        })
    }
}

// The adapter traits are synchronous; SDK futures run on the current runtime.
fn block_on_runtime<F: Future>(future: F) -> F::Output {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

struct RuntimeDependencies {
    config: HandlerConfig,
    secret_store: SecretsManagerStore,
    parameter_store: SsmParameterStore,
    artifact_store: S3ArtifactStore,
    reporter: CodePipelineReporter,
}

impl RuntimeDependencies {
    fn job_dependencies(&self) -> JobDependencies<'_> {
        JobDependencies {
            secret_store: &self.secret_store,
            parameter_store: &self.parameter_store,
            artifact_store: &self.artifact_store,
            reporter: &self.reporter,
        }
    }
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<JobSuccessResponse, Error> {
    let (payload, context) = event.into_parts();
    let span = tracing::info_span!("invocation", request_id = %context.request_id);
    let _entered = span.enter();

    handle_job_event(payload, &deps.config, &deps.job_dependencies())
        .map_err(|error| Error::from(error.message))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_current_span(true)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let config = HandlerConfig::from_env();
    if config.artifact_bucket().is_none() {
        tracing::warn!(
            component = "env_file_lambda",
            event = "missing_configuration",
            "ARTIFACT_BUCKET is not set; every job will be reported as failed"
        );
    }

    let deps = RuntimeDependencies {
        config,
        secret_store: SecretsManagerStore {
            client: aws_sdk_secretsmanager::Client::new(&aws_config),
        },
        parameter_store: SsmParameterStore {
            client: aws_sdk_ssm::Client::new(&aws_config),
        },
        artifact_store: S3ArtifactStore {
            client: aws_sdk_s3::Client::new(&aws_config),
        },
        reporter: CodePipelineReporter {
            client: aws_sdk_codepipeline::Client::new(&aws_config),
        },
    };

    lambda_runtime::run(service_fn(|event| handle_request(event, &deps))).await
}
