use std::sync::Mutex;

use pipeline_env_core::env_file::StoreParameter;
use pipeline_env_lambda::adapters::job_reporter::JobReporter;
use pipeline_env_lambda::adapters::object_store::ArtifactStore;
use pipeline_env_lambda::adapters::parameter_store::{ParameterPage, ParameterStore};
use pipeline_env_lambda::adapters::secret_store::SecretStore;
use pipeline_env_lambda::handlers::job::JobDependencies;

pub struct FakeSecretStore {
    response: Result<Option<String>, String>,
    requests: Mutex<Vec<String>>,
}

impl FakeSecretStore {
    pub fn with_secret(secret: &str) -> Self {
        Self::with_response(Ok(Some(secret.to_string())))
    }

    pub fn with_response(response: Result<Option<String>, String>) -> Self {
        Self {
            response,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("poisoned mutex").clone()
    }
}

impl SecretStore for FakeSecretStore {
    fn secret_string(&self, secret_id: &str) -> Result<Option<String>, String> {
        self.requests
            .lock()
            .expect("poisoned mutex")
            .push(secret_id.to_string());
        self.response.clone()
    }
}

pub struct FakeParameterStore {
    pages: Vec<ParameterPage>,
    failure: Option<String>,
    requests: Mutex<Vec<(String, Option<String>)>>,
}

impl FakeParameterStore {
    pub fn empty() -> Self {
        Self::with_pages(Vec::new())
    }

    pub fn with_parameters(parameters: Vec<StoreParameter>) -> Self {
        Self::with_pages(vec![parameters])
    }

    /// Chains `pages` with tokens `page-1`, `page-2`, ...
    pub fn with_pages(pages: Vec<Vec<StoreParameter>>) -> Self {
        let count = pages.len();
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(index, parameters)| ParameterPage {
                parameters,
                next_token: (index + 1 < count).then(|| format!("page-{}", index + 1)),
            })
            .collect();
        Self {
            pages,
            failure: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            pages: Vec::new(),
            failure: Some(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<(String, Option<String>)> {
        self.requests.lock().expect("poisoned mutex").clone()
    }
}

impl ParameterStore for FakeParameterStore {
    fn parameters_page(
        &self,
        path: &str,
        next_token: Option<&str>,
    ) -> Result<ParameterPage, String> {
        self.requests
            .lock()
            .expect("poisoned mutex")
            .push((path.to_string(), next_token.map(str::to_string)));

        if let Some(message) = &self.failure {
            return Err(message.clone());
        }

        let index = match next_token {
            None => 0,
            Some(token) => token
                .strip_prefix("page-")
                .and_then(|value| value.parse::<usize>().ok())
                .ok_or_else(|| format!("unknown token {token}"))?,
        };
        Ok(self.pages.get(index).cloned().unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutRecord {
    pub bucket: String,
    pub key: String,
    pub body: String,
    pub content_type: String,
}

#[derive(Default)]
pub struct RecordingArtifactStore {
    writes: Mutex<Vec<PutRecord>>,
    failure: Option<String>,
}

impl RecordingArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            writes: Mutex::new(Vec::new()),
            failure: Some(message.to_string()),
        }
    }

    pub fn writes(&self) -> Vec<PutRecord> {
        self.writes.lock().expect("poisoned mutex").clone()
    }
}

impl ArtifactStore for RecordingArtifactStore {
    fn put_text_object(
        &self,
        bucket: &str,
        key: &str,
        body: &str,
        content_type: &str,
    ) -> Result<(), String> {
        if let Some(message) = &self.failure {
            return Err(message.clone());
        }

        let record = PutRecord {
            bucket: bucket.to_string(),
            key: key.to_string(),
            body: body.to_string(),
            content_type: content_type.to_string(),
        };
        self.writes.lock().expect("poisoned mutex").push(record);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    Success { job_id: String },
    Failure { job_id: String, message: String },
}

#[derive(Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<Report>>,
    success_failure: Option<String>,
    failure_failure: Option<String>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting_success(message: &str) -> Self {
        Self {
            success_failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn rejecting_failure(message: &str) -> Self {
        Self {
            failure_failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().expect("poisoned mutex").clone()
    }

    pub fn failure_messages(&self) -> Vec<String> {
        self.reports()
            .into_iter()
            .filter_map(|report| match report {
                Report::Failure { message, .. } => Some(message),
                Report::Success { .. } => None,
            })
            .collect()
    }
}

impl JobReporter for RecordingReporter {
    fn report_success(&self, job_id: &str) -> Result<(), String> {
        if let Some(message) = &self.success_failure {
            return Err(message.clone());
        }
        let report = Report::Success {
            job_id: job_id.to_string(),
        };
        self.reports.lock().expect("poisoned mutex").push(report);
        Ok(())
    }

    fn report_failure(&self, job_id: &str, message: &str) -> Result<(), String> {
        if let Some(error) = &self.failure_failure {
            return Err(error.clone());
        }
        let report = Report::Failure {
            job_id: job_id.to_string(),
            message: message.to_string(),
        };
        self.reports.lock().expect("poisoned mutex").push(report);
        Ok(())
    }
}

pub struct Fakes {
    pub secret_store: FakeSecretStore,
    pub parameter_store: FakeParameterStore,
    pub artifact_store: RecordingArtifactStore,
    pub reporter: RecordingReporter,
}

impl Fakes {
    pub fn with_secret(secret: &str) -> Self {
        Self {
            secret_store: FakeSecretStore::with_secret(secret),
            parameter_store: FakeParameterStore::empty(),
            artifact_store: RecordingArtifactStore::new(),
            reporter: RecordingReporter::new(),
        }
    }

    pub fn deps(&self) -> JobDependencies<'_> {
        JobDependencies {
            secret_store: &self.secret_store,
            parameter_store: &self.parameter_store,
            artifact_store: &self.artifact_store,
            reporter: &self.reporter,
        }
    }

    pub fn store_calls(&self) -> usize {
        self.secret_store.requests().len()
            + self.parameter_store.requests().len()
            + self.artifact_store.writes().len()
    }
}
