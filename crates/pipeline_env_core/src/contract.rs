use std::fmt;

use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// CodePipeline rejects `FailureDetails.message` values longer than this.
pub const MAX_FAILURE_MESSAGE_CHARS: usize = 5_000;

const JOB_ID_POINTER: &str = "/CodePipeline.job/id";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodePipelineJobEvent {
    #[serde(rename = "CodePipeline.job")]
    pub job: CodePipelineJob,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CodePipelineJob {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default)]
    pub data: Option<CodePipelineJobData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CodePipelineJobData {
    #[serde(default)]
    pub action_configuration: Option<ActionConfiguration>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionConfiguration {
    #[serde(default)]
    pub configuration: Option<ActionConfigurationValues>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ActionConfigurationValues {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_parameters: Option<String>,
}

impl ActionConfigurationValues {
    fn is_empty(&self) -> bool {
        is_unset(self.function_name.as_deref()) && is_unset(self.user_parameters.as_deref())
    }
}

fn is_unset(value: Option<&str>) -> bool {
    value.unwrap_or_default().is_empty()
}

/// Normalized user parameters for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserParameters {
    pub secret_name: String,
    pub ssm_parameters_path: Option<String>,
    pub project_name: String,
}

/// Field names match ASCII case-insensitively. A later key naming the same
/// field replaces the earlier value, and `null` leaves the field untouched.
#[derive(Debug, Default)]
struct RawUserParameters {
    secret_name: Option<String>,
    ssm_parameters_path: Option<String>,
    project_name: Option<String>,
}

impl RawUserParameters {
    fn field_mut(&mut self, key: &str) -> Option<&mut Option<String>> {
        if key.eq_ignore_ascii_case("SecretName") {
            Some(&mut self.secret_name)
        } else if key.eq_ignore_ascii_case("SSMParametersPath") {
            Some(&mut self.ssm_parameters_path)
        } else if key.eq_ignore_ascii_case("ProjectName") {
            Some(&mut self.project_name)
        } else {
            None
        }
    }
}

impl<'de> Deserialize<'de> for RawUserParameters {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(RawUserParametersVisitor)
    }
}

struct RawUserParametersVisitor;

impl<'de> Visitor<'de> for RawUserParametersVisitor {
    type Value = RawUserParameters;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a JSON object of user parameters")
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(RawUserParameters::default())
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut parameters = RawUserParameters::default();
        while let Some(key) = map.next_key::<String>()? {
            match parameters.field_mut(&key) {
                Some(field) => {
                    if let Some(value) = map.next_value::<Option<String>>()? {
                        *field = Some(value);
                    }
                }
                None => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(parameters)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedJob {
    pub job_id: String,
    pub account_id: Option<String>,
    pub parameters: UserParameters,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing job id")]
    MissingJobId,
    #[error("Malformed job event: {0}")]
    MalformedEvent(String),
    #[error("Missing action configuration")]
    MissingActionConfiguration,
    #[error("Missing user parameters")]
    MissingUserParameters,
    #[error("Failed to parse user parameters: {0}")]
    InvalidUserParameters(String),
    #[error("SecretName and ProjectName are required parameters")]
    MissingRequiredParameters,
}

/// Reads the job id without decoding the rest of the event, so that a
/// malformed event can still be reported against its job. The id is returned
/// verbatim; a blank id counts as missing.
pub fn job_id_from_event(event: &Value) -> Option<&str> {
    event
        .pointer(JOB_ID_POINTER)
        .and_then(Value::as_str)
        .filter(|id| !is_blank(id))
}

pub fn decode_job_event(event: Value) -> Result<CodePipelineJobEvent, ValidationError> {
    serde_json::from_value(event)
        .map_err(|error| ValidationError::MalformedEvent(error.to_string()))
}

pub fn validate_job(event: &CodePipelineJobEvent) -> Result<ValidatedJob, ValidationError> {
    let job_id = event
        .job
        .id
        .as_deref()
        .filter(|id| !is_blank(id))
        .ok_or(ValidationError::MissingJobId)?;

    let configuration = event
        .job
        .data
        .as_ref()
        .and_then(|data| data.action_configuration.as_ref())
        .and_then(|action| action.configuration.as_ref())
        .filter(|values| !values.is_empty())
        .ok_or(ValidationError::MissingActionConfiguration)?;

    let raw_parameters = configuration
        .user_parameters
        .as_deref()
        .filter(|raw| !is_blank(raw))
        .ok_or(ValidationError::MissingUserParameters)?;

    let parameters = parse_user_parameters(raw_parameters)?;

    Ok(ValidatedJob {
        job_id: job_id.to_string(),
        account_id: event.job.account_id.clone(),
        parameters,
    })
}

pub fn parse_user_parameters(raw: &str) -> Result<UserParameters, ValidationError> {
    let parsed: RawUserParameters = serde_json::from_str(raw)
        .map_err(|error| ValidationError::InvalidUserParameters(error.to_string()))?;

    let secret_name = non_blank(parsed.secret_name);
    let project_name = non_blank(parsed.project_name);
    let (Some(secret_name), Some(project_name)) = (secret_name, project_name) else {
        return Err(ValidationError::MissingRequiredParameters);
    };

    Ok(UserParameters {
        secret_name,
        ssm_parameters_path: non_blank(parsed.ssm_parameters_path),
        project_name,
    })
}

pub fn truncate_failure_message(message: &str) -> String {
    match message.char_indices().nth(MAX_FAILURE_MESSAGE_CHARS) {
        Some((byte_index, _)) => message[..byte_index].to_string(),
        None => message.to_string(),
    }
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Blank values count as absent; anything else is kept untrimmed.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !is_blank(text))
}
