#![allow(dead_code)]

pub mod fakes;

use serde_json::{json, Value};

pub fn job_event(job_id: &str, user_parameters: Value) -> Value {
    json!({
        "CodePipeline.job": {
            "id": job_id,
            "accountId": "111122223333",
            "data": {
                "actionConfiguration": {
                    "configuration": {
                        "FunctionName": "pipeline-env-file",
                        "UserParameters": user_parameters.to_string()
                    }
                },
                "inputArtifacts": [],
                "outputArtifacts": []
            }
        }
    })
}

pub fn raw_job_event(job_id: &str, user_parameters: &str) -> Value {
    json!({
        "CodePipeline.job": {
            "id": job_id,
            "data": {
                "actionConfiguration": {
                    "configuration": {
                        "FunctionName": "pipeline-env-file",
                        "UserParameters": user_parameters
                    }
                }
            }
        }
    })
}
