//! Wire types for the Sensu core/v2 API.
//!
//! JobDefinition    -> POST /api/core/v2/namespaces/{ns}/checks
//! ExecutionRequest -> POST /api/core/v2/namespaces/{ns}/checks/{id}/execute

use std::collections::BTreeMap;

use serde::Serialize;

use super::config::DispatchConfig;

/// Label marking every definition created by this tool.
pub const LABEL_CHECK_TYPE: (&str, &str) = ("check_type", "runbook");
/// Provenance label.
pub const LABEL_SOURCE: (&str, &str) = ("source", "Sensu Runbook");

/// Placeholder subscription so the definition is never scheduled on real agents.
pub const UNPUBLISHED_SUBSCRIPTION: &str = "none";
/// Interval is required by the API even though the check is never published.
pub const DEFAULT_INTERVAL: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectMeta {
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
}

/// One-shot, unpublished check definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobDefinition {
    pub metadata: ObjectMeta,
    pub command: String,
    pub publish: bool,
    pub subscriptions: Vec<String>,
    pub interval: u32,
    pub timeout: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub runtime_assets: Vec<String>,
}

impl JobDefinition {
    /// Build the definition for `job_id` from the run configuration.
    pub fn from_config(job_id: &str, config: &DispatchConfig) -> Self {
        let labels = [LABEL_CHECK_TYPE, LABEL_SOURCE]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        JobDefinition {
            metadata: ObjectMeta {
                name: job_id.to_string(),
                namespace: config.namespace.clone(),
                labels,
            },
            command: config.command.clone(),
            publish: false,
            subscriptions: vec![UNPUBLISHED_SUBSCRIPTION.to_string()],
            interval: DEFAULT_INTERVAL,
            timeout: config.timeout,
            runtime_assets: config.runtime_assets.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }
}

/// Request to fan a registered definition out to subscriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionRequest {
    pub check: String,
    pub subscriptions: Vec<String>,
}

impl ExecutionRequest {
    pub fn for_job(job: &JobDefinition, subscriptions: &[String]) -> Self {
        ExecutionRequest {
            check: job.name().to_string(),
            subscriptions: subscriptions.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::DispatchConfig;
    use serde_json::json;

    fn config(assets: &[&str]) -> DispatchConfig {
        DispatchConfig {
            command: "echo hello".into(),
            timeout: 30,
            namespace: "default".into(),
            subscriptions: vec!["web".into(), "db".into()],
            runtime_assets: assets.iter().map(|s| s.to_string()).collect(),
            job_id: None,
            api_url: "https://sensu.example:8080".parse().unwrap(),
            access_token: "token".into(),
            trusted_ca_file: None,
        }
    }

    #[test]
    fn definition_wire_shape() {
        let job = JobDefinition::from_config("job-1", &config(&[]));
        let v = serde_json::to_value(&job).unwrap();
        assert_eq!(
            v,
            json!({
                "metadata": {
                    "name": "job-1",
                    "namespace": "default",
                    "labels": {"check_type": "runbook", "source": "Sensu Runbook"}
                },
                "command": "echo hello",
                "publish": false,
                "subscriptions": ["none"],
                "interval": 10,
                "timeout": 30
            })
        );
    }

    #[test]
    fn runtime_assets_included_when_present() {
        let job = JobDefinition::from_config("job-1", &config(&["script-a", "script-b"]));
        let v = serde_json::to_value(&job).unwrap();
        assert_eq!(v["runtime_assets"], json!(["script-a", "script-b"]));
    }

    #[test]
    fn execution_request_uses_definition_name() {
        let cfg = config(&[]);
        let job = JobDefinition::from_config("abc", &cfg);
        let req = ExecutionRequest::for_job(&job, &cfg.subscriptions);
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"check": "abc", "subscriptions": ["web", "db"]})
        );
    }
}
