/*!
Two-phase runbook dispatch.

  Create: POST {api}/api/core/v2/namespaces/{ns}/checks
  Invoke: POST {api}/api/core/v2/namespaces/{ns}/checks/{id}/execute

Each phase is exactly one request; the response status is classified by
`outcome::classify` and the run either moves on or stops. Nothing is
retried. A fatal Create means Invoke is never sent.
*/

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use super::config::DispatchConfig;
use super::error::DispatchError;
use super::model::{ExecutionRequest, JobDefinition};
use super::outcome::{Outcome, Phase, classify, reason_phrase};
use super::transport::build_client;

/// How the definition came to exist on the remote side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Created,
    /// Conflict on Create: the caller's identifier was already registered.
    AlreadyExists,
    /// Create answered with a 2xx other than 201.
    Unconfirmed,
}

impl Registration {
    pub fn as_str(&self) -> &'static str {
        match self {
            Registration::Created => "created",
            Registration::AlreadyExists => "existing",
            Registration::Unconfirmed => "unconfirmed",
        }
    }
}

/// A response that succeeded with a status other than the expected one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnexpectedResponse {
    pub phase: Phase,
    pub status: u16,
    pub body: String,
}

/// Summary of a fully successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub job_id: String,
    pub namespace: String,
    pub subscriptions: Vec<String>,
    pub registration: Registration,
    /// Bodies of unexpected 2xx responses, to be echoed verbatim.
    pub unexpected: Vec<UnexpectedResponse>,
}

/// Sensu API client scoped to one run.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: Client,
    base_url: Url,
    access_token: String,
}

impl Dispatcher {
    pub fn new(client: Client, base_url: Url, access_token: impl Into<String>) -> Self {
        Dispatcher {
            client,
            base_url,
            access_token: access_token.into(),
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // http(s) URLs always have a path to extend
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["api", "core", "v2", "namespaces"])
                .extend(segments);
        }
        url
    }

    pub fn checks_url(&self, namespace: &str) -> Url {
        self.endpoint(&[namespace, "checks"])
    }

    pub fn execute_url(&self, namespace: &str, job_id: &str) -> Url {
        self.endpoint(&[namespace, "checks", job_id, "execute"])
    }

    async fn post<B: Serialize>(
        &self,
        phase: Phase,
        url: &Url,
        body: &B,
    ) -> Result<Response, DispatchError> {
        debug!(%phase, %url, "sending request");
        self.client
            .post(url.clone())
            .header(AUTHORIZATION, format!("Bearer {}", self.access_token))
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|source| DispatchError::Request {
                phase,
                url: url.to_string(),
                source,
            })
    }

    /// Classify a response, turning fatal outcomes into errors.
    async fn resolve(
        &self,
        phase: Phase,
        url: &Url,
        response: Response,
    ) -> Result<(Outcome, Option<UnexpectedResponse>), DispatchError> {
        let http_status = response.status();
        let outcome = classify(phase, http_status);
        match outcome {
            Outcome::Fatal {
                status,
                reason,
                not_found: true,
            } => Err(DispatchError::NotFound {
                phase,
                status,
                reason,
                url: url.to_string(),
            }),
            Outcome::Fatal { status, reason, .. } => Err(DispatchError::Rejected {
                phase,
                status,
                reason,
            }),
            Outcome::Unexpected { status } => {
                let body = response
                    .text()
                    .await
                    .map_err(|source| DispatchError::Body { phase, source })?;
                warn!(
                    "{phase} returned {status} {} instead of {}",
                    reason_phrase(http_status),
                    phase.expected_status().as_u16()
                );
                let extra = UnexpectedResponse {
                    phase,
                    status,
                    body,
                };
                Ok((Outcome::Unexpected { status }, Some(extra)))
            }
            other => Ok((other, None)),
        }
    }

    /// Phase 1: register the job definition.
    pub async fn create(
        &self,
        job: &JobDefinition,
    ) -> Result<(Registration, Option<UnexpectedResponse>), DispatchError> {
        let url = self.checks_url(job.namespace());
        info!(
            "registering runbook job ID {}/{} with --command {}",
            job.namespace(),
            job.name(),
            job.command
        );
        let response = self.post(Phase::Create, &url, job).await?;
        let (outcome, extra) = self.resolve(Phase::Create, &url, response).await?;
        let registration = match outcome {
            Outcome::SoftSuccess(reason) => {
                info!("runbook job \"{}\" {reason}", job.name());
                Registration::AlreadyExists
            }
            Outcome::Unexpected { .. } => Registration::Unconfirmed,
            _ => {
                info!("registered runbook job \"{}\"", job.name());
                Registration::Created
            }
        };
        Ok((registration, extra))
    }

    /// Phase 2: request execution on the given subscriptions.
    pub async fn invoke(
        &self,
        job: &JobDefinition,
        request: &ExecutionRequest,
    ) -> Result<Option<UnexpectedResponse>, DispatchError> {
        let url = self.execute_url(job.namespace(), &request.check);
        let response = self.post(Phase::Invoke, &url, request).await?;
        let (_, extra) = self.resolve(Phase::Invoke, &url, response).await?;
        info!(
            "requested runbook job \"{}\" execution on subscriptions: {}",
            request.check,
            request.subscriptions.join(",")
        );
        Ok(extra)
    }

    /// Run both phases for `job_id`.
    pub async fn run(
        &self,
        config: &DispatchConfig,
        job_id: &str,
    ) -> Result<DispatchReport, DispatchError> {
        let job = JobDefinition::from_config(job_id, config);
        let (registration, created_extra) = self.create(&job).await?;

        let request = ExecutionRequest::for_job(&job, &config.subscriptions);
        let invoked_extra = self.invoke(&job, &request).await?;

        Ok(DispatchReport {
            job_id: job.name().to_string(),
            namespace: job.namespace().to_string(),
            subscriptions: request.subscriptions,
            registration,
            unexpected: created_extra.into_iter().chain(invoked_extra).collect(),
        })
    }
}

/// Build the transport from `config` and run both phases.
pub async fn dispatch(
    config: &DispatchConfig,
    job_id: &str,
) -> Result<DispatchReport, DispatchError> {
    let client = build_client(config.trusted_ca_file.as_deref())?;
    let dispatcher = Dispatcher::new(client, config.api_url.clone(), &config.access_token);
    dispatcher.run(config, job_id).await
}
