/*!
Dispatch configuration.

`ConfigInput` is the loose, all-optional shape collected from flags,
environment and an optional config file. `DispatchConfig::from_input`
validates it once and produces the immutable value the dispatcher reads.

Validation order (first failure wins):
  api url present -> api url parseable -> namespace -> command
  -> subscriptions -> timeout > 0
*/

use std::path::PathBuf;

use url::Url;
use uuid::Uuid;

use super::error::InputError;

/// Default remote command timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u32 = 10;

/// Unvalidated inputs. Empty strings count as "not supplied".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigInput {
    pub command: Option<String>,
    pub timeout: Option<String>,
    pub namespace: Option<String>,
    pub subscriptions: Option<String>,
    pub runtime_assets: Option<String>,
    pub job_id: Option<String>,
    pub api_url: Option<String>,
    pub access_token: Option<String>,
    pub trusted_ca_file: Option<String>,
}

/// Validated, read-only configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    pub command: String,
    pub timeout: u32,
    pub namespace: String,
    pub subscriptions: Vec<String>,
    pub runtime_assets: Vec<String>,
    /// Caller-selected identifier; a fresh UUID is used when absent.
    pub job_id: Option<String>,
    pub api_url: Url,
    pub access_token: String,
    pub trusted_ca_file: Option<PathBuf>,
}

fn present(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.trim().is_empty())
}

/// Split a comma-separated list, keeping order and duplicates. Blank entries are dropped.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse the Sensu API base URL. Only http/https are accepted.
pub fn parse_api_url(raw: &str) -> Result<Url, InputError> {
    let trimmed = raw.trim();
    let invalid = |reason: String| InputError::InvalidApiUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}

impl DispatchConfig {
    pub fn from_input(input: &ConfigInput) -> Result<Self, InputError> {
        let raw_url = present(&input.api_url).ok_or(InputError::MissingApiUrl)?;
        let api_url = parse_api_url(raw_url)?;
        let namespace = present(&input.namespace).ok_or(InputError::MissingNamespace)?;
        let command = present(&input.command).ok_or(InputError::MissingCommand)?;
        let subscriptions = present(&input.subscriptions)
            .map(split_list)
            .filter(|subs| !subs.is_empty())
            .ok_or(InputError::MissingSubscriptions)?;

        let timeout = match present(&input.timeout) {
            None => DEFAULT_TIMEOUT_SECS,
            Some(t) => match t.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => return Err(InputError::InvalidTimeout(t.to_string())),
            },
        };

        Ok(DispatchConfig {
            command: command.to_string(),
            timeout,
            namespace: namespace.trim().to_string(),
            subscriptions,
            runtime_assets: present(&input.runtime_assets)
                .map(split_list)
                .unwrap_or_default(),
            job_id: present(&input.job_id).map(|s| s.trim().to_string()),
            api_url,
            access_token: input.access_token.clone().unwrap_or_default(),
            trusted_ca_file: present(&input.trusted_ca_file).map(PathBuf::from),
        })
    }

    /// Pick the identifier for this run: the caller's, or a new UUIDv4.
    pub fn resolve_job_id(&self) -> String {
        self.job_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }
}
