/*!
`run.rs`

The one command `sensu-runbook` has: register a one-shot check and ask
Sensu to execute it on a set of subscriptions.

Flow:
  flags/env (+ optional config file) -> ConfigInput
  ConfigInput -> DispatchConfig             (failure: WARNING, no request sent)
  resolve job id (flag or fresh UUIDv4)
  dispatch: create -> execute               (failure: CRITICAL)
  summary on stdout, exit code from CheckState

JSON Success Output:
{
  "status": "ok",
  "state": "OK",
  "job": "…",
  "namespace": "default",
  "subscriptions": ["web", "db"],
  "created": true,
  "elapsed_ms": 42,
  "responses": [ { "phase": "create", "status": 200, "body": "…" } ]
}

JSON Error Output:
{
  "status": "error",
  "state": "WARNING" | "CRITICAL",
  "error": "message"
}
*/

use std::time::Instant;

use anyhow::Context;
use clap::Args;
use tracing::{debug, error};

use super::format::{Role, StyleOptions, box_header, color, emoji, kv_table};
use super::shared::{load_config_file, merge_into_input};
use super::state::CheckState;
use crate::api::dispatcher::UnexpectedResponse;
use crate::api::{ConfigInput, DispatchConfig, DispatchReport, Registration, dispatch};

/// Name reported in check output.
pub const CHECK_NAME: &str = "sensu-runbook";

/* -------------------------------------------------------------------------- */
/* Argument Struct                                                            */
/* -------------------------------------------------------------------------- */

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// The ID or name to use for the job (defaults to a random UUIDv4)
    #[arg(short = 'i', long = "id", env = "SENSU_RUNBOOK_JOB_ID")]
    pub id: Option<String>,

    /// The command that should be executed by the Sensu Go agent(s)
    #[arg(short = 'c', long, env = "SENSU_RUNBOOK_COMMAND")]
    pub command: Option<String>,

    /// Command execution timeout, in seconds [default: 10]
    #[arg(short = 't', long, env = "SENSU_RUNBOOK_TIMEOUT", value_name = "SECONDS")]
    pub timeout: Option<String>,

    /// Comma-separated list of assets to distribute with the command(s)
    #[arg(short = 'a', long = "runtime-assets", env = "SENSU_RUNBOOK_ASSETS")]
    pub runtime_assets: Option<String>,

    /// Comma-separated list of subscriptions to execute the command(s) on
    #[arg(short = 's', long, env = "SENSU_RUNBOOK_SUBSCRIPTIONS")]
    pub subscriptions: Option<String>,

    /// Sensu Namespace to perform the runbook automation
    #[arg(short = 'n', long, env = "SENSU_NAMESPACE")]
    pub namespace: Option<String>,

    /// Sensu API URL
    #[arg(long = "sensu-api-url", env = "SENSU_API_URL", value_name = "URL")]
    pub sensu_api_url: Option<String>,

    /// Sensu API Access Token
    #[arg(
        long = "sensu-access-token",
        env = "SENSU_ACCESS_TOKEN",
        hide_env_values = true
    )]
    pub sensu_access_token: Option<String>,

    /// Sensu API Trusted Certificate Authority File
    #[arg(
        long = "sensu-trusted-ca-file",
        env = "SENSU_TRUSTED_CA_FILE",
        value_name = "PATH"
    )]
    pub sensu_trusted_ca_file: Option<String>,

    /// JSON or YAML file supplying any of the options above (flags and env win)
    #[arg(long = "config-file", env = "SENSU_RUNBOOK_CONFIG", value_name = "PATH")]
    pub config_file: Option<String>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    pub fn to_input(&self) -> ConfigInput {
        ConfigInput {
            command: self.command.clone(),
            timeout: self.timeout.clone(),
            namespace: self.namespace.clone(),
            subscriptions: self.subscriptions.clone(),
            runtime_assets: self.runtime_assets.clone(),
            job_id: self.id.clone(),
            api_url: self.sensu_api_url.clone(),
            access_token: self.sensu_access_token.clone(),
            trusted_ca_file: self.sensu_trusted_ca_file.clone(),
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Public Entry Point                                                         */
/* -------------------------------------------------------------------------- */

/// Collect and validate configuration. Any failure here is a WARNING.
pub fn prepare(args: &RunArgs) -> Result<DispatchConfig, crate::api::InputError> {
    let mut input = args.to_input();
    if let Some(path) = args.config_file.as_deref().filter(|p| !p.trim().is_empty()) {
        let file = load_config_file(path)?;
        merge_into_input(&mut input, &file);
    }
    DispatchConfig::from_input(&input)
}

/// Single-threaded runtime: the two requests are strictly sequential.
fn build_runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")
}

pub fn execute_run(args: RunArgs) -> CheckState {
    let config = match prepare(&args) {
        Ok(c) => c,
        Err(e) => {
            let state = CheckState::from_input_error(&e);
            output_error(args.json, state, &e.to_string());
            return state;
        }
    };

    // written once here, read by both phases
    let job_id = config.resolve_job_id();
    debug!(job = %job_id, namespace = %config.namespace, "configuration ready");

    let rt = match build_runtime() {
        Ok(rt) => rt,
        Err(e) => {
            output_error(args.json, CheckState::Critical, &format!("{e:#}"));
            return CheckState::Critical;
        }
    };

    let started = Instant::now();
    let result = rt.block_on(dispatch(&config, &job_id));
    let elapsed_ms = started.elapsed().as_millis();

    match result {
        Ok(report) => {
            output_success(args.json, &report, elapsed_ms);
            CheckState::Ok
        }
        Err(e) => {
            error!(phase = ?e.phase(), status = ?e.status(), "{e}");
            let state = CheckState::from_dispatch_error(&e);
            output_error(args.json, state, &e.to_string());
            state
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Output Helpers                                                             */
/* -------------------------------------------------------------------------- */

fn responses_json(unexpected: &[UnexpectedResponse]) -> serde_json::Value {
    unexpected
        .iter()
        .map(|u| {
            serde_json::json!({
                "phase": u.phase.to_string(),
                "status": u.status,
                "body": u.body,
            })
        })
        .collect()
}

pub fn success_json(report: &DispatchReport, elapsed_ms: u128) -> serde_json::Value {
    serde_json::json!({
        "status": "ok",
        "state": CheckState::Ok.label(),
        "job": report.job_id,
        "namespace": report.namespace,
        "subscriptions": report.subscriptions,
        "created": report.registration == Registration::Created,
        "elapsed_ms": elapsed_ms,
        "responses": responses_json(&report.unexpected),
    })
}

pub fn error_json(state: CheckState, msg: &str) -> serde_json::Value {
    serde_json::json!({
        "status": "error",
        "state": state.label(),
        "error": msg,
    })
}

fn output_success(json: bool, report: &DispatchReport, elapsed_ms: u128) {
    if json {
        let v = success_json(report, elapsed_ms);
        println!(
            "{}",
            serde_json::to_string_pretty(&v).unwrap_or_else(|_| v.to_string())
        );
        return;
    }

    // bodies of unexpected 2xx responses go out verbatim first
    for u in &report.unexpected {
        println!("{}", u.body);
    }

    let style = StyleOptions::detect();
    let title = format!(
        "{} {CHECK_NAME} {}",
        emoji("success", &style),
        color(Role::Success, CheckState::Ok.label(), &style)
    );
    println!(
        "{}",
        box_header(
            title,
            Some(format!("runbook job requested • {elapsed_ms} ms")),
            &style
        )
    );
    let rows = [
        ("job", report.job_id.clone()),
        ("namespace", report.namespace.clone()),
        ("subscriptions", report.subscriptions.join(",")),
        ("definition", report.registration.as_str().to_string()),
    ];
    println!("{}", kv_table(&rows, &style));
}

fn output_error(json: bool, state: CheckState, msg: &str) {
    if json {
        let v = error_json(state, msg);
        println!(
            "{}",
            serde_json::to_string_pretty(&v).unwrap_or_else(|_| v.to_string())
        );
        return;
    }

    let style = StyleOptions::detect();
    let (tag, role) = match state {
        CheckState::Warning => ("warn", Role::Warning),
        _ => ("error", Role::Error),
    };
    let title = format!(
        "{} {CHECK_NAME} {}",
        emoji(tag, &style),
        color(role, state.label(), &style)
    );
    println!("{}", box_header(title, Some(color(role, msg, &style)), &style));
    println!(
        "{} {}",
        emoji("info", &style),
        color(Role::Dim, "Re-run with -v for request details.", &style)
    );
}

/* -------------------------------------------------------------------------- */
/* Tests                                                                      */
/* -------------------------------------------------------------------------- */
