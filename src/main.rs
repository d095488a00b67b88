use clap::Parser;

mod api;
mod cmd;
mod utils;

use cmd::RunArgs;

/// Sensu Runbook - execute commands on Sensu agent nodes.
///
/// Registers a one-shot, unpublished check and asks the Sensu backend to run
/// it on the given subscriptions. The agents' results are not collected.
///
/// Flags / env:
///   -c / --command            SENSU_RUNBOOK_COMMAND
///   -s / --subscriptions      SENSU_RUNBOOK_SUBSCRIPTIONS  (comma-separated)
///   -t / --timeout            SENSU_RUNBOOK_TIMEOUT        (seconds, default 10)
///   -a / --runtime-assets     SENSU_RUNBOOK_ASSETS         (comma-separated)
///   -i / --id                 SENSU_RUNBOOK_JOB_ID         (default random UUIDv4)
///   -n / --namespace          SENSU_NAMESPACE
///   --sensu-api-url           SENSU_API_URL
///   --sensu-access-token      SENSU_ACCESS_TOKEN
///   --sensu-trusted-ca-file   SENSU_TRUSTED_CA_FILE
///   --config-file             SENSU_RUNBOOK_CONFIG         (JSON / YAML)
///   -v / -vv, -q              log verbosity (stderr)
///
/// Exit status: 0 OK, 1 WARNING (bad input), 2 CRITICAL (request failed).
///
/// Examples:
///   sensu-runbook -n default -s linux,web -c "systemctl restart nginx"
///   sensu-runbook -i disk-report -s db -c "df -h" --sensu-trusted-ca-file ca.pem --json
#[derive(Parser, Debug)]
#[command(
    name = "sensu-runbook",
    version,
    author,
    about = "Sensu Runbook Automation. Execute commands on Sensu Agent nodes."
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Silence all non-error logging
    #[arg(short, long)]
    quiet: bool,

    #[command(flatten)]
    run: RunArgs,
}

fn main() {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    let state = cmd::execute_run(cli.run);
    std::process::exit(state.exit_code());
}
