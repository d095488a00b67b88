/*!
Command layer.

`sensu-runbook` has a single flat command; this module keeps the CLI side
of it apart from the Sensu API core in `crate::api`.

Layout:
  src/cmd/
    mod.rs     (this file)
    run.rs     (RunArgs + execute_run)
    state.rs   (CheckState: OK / WARNING / CRITICAL and exit codes)
    shared.rs  (config file loading + merge into ConfigInput)
    format.rs  (box / color / table helpers for human output)

Conventions:
  - `execute_run` never panics or bails; every failure is mapped to a
    `CheckState` and reported on stdout (human or JSON).
  - Protocol progress is logged with `tracing` on stderr.
*/

pub mod format;
pub mod run;
pub mod shared;
pub mod state;

pub use run::{RunArgs, execute_run};
pub use state::CheckState;
