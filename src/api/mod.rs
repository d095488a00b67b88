//! Sensu API side of the runbook: configuration, wire types, TLS transport,
//! response classification and the two-phase dispatcher.
//!
//! config     -> ConfigInput / DispatchConfig (validated once, read-only)
//! model      -> JobDefinition / ExecutionRequest
//! transport  -> build_client (system roots + optional CA file)
//! outcome    -> classify(phase, status)
//! dispatcher -> Dispatcher::create / invoke / run, dispatch()

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod model;
pub mod outcome;
pub mod transport;

pub use config::{ConfigInput, DispatchConfig};
pub use dispatcher::{DispatchReport, Registration, dispatch};
pub use error::{DispatchError, InputError};
