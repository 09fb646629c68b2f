//! Courier Application - The request-dispatch pipeline
//!
//! This crate holds the ports every external collaborator implements, the
//! variable store and `{{name}}` substitution, the request preparation shared
//! by all protocol senders, and the `DispatchService` orchestrating hooks
//! around a send.

pub mod dispatch;
pub mod error;
pub mod ports;
pub mod prepare;
pub mod variables;

pub use dispatch::{DispatchOptions, DispatchService};
pub use error::{DispatchError, DispatchResult, EntityKind};
pub use ports::{
    EnvironmentRepository, JsonPathEvaluator, Notifier, PreferencesProvider, RequestRepository,
    RequestSender, RequestView, ResponseView, ScriptExecutor, ScriptOutcome, ScriptParams,
};
pub use prepare::{PreparedRequest, SendContext};
pub use variables::{Substitution, VariableStore};
