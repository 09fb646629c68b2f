//! Port definitions (interfaces)
//!
//! Ports are the boundary between the dispatch pipeline and its external
//! collaborators. Adapters in the infrastructure layer implement them.

mod json_path;
mod notifier;
mod preferences;
mod registry;
mod script;
mod sender;

pub use json_path::JsonPathEvaluator;
pub use notifier::Notifier;
pub use preferences::PreferencesProvider;
pub use registry::{EnvironmentRepository, RequestRepository};
pub use script::{RequestView, ResponseView, ScriptExecutor, ScriptOutcome, ScriptParams};
pub use sender::RequestSender;
