//! Courier - dispatch stored requests from the command line
//!
//! Wires the registry, the three protocol senders, the JSON-path evaluator,
//! the script executor and the preferences into one `DispatchService`.

pub mod workbench;

use std::path::PathBuf;
use std::sync::Arc;

use courier_application::{DispatchService, SendContext, VariableStore};
use courier_domain::{Preferences, RequestKind};
use courier_infrastructure::{
    DslScriptExecutor, GraphQlSender, GrpcSender, HttpSender, InMemoryRegistry, SharedPreferences,
    SimpleJsonPath, TracingNotifier,
};

pub use workbench::{Workbench, WorkbenchError};

/// A fully wired dispatch pipeline.
pub struct Courier {
    /// The dispatch service
    pub service: DispatchService,
    /// Registry holding the workbench contents
    pub registry: Arc<InMemoryRegistry>,
    /// Live preferences read by every send
    pub preferences: SharedPreferences,
    /// Global variables
    pub variables: VariableStore,
}

impl Courier {
    /// Loads `workbench` into a fresh registry and wires every adapter.
    ///
    /// Relative body file paths resolve against `base_dir` when given.
    #[must_use]
    pub fn new(workbench: Workbench, preferences: Preferences, base_dir: Option<PathBuf>) -> Self {
        let registry = Arc::new(InMemoryRegistry::new());
        for collection in workbench.collections {
            registry.insert_collection(collection);
        }
        for environment in workbench.environments {
            registry.insert_environment(environment);
        }
        for request in workbench.requests {
            registry.insert_request(request);
        }
        let variables: VariableStore = workbench.variables.into_iter().collect();
        let preferences = SharedPreferences::new(preferences);

        let context = SendContext::new(
            registry.clone(),
            registry.clone(),
            variables.clone(),
            Arc::new(preferences.clone()),
        );
        let mut http = HttpSender::new(context.clone());
        if let Some(dir) = base_dir {
            http = http.with_base_dir(dir);
        }

        let service = DispatchService::new(
            context.clone(),
            Arc::new(SimpleJsonPath),
            Arc::new(TracingNotifier),
        )
        .with_sender(RequestKind::Http, Arc::new(http))
        .with_sender(RequestKind::GraphQl, Arc::new(GraphQlSender::new(context.clone())))
        .with_sender(RequestKind::Grpc, Arc::new(GrpcSender::new(context)))
        .with_script_executor(Arc::new(DslScriptExecutor::new()));

        Self {
            service,
            registry,
            preferences,
            variables,
        }
    }

    /// Current registry contents as a workbench.
    #[must_use]
    pub fn snapshot(&self) -> Workbench {
        Workbench {
            requests: self.registry.requests(),
            collections: self.registry.collections(),
            environments: self.registry.environments(),
            variables: self.variables.snapshot(),
        }
    }
}
