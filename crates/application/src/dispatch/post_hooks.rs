//! Post-request processing: extraction, scripting and set-environment

use std::sync::Arc;

use courier_domain::{
    ExtractRule, ProtocolSpec, Request, Response, ResponseSource, UpdateSource,
};
use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::service::DispatchService;
use crate::error::{DispatchError, DispatchResult};
use crate::ports::{EnvironmentRepository, JsonPathEvaluator, RequestView, ResponseView, ScriptParams};

/// Reads one value out of a response.
///
/// Body lookups need a JSON body; non-string matches count as not found.
fn lookup_value(
    json_path: &dyn JsonPathEvaluator,
    document: Option<&Value>,
    response: &Response,
    source: ResponseSource,
    key: &str,
) -> DispatchResult<Option<String>> {
    match source {
        ResponseSource::Body => {
            let Some(document) = document else {
                return Ok(None);
            };
            Ok(json_path
                .get(document, key)?
                .and_then(|value| value.as_str().map(str::to_string)))
        }
        other => Ok(response.source_value(other, key).map(str::to_string)),
    }
}

fn body_document(response: &Response) -> Option<Value> {
    if response.is_json {
        serde_json::from_slice(&response.body).ok()
    } else {
        None
    }
}

/// Everything one extraction task needs, owned.
struct ExtractTask {
    json_path: Arc<dyn JsonPathEvaluator>,
    environments: Arc<dyn EnvironmentRepository>,
    document: Option<Arc<Value>>,
    response: Arc<Response>,
    environment_id: String,
    source: UpdateSource,
}

impl ExtractTask {
    fn run(&self, rule: &ExtractRule) -> DispatchResult<()> {
        let value = lookup_value(
            self.json_path.as_ref(),
            self.document.as_deref(),
            &self.response,
            rule.from,
            &rule.source_key,
        )?;
        let Some(value) = value else {
            debug!(target_var = %rule.target, key = %rule.source_key, "no value to extract");
            return Ok(());
        };
        self.environments
            .set_values(&self.environment_id, &[(rule.target.clone(), value)], self.source)
    }
}

impl DispatchService {
    pub(super) async fn post_request(
        &self,
        request: &Request,
        environment_id: Option<&str>,
        response: Response,
    ) -> DispatchResult<Response> {
        let response = Arc::new(response);
        let source = UpdateSource::from(request.kind());

        self.extract_variables(request, environment_id, &response, source)
            .await?;

        if let Some(code) = request.post_request.script() {
            self.run_script(request, environment_id, &response, code)
                .await?;
        }

        if let Some(rule) = request.post_request.set_environment() {
            if rule.status_code == response.status_code {
                let document = body_document(&response);
                let value = lookup_value(
                    self.json_path.as_ref(),
                    document.as_ref(),
                    &response,
                    rule.from,
                    &rule.from_key,
                )?;
                match (environment_id, value) {
                    (Some(env_id), Some(value)) => {
                        self.context.environments.set_values(
                            env_id,
                            &[(rule.target.clone(), value)],
                            source,
                        )?;
                    }
                    (None, _) => warn!(request_id = %request.id, "no active environment, set-environment skipped"),
                    (Some(_), None) => debug!(request_id = %request.id, key = %rule.from_key, "set-environment found no value"),
                }
            }
        }

        Ok(Arc::unwrap_or_clone(response))
    }

    /// Runs every applicable rule as its own task and joins them.
    ///
    /// The first failing task aborts the rest.
    async fn extract_variables(
        &self,
        request: &Request,
        environment_id: Option<&str>,
        response: &Arc<Response>,
        source: UpdateSource,
    ) -> DispatchResult<()> {
        let rules: Vec<ExtractRule> = request
            .extract
            .iter()
            .filter(|rule| rule.applies_to(response.status_code))
            .cloned()
            .collect();
        if rules.is_empty() {
            return Ok(());
        }

        let Some(environment_id) = environment_id else {
            warn!(request_id = %request.id, rules = rules.len(), "no active environment, extraction skipped");
            return Ok(());
        };
        if self.context.environments.get_environment(environment_id).is_none() {
            warn!(request_id = %request.id, environment_id, "environment disappeared, extraction skipped");
            return Ok(());
        }

        let task = Arc::new(ExtractTask {
            json_path: Arc::clone(&self.json_path),
            environments: Arc::clone(&self.context.environments),
            document: body_document(response).map(Arc::new),
            response: Arc::clone(response),
            environment_id: environment_id.to_string(),
            source,
        });

        let mut set = JoinSet::new();
        for rule in rules {
            let task = Arc::clone(&task);
            set.spawn(async move { task.run(&rule) });
        }

        while let Some(joined) = set.join_next().await {
            let outcome = joined.map_err(|e| DispatchError::Extraction(e.to_string()))?;
            if let Err(err) = outcome {
                set.abort_all();
                return Err(err);
            }
        }
        Ok(())
    }

    async fn run_script(
        &self,
        request: &Request,
        environment_id: Option<&str>,
        response: &Response,
        code: &str,
    ) -> DispatchResult<()> {
        let executor = match &self.script_executor {
            Some(executor) if self.context.preferences().scripting_enabled => executor,
            _ => {
                warn!(request_id = %request.id, "scripting is disabled, post-request script skipped");
                self.notifier
                    .warn("Scripting is disabled, enable it in preferences to run post-request scripts");
                return Ok(());
            }
        };

        let environment = environment_id.and_then(|id| self.context.environments.get_environment(id));
        let params = ScriptParams {
            environment: environment.clone(),
            globals: self.context.variables.snapshot(),
            request: self.request_view(request, environment_id, response),
            response: ResponseView::from(response),
        };

        let outcome = executor.execute(code, params).await?;
        for line in &outcome.prints {
            info!(target: "courier::script", request_id = %request.id, "{line}");
            self.notifier.print(line);
        }

        let assignments: Vec<_> = outcome.string_assignments().collect();
        if assignments.is_empty() {
            return Ok(());
        }
        let Some(mut environment) = environment else {
            warn!(request_id = %request.id, "no active environment, script assignments dropped");
            return Ok(());
        };
        for (key, value) in assignments {
            environment.set_key(key, value);
        }
        self.context
            .environments
            .update_environment(environment, UpdateSource::Script, false)
    }

    fn request_view(
        &self,
        request: &Request,
        environment_id: Option<&str>,
        response: &Response,
    ) -> RequestView {
        // Re-resolve for the view; fall back to the stored template.
        let spec = self
            .context
            .prepare(&request.id, environment_id)
            .map_or_else(|_| request.spec.clone(), |prepared| prepared.request.spec);
        let (url, method) = match &spec {
            ProtocolSpec::Http(http) => (http.url.clone(), http.method.to_string()),
            ProtocolSpec::GraphQl(gql) => (gql.url.clone(), "POST".to_string()),
            ProtocolSpec::Grpc(grpc) => (grpc.address.clone(), grpc.path()),
        };
        RequestView {
            id: request.id.clone(),
            name: request.name.clone(),
            kind: request.kind(),
            url,
            method,
            headers: response.request_headers.clone(),
        }
    }
}
