#![allow(clippy::unwrap_used, clippy::panic)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use courier_domain::{
    Cookie, Environment, ExtractRule, GraphQlRequestSpec, HttpMethod, HttpRequestSpec,
    PostRequest, PreRequest, Preferences, ProtocolSpec, Request, RequestKind, Response,
    ResponseSource, SetEnvironmentRule, UpdateSource,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::Value;

use super::*;
use crate::error::{DispatchError, DispatchResult};
use crate::ports::{
    JsonPathEvaluator, Notifier, RequestSender, ScriptExecutor, ScriptOutcome, ScriptParams,
};
use crate::prepare::SendContext;
use crate::prepare::tests::{FixedPreferences, MemoryRegistry};
use crate::variables::VariableStore;
use tokio_util::sync::CancellationToken;

/// Sender answering from a table of canned responses.
#[derive(Default)]
struct MockSender {
    responses: HashMap<String, Response>,
    calls: Mutex<Vec<(String, Option<String>)>>,
    delay: Option<Duration>,
}

impl MockSender {
    fn respond(mut self, request_id: &str, response: Response) -> Self {
        self.responses.insert(request_id.to_string(), response);
        self
    }

    fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl RequestSender for MockSender {
    async fn send_request(
        &self,
        request_id: &str,
        environment_id: Option<&str>,
    ) -> DispatchResult<Response> {
        self.calls
            .lock()
            .push((request_id.to_string(), environment_id.map(str::to_string)));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .get(request_id)
            .cloned()
            .ok_or_else(|| DispatchError::Transport(format!("connection refused: {request_id}")))
    }
}

/// Dotted-path evaluator (`$.a.b`), enough for these tests.
struct DottedPath;

impl JsonPathEvaluator for DottedPath {
    fn get(&self, document: &Value, path: &str) -> DispatchResult<Option<Value>> {
        let Some(rest) = path.strip_prefix("$.") else {
            return Err(DispatchError::Extraction(format!("invalid path: {path}")));
        };
        Ok(rest
            .split('.')
            .try_fold(document, |node, key| node.get(key))
            .cloned())
    }
}

#[derive(Default)]
struct RecordingNotifier {
    warnings: Mutex<Vec<String>>,
    prints: Mutex<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn warn(&self, message: &str) {
        self.warnings.lock().push(message.to_string());
    }

    fn print(&self, message: &str) {
        self.prints.lock().push(message.to_string());
    }
}

/// Executor returning a fixed outcome, or failing.
struct FixedScript(DispatchResult<ScriptOutcome>);

#[async_trait]
impl ScriptExecutor for FixedScript {
    async fn execute(&self, _script: &str, params: ScriptParams) -> DispatchResult<ScriptOutcome> {
        assert_eq!(params.response.status_code, 200);
        self.0.clone()
    }
}

struct Harness {
    registry: Arc<MemoryRegistry>,
    sender: Arc<MockSender>,
    notifier: Arc<RecordingNotifier>,
}

impl Harness {
    fn new(registry: MemoryRegistry, sender: MockSender) -> Self {
        Self {
            registry: Arc::new(registry),
            sender: Arc::new(sender),
            notifier: Arc::new(RecordingNotifier::default()),
        }
    }

    fn service_with(&self, preferences: Preferences) -> DispatchService {
        let context = SendContext::new(
            self.registry.clone(),
            self.registry.clone(),
            VariableStore::new(),
            Arc::new(FixedPreferences(preferences)),
        );
        DispatchService::new(context, Arc::new(DottedPath), self.notifier.clone())
            .with_sender(RequestKind::Http, self.sender.clone())
    }

    fn service(&self) -> DispatchService {
        self.service_with(Preferences::default())
    }

    fn env_value(&self, env_id: &str, key: &str) -> Option<String> {
        self.registry
            .environments
            .lock()
            .get(env_id)
            .and_then(|env| env.get(key).map(str::to_string))
    }

    fn update_count(&self) -> usize {
        self.registry.updates.lock().len()
    }
}

fn http_request(id: &str) -> Request {
    Request::new(
        id,
        ProtocolSpec::Http(HttpRequestSpec::new(HttpMethod::Get, "https://api.test")),
    )
    .with_id(id)
}

fn dev_env() -> Environment {
    Environment::new("dev").with_id("dev")
}

fn ok(body: &str) -> Response {
    Response::new(200, body.as_bytes().to_vec(), Duration::from_millis(3))
}

#[tokio::test]
async fn test_header_extraction_updates_once() {
    let mut response = ok("");
    response.append_header("X-Token", "abc");
    let h = Harness::new(
        MemoryRegistry::default()
            .with_environment(dev_env())
            .with_request(http_request("login").with_extract(ExtractRule::new(
                200,
                ResponseSource::Header,
                "X-Token",
                "token",
            ))),
        MockSender::default().respond("login", response),
    );

    let result = h.service().send("login", Some("dev")).await.unwrap();

    assert_eq!(result.status_code, 200);
    assert_eq!(h.env_value("dev", "token").as_deref(), Some("abc"));
    assert_eq!(
        h.registry.updates.lock().clone(),
        vec![("dev".to_string(), UpdateSource::Http)]
    );
}

#[tokio::test]
async fn test_extraction_skips_disabled_and_mismatched_rules() {
    let mut response = ok("");
    response.append_header("X-Token", "abc");
    let mut disabled = ExtractRule::new(200, ResponseSource::Header, "X-Token", "a");
    disabled.enabled = false;
    let h = Harness::new(
        MemoryRegistry::default().with_environment(dev_env()).with_request(
            http_request("login")
                .with_extract(disabled)
                .with_extract(ExtractRule::new(201, ResponseSource::Header, "X-Token", "b")),
        ),
        MockSender::default().respond("login", response),
    );

    h.service().send("login", Some("dev")).await.unwrap();
    assert_eq!(h.update_count(), 0);
}

#[tokio::test]
async fn test_body_extraction_runs_every_rule() {
    let h = Harness::new(
        MemoryRegistry::default().with_environment(dev_env()).with_request(
            http_request("me")
                .with_extract(ExtractRule::new(200, ResponseSource::Body, "$.user.id", "user_id"))
                .with_extract(ExtractRule::new(200, ResponseSource::Body, "$.user.name", "user_name"))
                .with_extract(ExtractRule::new(200, ResponseSource::Body, "$.user.age", "age")),
        ),
        MockSender::default().respond("me", ok(r#"{"user":{"id":"u1","name":"Ada","age":36}}"#)),
    );

    h.service().send("me", Some("dev")).await.unwrap();

    assert_eq!(h.env_value("dev", "user_id").as_deref(), Some("u1"));
    assert_eq!(h.env_value("dev", "user_name").as_deref(), Some("Ada"));
    // Only string values are written.
    assert_eq!(h.env_value("dev", "age"), None);
    assert_eq!(h.update_count(), 2);
}

#[tokio::test]
async fn test_body_extraction_on_text_body_is_skipped() {
    let h = Harness::new(
        MemoryRegistry::default().with_environment(dev_env()).with_request(
            http_request("ping")
                .with_extract(ExtractRule::new(200, ResponseSource::Body, "$.id", "id")),
        ),
        MockSender::default().respond("ping", ok("pong")),
    );

    h.service().send("ping", Some("dev")).await.unwrap();
    assert_eq!(h.update_count(), 0);
}

#[tokio::test]
async fn test_extraction_failure_aborts_dispatch() {
    let h = Harness::new(
        MemoryRegistry::default().with_environment(dev_env()).with_request(
            http_request("me")
                .with_extract(ExtractRule::new(200, ResponseSource::Body, "user.id", "id")),
        ),
        MockSender::default().respond("me", ok(r#"{"user":{"id":"u1"}}"#)),
    );

    let err = h.service().send("me", Some("dev")).await.unwrap_err();
    assert!(matches!(err, DispatchError::Extraction(_)));
}

#[tokio::test]
async fn test_extraction_without_environment_is_skipped() {
    let mut response = ok("");
    response.append_header("X-Token", "abc");
    let h = Harness::new(
        MemoryRegistry::default().with_request(http_request("login").with_extract(
            ExtractRule::new(200, ResponseSource::Header, "X-Token", "token"),
        )),
        MockSender::default().respond("login", response),
    );

    assert!(h.service().send("login", None).await.is_ok());
    assert_eq!(h.update_count(), 0);
}

#[tokio::test]
async fn test_trigger_runs_first_with_same_environment() {
    let h = Harness::new(
        MemoryRegistry::default()
            .with_environment(dev_env())
            .with_request(http_request("auth"))
            .with_request(http_request("orders").with_pre_request(PreRequest::TriggerRequest {
                request_id: "auth".to_string(),
            })),
        MockSender::default()
            .respond("auth", ok("{}"))
            .respond("orders", ok("[]")),
    );

    h.service().send("orders", Some("dev")).await.unwrap();
    assert_eq!(
        h.sender.calls(),
        vec![
            ("auth".to_string(), Some("dev".to_string())),
            ("orders".to_string(), Some("dev".to_string())),
        ]
    );
}

#[tokio::test]
async fn test_trigger_failure_aborts_outer_send() {
    let h = Harness::new(
        MemoryRegistry::default()
            .with_request(http_request("auth"))
            .with_request(http_request("orders").with_pre_request(PreRequest::TriggerRequest {
                request_id: "auth".to_string(),
            })),
        MockSender::default().respond("orders", ok("[]")),
    );

    let err = h.service().send("orders", None).await.unwrap_err();
    assert!(matches!(err, DispatchError::Transport(_)));
    assert_eq!(h.sender.calls().len(), 1);
}

#[tokio::test]
async fn test_self_trigger_is_rejected_before_sending() {
    let h = Harness::new(
        MemoryRegistry::default().with_request(http_request("loop").with_pre_request(
            PreRequest::TriggerRequest {
                request_id: "loop".to_string(),
            },
        )),
        MockSender::default().respond("loop", ok("{}")),
    );

    let err = h.service().send("loop", None).await.unwrap_err();
    assert_eq!(
        err,
        DispatchError::CyclicTrigger {
            chain: vec!["loop".to_string(), "loop".to_string()]
        }
    );
    assert!(h.sender.calls().is_empty());
}

#[tokio::test]
async fn test_trigger_depth_limit() {
    let trigger = |id: &str| PreRequest::TriggerRequest {
        request_id: id.to_string(),
    };
    let h = Harness::new(
        MemoryRegistry::default()
            .with_request(http_request("a").with_pre_request(trigger("b")))
            .with_request(http_request("b").with_pre_request(trigger("c")))
            .with_request(http_request("c")),
        MockSender::default()
            .respond("a", ok("{}"))
            .respond("b", ok("{}"))
            .respond("c", ok("{}")),
    );

    let shallow = h.service().with_options(DispatchOptions {
        max_trigger_depth: 1,
    });
    let err = shallow.send("a", None).await.unwrap_err();
    assert!(matches!(err, DispatchError::CyclicTrigger { ref chain } if chain.len() == 3));

    assert!(h.service().send("a", None).await.is_ok());
}

#[tokio::test]
async fn test_unknown_request_type() {
    let h = Harness::new(
        MemoryRegistry::default().with_request(
            Request::new("gql", ProtocolSpec::GraphQl(GraphQlRequestSpec::default())).with_id("gql"),
        ),
        MockSender::default(),
    );

    let err = h.service().send("gql", None).await.unwrap_err();
    assert_eq!(err, DispatchError::UnknownRequestType(RequestKind::GraphQl));
}

#[tokio::test]
async fn test_script_disabled_is_skipped_with_notice() {
    let h = Harness::new(
        MemoryRegistry::default().with_environment(dev_env()).with_request(
            http_request("r").with_post_request(PostRequest::Script {
                code: "set(\"a\", \"b\")".to_string(),
            }),
        ),
        MockSender::default().respond("r", ok("{}")),
    );
    let service = h
        .service()
        .with_script_executor(Arc::new(FixedScript(Err(DispatchError::ScriptExecution(
            "must not run".to_string(),
        )))));

    assert!(service.send("r", Some("dev")).await.is_ok());
    assert_eq!(h.notifier.warnings.lock().len(), 1);
    assert_eq!(h.update_count(), 0);
}

#[tokio::test]
async fn test_script_assignments_are_batched() {
    let h = Harness::new(
        MemoryRegistry::default().with_environment(dev_env()).with_request(
            http_request("r").with_post_request(PostRequest::Script {
                code: "...".to_string(),
            }),
        ),
        MockSender::default().respond("r", ok("{}")),
    );
    let mut outcome = ScriptOutcome::default();
    outcome.set_environments.insert("a".into(), Value::from("1"));
    outcome.set_environments.insert("b".into(), Value::from("2"));
    outcome.set_environments.insert("n".into(), Value::from(3));
    outcome.prints.push("hello".to_string());

    let service = h
        .service_with(Preferences {
            scripting_enabled: true,
            ..Preferences::default()
        })
        .with_script_executor(Arc::new(FixedScript(Ok(outcome))));
    service.send("r", Some("dev")).await.unwrap();

    assert_eq!(h.env_value("dev", "a").as_deref(), Some("1"));
    assert_eq!(h.env_value("dev", "b").as_deref(), Some("2"));
    assert_eq!(h.env_value("dev", "n"), None);
    assert_eq!(
        h.registry.updates.lock().clone(),
        vec![("dev".to_string(), UpdateSource::Script)]
    );
    assert_eq!(h.notifier.prints.lock().clone(), vec!["hello".to_string()]);
}

#[tokio::test]
async fn test_script_failure_aborts_dispatch() {
    let h = Harness::new(
        MemoryRegistry::default().with_request(http_request("r").with_post_request(
            PostRequest::Script {
                code: "assert(\"false\", \"boom\")".to_string(),
            },
        )),
        MockSender::default().respond("r", ok("{}")),
    );
    let service = h
        .service_with(Preferences {
            scripting_enabled: true,
            ..Preferences::default()
        })
        .with_script_executor(Arc::new(FixedScript(Err(DispatchError::ScriptExecution(
            "boom".to_string(),
        )))));

    let err = service.send("r", None).await.unwrap_err();
    assert_eq!(err, DispatchError::ScriptExecution("boom".to_string()));
}

#[tokio::test]
async fn test_set_environment_from_cookie() {
    let mut response = ok("");
    response.cookies.push(Cookie::new("sid", "s-42"));
    let rule = SetEnvironmentRule {
        status_code: 200,
        from: ResponseSource::Cookie,
        from_key: "sid".to_string(),
        target: "session".to_string(),
    };
    let h = Harness::new(
        MemoryRegistry::default()
            .with_environment(dev_env())
            .with_request(http_request("login").with_post_request(PostRequest::SetEnvironment(rule))),
        MockSender::default().respond("login", response),
    );

    h.service().send("login", Some("dev")).await.unwrap();
    assert_eq!(h.env_value("dev", "session").as_deref(), Some("s-42"));
    assert_eq!(h.update_count(), 1);
}

#[tokio::test]
async fn test_set_environment_ignores_other_status() {
    let rule = SetEnvironmentRule {
        status_code: 201,
        from: ResponseSource::Body,
        from_key: "$.id".to_string(),
        target: "id".to_string(),
    };
    let h = Harness::new(
        MemoryRegistry::default()
            .with_environment(dev_env())
            .with_request(http_request("r").with_post_request(PostRequest::SetEnvironment(rule))),
        MockSender::default().respond("r", ok(r#"{"id":"x"}"#)),
    );

    h.service().send("r", Some("dev")).await.unwrap();
    assert_eq!(h.update_count(), 0);
}

#[tokio::test]
async fn test_send_with_cancellation() {
    let sender = MockSender {
        delay: Some(Duration::from_secs(5)),
        ..MockSender::default()
    }
    .respond("slow", ok("{}"));
    let h = Harness::new(MemoryRegistry::default().with_request(http_request("slow")), sender);
    let service = h.service();

    let token = CancellationToken::new();
    let cancel = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();
    };
    let (result, ()) =
        tokio::join!(service.send_with_cancellation("slow", None, token.clone()), cancel);

    assert_eq!(result.unwrap_err(), DispatchError::Cancelled);
}

#[tokio::test]
async fn test_cancelled_token_sends_nothing() {
    let sender = MockSender::default().respond("r", ok("{}"));
    let h = Harness::new(MemoryRegistry::default().with_request(http_request("r")), sender);

    let token = CancellationToken::new();
    token.cancel();
    let err = h
        .service()
        .send_with_cancellation("r", None, token)
        .await
        .unwrap_err();

    assert_eq!(err, DispatchError::Cancelled);
    assert!(h.sender.calls().is_empty());
}

#[tokio::test]
async fn test_missing_request_is_not_found() {
    let h = Harness::new(MemoryRegistry::default(), MockSender::default());
    let err = h.service().send("ghost", None).await.unwrap_err();
    assert!(matches!(err, DispatchError::NotFound { .. }));
}
