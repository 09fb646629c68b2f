//! Dispatch Service
//!
//! Runs one dispatch end to end:
//! `Idle -> PreHook -> Sending -> PostHook -> Done`, or `Failed` from any phase.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use courier_domain::{DispatchPhase, Request, RequestKind, Response};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{DispatchError, DispatchResult, EntityKind};
use crate::ports::{JsonPathEvaluator, Notifier, RequestSender, ScriptExecutor};
use crate::prepare::SendContext;

/// Tunables of the dispatch service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Maximum number of nested trigger requests above one dispatch.
    pub max_trigger_depth: usize,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            max_trigger_depth: 8,
        }
    }
}

type DispatchFuture<'a> = Pin<Box<dyn Future<Output = DispatchResult<Response>> + Send + 'a>>;

/// Orchestrates hooks and protocol senders.
pub struct DispatchService {
    pub(super) senders: HashMap<RequestKind, Arc<dyn RequestSender>>,
    pub(super) context: SendContext,
    pub(super) json_path: Arc<dyn JsonPathEvaluator>,
    pub(super) notifier: Arc<dyn Notifier>,
    pub(super) script_executor: Option<Arc<dyn ScriptExecutor>>,
    pub(super) options: DispatchOptions,
}

impl DispatchService {
    /// Creates a service with no senders registered.
    #[must_use]
    pub fn new(
        context: SendContext,
        json_path: Arc<dyn JsonPathEvaluator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            senders: HashMap::new(),
            context,
            json_path,
            notifier,
            script_executor: None,
            options: DispatchOptions::default(),
        }
    }

    /// Registers the sender for a protocol kind, replacing any previous one.
    #[must_use]
    pub fn with_sender(mut self, kind: RequestKind, sender: Arc<dyn RequestSender>) -> Self {
        self.senders.insert(kind, sender);
        self
    }

    /// Configures the script executor.
    #[must_use]
    pub fn with_script_executor(mut self, executor: Arc<dyn ScriptExecutor>) -> Self {
        self.script_executor = Some(executor);
        self
    }

    /// Overrides the default options.
    #[must_use]
    pub const fn with_options(mut self, options: DispatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Dispatches `request_id` against `environment_id`.
    ///
    /// # Errors
    ///
    /// Any failure of the pre hook, the send or the post hooks aborts the
    /// dispatch and is returned as is.
    pub async fn send(
        &self,
        request_id: &str,
        environment_id: Option<&str>,
    ) -> DispatchResult<Response> {
        self.dispatch(request_id, environment_id, Vec::new()).await
    }

    /// Like [`send`](Self::send), but gives up when `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if cancellation wins the race, or if `cancel`
    /// was already cancelled.
    pub async fn send_with_cancellation(
        &self,
        request_id: &str,
        environment_id: Option<&str>,
        cancel: CancellationToken,
    ) -> DispatchResult<Response> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(request_id, "dispatch cancelled");
                Err(DispatchError::Cancelled)
            }
            result = self.send(request_id, environment_id) => result,
        }
    }

    /// One level of dispatch. `chain` holds the ids of the dispatches that
    /// triggered this one, outermost first.
    fn dispatch<'a>(
        &'a self,
        request_id: &'a str,
        environment_id: Option<&'a str>,
        chain: Vec<String>,
    ) -> DispatchFuture<'a> {
        Box::pin(async move {
            debug!(request_id, phase = %DispatchPhase::Idle, depth = chain.len(), "dispatch");
            let result = self.run(request_id, environment_id, chain).await;
            match &result {
                Ok(response) => debug!(
                    request_id,
                    phase = %DispatchPhase::Done,
                    status = response.status_code,
                    "dispatch finished"
                ),
                Err(err) => debug!(request_id, phase = %DispatchPhase::Failed, error = %err, "dispatch failed"),
            }
            result
        })
    }

    async fn run(
        &self,
        request_id: &str,
        environment_id: Option<&str>,
        mut chain: Vec<String>,
    ) -> DispatchResult<Response> {
        let request = self
            .context
            .requests
            .get_request(request_id)
            .ok_or_else(|| DispatchError::not_found(EntityKind::Request, request_id))?;

        self.guard_cycle(&chain, request_id)?;
        chain.push(request_id.to_string());

        self.pre_request(&request, environment_id, chain).await?;

        debug!(request_id, phase = %DispatchPhase::Sending, kind = %request.kind());
        let sender = self
            .senders
            .get(&request.kind())
            .ok_or(DispatchError::UnknownRequestType(request.kind()))?;
        let response = sender.send_request(request_id, environment_id).await?;

        debug!(request_id, phase = %DispatchPhase::PostHook);
        self.post_request(&request, environment_id, response).await
    }

    fn guard_cycle(&self, chain: &[String], request_id: &str) -> DispatchResult<()> {
        if chain.iter().any(|id| id == request_id) || chain.len() > self.options.max_trigger_depth
        {
            let mut chain = chain.to_vec();
            chain.push(request_id.to_string());
            warn!(chain = ?chain, "trigger request chain rejected");
            return Err(DispatchError::CyclicTrigger { chain });
        }
        Ok(())
    }

    async fn pre_request(
        &self,
        request: &Request,
        environment_id: Option<&str>,
        chain: Vec<String>,
    ) -> DispatchResult<()> {
        if !request.pre_request.is_doable() {
            return Ok(());
        }
        debug!(request_id = %request.id, phase = %DispatchPhase::PreHook);

        match request.pre_request.trigger_target() {
            Some(target) => {
                self.dispatch(target, environment_id, chain).await?;
            }
            None => debug!(request_id = %request.id, "pre-request script is not run"),
        }
        Ok(())
    }
}
