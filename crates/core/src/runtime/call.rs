//! Handles for dispatched calls and fan-out results.

use crate::agents::message::Response;
use crate::cancellation::CancellationToken;
use crate::runtime::error::{RuntimeError, RuntimeResult};
use ak_protocol::runtime_models::DeliveryStatus;
use futures::future::BoxFuture;
use std::future::IntoFuture;
use std::time::Duration;
use tokio::sync::oneshot;
use uuid::Uuid;

/// A call accepted by the runtime whose outcome has not been awaited yet.
///
/// The call's [`CancellationToken`] is reachable through the handle so the
/// caller can abandon it from outside the handler. Awaiting the handle (or
/// calling [`response`](PendingCall::response)) yields the outcome.
#[derive(Debug)]
pub struct PendingCall {
    agent: String,
    call_id: Uuid,
    token: CancellationToken,
    receiver: oneshot::Receiver<RuntimeResult<Response>>,
}

impl PendingCall {
    pub(crate) fn new(
        agent: String,
        call_id: Uuid,
        token: CancellationToken,
        receiver: oneshot::Receiver<RuntimeResult<Response>>,
    ) -> Self {
        Self {
            agent,
            call_id,
            token,
            receiver,
        }
    }

    /// Name of the target agent.
    pub fn agent(&self) -> &str {
        &self.agent
    }

    /// Identifier of this call, as reported in runtime events.
    pub fn call_id(&self) -> Uuid {
        self.call_id
    }

    /// The token governing this call's handler invocation.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Request cancellation of this call.
    pub fn cancel(&self) {
        self.token.request_cancellation();
    }

    /// Request cancellation once `deadline` has elapsed.
    ///
    /// Has no observable effect if the call finished first.
    pub fn cancel_after(&self, deadline: Duration) {
        let token = self.token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            token.request_cancellation();
        });
    }

    /// Wait for the outcome.
    ///
    /// A call whose worker went away without answering (for example because
    /// the agent was aborted after its grace period) resolves as
    /// [`RuntimeError::Cancelled`].
    pub async fn response(self) -> RuntimeResult<Response> {
        match self.receiver.await {
            Ok(outcome) => outcome,
            Err(_) => Err(RuntimeError::Cancelled { agent: self.agent }),
        }
    }
}

impl IntoFuture for PendingCall {
    type Output = RuntimeResult<Response>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.response())
    }
}

/// Outcome of one delivery in a `publish` fan-out.
#[derive(Debug)]
pub struct DeliveryResult {
    /// Agent the message was delivered to.
    pub agent: String,
    /// The agent's response, or why there is none.
    pub outcome: RuntimeResult<Response>,
}

impl DeliveryResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn status(&self) -> DeliveryStatus {
        match &self.outcome {
            Ok(_) => DeliveryStatus::Completed,
            Err(e) => e.delivery_status().unwrap_or(DeliveryStatus::Failed),
        }
    }
}
