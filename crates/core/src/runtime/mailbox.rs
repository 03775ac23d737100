//! Per-agent mailbox and worker.
//!
//! Every registered agent gets one FIFO mailbox and one worker task that owns
//! the agent value. The worker takes envelopes strictly in acceptance order and
//! runs one handler invocation at a time, which is what gives each agent its
//! execution slot. The slot state is published through a watch channel so the
//! runtime can find and cancel the in-flight invocation on deregistration.
//!
//! A deregistered mailbox leaves its slot receiver behind as a tombstone. An
//! agent registered again under the same name waits on it before its first
//! invocation, so a handler that outlived its grace period never overlaps
//! with its successor.

use crate::agents::base::{Agent, AgentError};
use crate::agents::message::{Message, MessageType, Response};
use crate::cancellation::CancellationToken;
use crate::config::models::GracePolicy;
use crate::runtime::call::PendingCall;
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::events::EventSink;
use ak_protocol::config_models::StaleHandlerPolicy;
use ak_protocol::ipc::RuntimeEvent;
use ak_protocol::runtime_models::{AgentInfo, DeliveryStatus, SlotStatus};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// A message accepted for one agent, waiting for its execution slot.
pub(crate) struct Envelope {
    call_id: Uuid,
    message: Message,
    token: CancellationToken,
    reply: oneshot::Sender<RuntimeResult<Response>>,
}

/// Execution slot of one agent.
#[derive(Debug, Clone)]
pub(crate) enum SlotState {
    Idle,
    Busy {
        call_id: Uuid,
        token: CancellationToken,
    },
}

impl SlotState {
    pub(crate) fn status(&self) -> SlotStatus {
        match self {
            Self::Idle => SlotStatus::Idle,
            Self::Busy { .. } => SlotStatus::Busy,
        }
    }

    /// Whether this slot still holds a running handler.
    ///
    /// A closed channel means the worker is gone, so nothing holds the slot.
    pub(crate) fn is_held(slot: &watch::Receiver<SlotState>) -> bool {
        slot.has_changed().is_ok() && matches!(*slot.borrow(), SlotState::Busy { .. })
    }

    fn call_id(&self) -> Option<Uuid> {
        match self {
            Self::Idle => None,
            Self::Busy { call_id, .. } => Some(*call_id),
        }
    }
}

/// State shared between a mailbox handle and its worker.
#[derive(Debug, Default)]
struct MailboxShared {
    /// Envelopes accepted but not yet taken by the worker.
    queued: AtomicUsize,
    /// Set on deregistration: queued envelopes are rejected from now on.
    closing: AtomicBool,
    /// Set when the grace period expired: the in-flight result is discarded.
    retired: AtomicBool,
}

/// Runtime-side handle to an agent's mailbox and worker.
pub(crate) struct Mailbox {
    name: String,
    subscriptions: HashSet<MessageType>,
    sender: mpsc::UnboundedSender<Envelope>,
    slot: watch::Receiver<SlotState>,
    shared: Arc<MailboxShared>,
    worker: JoinHandle<()>,
    registered_at: DateTime<Utc>,
    sequence: u64,
}

impl Mailbox {
    /// Move `agent` into a freshly spawned worker.
    ///
    /// Must be called from within a tokio runtime.
    pub(crate) fn spawn(
        agent: Box<dyn Agent>,
        name: String,
        subscriptions: HashSet<MessageType>,
        sequence: u64,
        predecessor: Option<watch::Receiver<SlotState>>,
        events: EventSink,
    ) -> Self {
        let (sender, inbox) = mpsc::unbounded_channel();
        let (slot_tx, slot) = watch::channel(SlotState::Idle);
        let shared = Arc::new(MailboxShared::default());

        let worker = tokio::spawn(run_worker(
            agent,
            name.clone(),
            inbox,
            slot_tx,
            Arc::clone(&shared),
            predecessor,
            events,
        ));

        Self {
            name,
            subscriptions,
            sender,
            slot,
            shared,
            worker,
            registered_at: Utc::now(),
            sequence,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Receiver for this mailbox's execution slot.
    pub(crate) fn slot(&self) -> watch::Receiver<SlotState> {
        self.slot.clone()
    }

    /// Exact-type subscription check.
    pub(crate) fn accepts(&self, message_type: &MessageType) -> bool {
        self.subscriptions.contains(message_type)
    }

    /// Accept `message` at the tail of the mailbox under a fresh token.
    pub(crate) fn enqueue(&self, message: Message) -> PendingCall {
        let call_id = Uuid::new_v4();
        let token = CancellationToken::new();
        let (reply, receiver) = oneshot::channel();

        self.shared.queued.fetch_add(1, Ordering::SeqCst);
        let envelope = Envelope {
            call_id,
            message,
            token: token.clone(),
            reply,
        };

        if self.sender.send(envelope).is_err() {
            // The worker is gone; dropping the reply resolves the call as cancelled.
            self.shared.queued.fetch_sub(1, Ordering::SeqCst);
            tracing::warn!(agent = %self.name, %call_id, "Worker stopped, message not accepted");
        } else {
            tracing::debug!(agent = %self.name, %call_id, "Message accepted");
        }

        PendingCall::new(self.name.clone(), call_id, token, receiver)
    }

    pub(crate) fn info(&self) -> AgentInfo {
        let mut subscriptions: Vec<String> = self
            .subscriptions
            .iter()
            .map(|message_type| message_type.name().to_string())
            .collect();
        subscriptions.sort();

        AgentInfo {
            name: self.name.clone(),
            subscriptions,
            slot: self.slot.borrow().status(),
            queued: self.shared.queued.load(Ordering::SeqCst),
            registered_at: self.registered_at,
        }
    }

    /// Stop the mailbox and reclaim the execution slot.
    ///
    /// Queued envelopes are rejected as cancelled, the in-flight invocation
    /// (if any) has its token cancelled, and the worker is awaited according
    /// to `grace`. Returns `false` when the grace period expired before the
    /// handler returned.
    pub(crate) async fn retire(
        self,
        grace: GracePolicy,
        stale_handler: StaleHandlerPolicy,
        events: &EventSink,
    ) -> bool {
        let Mailbox {
            name,
            sender,
            slot,
            shared,
            mut worker,
            ..
        } = self;

        shared.closing.store(true, Ordering::SeqCst);
        drop(sender);

        let in_flight = slot.borrow().clone();
        if let SlotState::Busy { call_id, token } = &in_flight {
            tracing::info!(agent = %name, %call_id, "Cancelling in-flight handler");
            token.request_cancellation();
        }

        let finished = match grace {
            GracePolicy::Indefinite => {
                if let Err(e) = (&mut worker).await {
                    tracing::warn!(agent = %name, "Worker ended abnormally: {}", e);
                }
                true
            }
            GracePolicy::GracePeriod(period) => {
                tokio::time::timeout(period, &mut worker).await.is_ok()
            }
        };

        if finished {
            return true;
        }

        let Some(call_id) = slot.borrow().call_id().or_else(|| in_flight.call_id()) else {
            // No handler held the slot; the worker is only draining rejections.
            tracing::debug!(agent = %name, "Worker still draining after grace period");
            return true;
        };

        shared.retired.store(true, Ordering::SeqCst);

        tracing::error!(
            agent = %name,
            %call_id,
            ?grace,
            "Handler ignored cancellation past the grace period; possible leak"
        );
        events.emit(RuntimeEvent::HandlerLeaked {
            agent: name.clone(),
            call_id,
        });

        match stale_handler {
            StaleHandlerPolicy::Abort => {
                worker.abort();
                tracing::warn!(agent = %name, %call_id, "Aborted stale worker");
            }
            StaleHandlerPolicy::Detach => {
                tracing::warn!(agent = %name, %call_id, "Detached stale worker, its result will be discarded");
            }
        }

        false
    }
}

async fn run_worker(
    mut agent: Box<dyn Agent>,
    name: String,
    mut inbox: mpsc::UnboundedReceiver<Envelope>,
    slot: watch::Sender<SlotState>,
    shared: Arc<MailboxShared>,
    mut predecessor: Option<watch::Receiver<SlotState>>,
    events: EventSink,
) {
    while let Some(envelope) = inbox.recv().await {
        shared.queued.fetch_sub(1, Ordering::SeqCst);
        let Envelope {
            call_id,
            message,
            token,
            reply,
        } = envelope;

        let outcome = if shared.closing.load(Ordering::SeqCst) {
            tracing::warn!(agent = %name, %call_id, "Rejecting queued message for deregistered agent");
            Err(RuntimeError::Cancelled {
                agent: name.clone(),
            })
        } else if token.is_cancelled() {
            tracing::debug!(agent = %name, %call_id, "Skipping call cancelled while queued");
            Err(RuntimeError::Cancelled {
                agent: name.clone(),
            })
        } else {
            slot.send_replace(SlotState::Busy {
                call_id,
                token: token.clone(),
            });
            // Deregistration may have read the slot just before it became busy.
            if shared.closing.load(Ordering::SeqCst) {
                token.request_cancellation();
            }

            let cleared = match predecessor.as_mut() {
                Some(previous) => wait_for_predecessor(previous, &token, &name).await,
                None => true,
            };

            let outcome = if cleared {
                predecessor = None;
                invoke(agent.as_mut(), &name, call_id, message, token).await
            } else {
                tracing::debug!(agent = %name, %call_id, "Call cancelled while waiting for previous handler");
                Err(RuntimeError::Cancelled {
                    agent: name.clone(),
                })
            };
            slot.send_replace(SlotState::Idle);

            if shared.retired.load(Ordering::SeqCst) {
                tracing::warn!(agent = %name, %call_id, "Discarding result of stale handler");
                Err(RuntimeError::Cancelled {
                    agent: name.clone(),
                })
            } else {
                outcome
            }
        };

        let status = match &outcome {
            Ok(_) => DeliveryStatus::Completed,
            Err(e) => e.delivery_status().unwrap_or(DeliveryStatus::Failed),
        };
        events.emit(RuntimeEvent::DeliveryFinished {
            agent: name.clone(),
            call_id,
            status,
        });

        if reply.send(outcome).is_err() {
            tracing::debug!(agent = %name, %call_id, "Caller dropped before the response arrived");
        }
    }

    tracing::debug!(agent = %name, "Worker stopped");
}

/// Wait until the previous registration's handler releases the slot.
///
/// Returns `false` if `token` is cancelled first.
async fn wait_for_predecessor(
    previous: &mut watch::Receiver<SlotState>,
    token: &CancellationToken,
    name: &str,
) -> bool {
    if !SlotState::is_held(previous) {
        return true;
    }

    tracing::info!(agent = %name, "Waiting for stale handler of previous registration");
    tokio::select! {
        biased;
        _ = token.cancelled() => false,
        // An error means the previous worker is gone, which also frees the slot.
        _ = previous.wait_for(|state| matches!(state, SlotState::Idle)) => true,
    }
}

async fn invoke(
    agent: &mut dyn Agent,
    name: &str,
    call_id: Uuid,
    message: Message,
    token: CancellationToken,
) -> RuntimeResult<Response> {
    tracing::debug!(agent = %name, %call_id, message_type = %message.message_type(), "Invoking handler");

    match AssertUnwindSafe(agent.on_message(message, token))
        .catch_unwind()
        .await
    {
        Ok(Ok(response)) => Ok(response),
        Ok(Err(AgentError::Cancelled)) => Err(RuntimeError::Cancelled {
            agent: name.to_string(),
        }),
        Ok(Err(AgentError::Failed(reason))) => Err(RuntimeError::Handler {
            agent: name.to_string(),
            reason,
        }),
        Err(_) => {
            tracing::error!(agent = %name, %call_id, "Handler panicked");
            Err(RuntimeError::Handler {
                agent: name.to_string(),
                reason: "handler panicked".to_string(),
            })
        }
    }
}
