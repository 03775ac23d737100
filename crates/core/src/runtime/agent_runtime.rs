//! The agent runtime.
//!
//! `AgentRuntime` owns the registry of live agents and is the only way to
//! reach an agent's handler once it is registered:
//! - `register` / `deregister` manage the registry
//! - `send` / `dispatch` deliver to one named agent
//! - `publish` / `dispatch_all` fan a message out to every subscriber
//! - `shutdown` deregisters everything

use crate::agents::base::Agent;
use crate::agents::message::{Message, MessageType, Response};
use crate::config::models::GracePolicy;
use crate::runtime::call::{DeliveryResult, PendingCall};
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::events::EventSink;
use crate::runtime::mailbox::{Mailbox, SlotState};
use ak_protocol::config_models::RuntimeConfig;
use ak_protocol::ipc::RuntimeEvent;
use ak_protocol::runtime_models::AgentInfo;
use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, RwLock};

#[derive(Default)]
struct Registry {
    mailboxes: HashMap<String, Mailbox>,
    /// Slots of deregistered agents whose handler may still be running.
    tombstones: HashMap<String, watch::Receiver<SlotState>>,
    next_sequence: u64,
}

impl Registry {
    fn remove(&mut self, name: &str) -> Option<Mailbox> {
        let mailbox = self.mailboxes.remove(name)?;
        self.tombstones.insert(name.to_string(), mailbox.slot());
        Some(mailbox)
    }

    fn prune_tombstones(&mut self) {
        self.tombstones.retain(|_, slot| SlotState::is_held(slot));
    }
}

struct RuntimeInner {
    /// Held only to look up, insert or remove mailboxes; never across a
    /// handler invocation.
    registry: RwLock<Registry>,
    config: RuntimeConfig,
    grace: GracePolicy,
    events: EventSink,
}

/// Builder for [`AgentRuntime`].
#[derive(Debug, Default)]
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    events: Option<mpsc::Sender<RuntimeEvent>>,
}

impl RuntimeBuilder {
    /// Use the given runtime configuration.
    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Report runtime events on `events`.
    pub fn with_events(mut self, events: mpsc::Sender<RuntimeEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn build(self) -> AgentRuntime {
        let grace = GracePolicy::from(&self.config);
        AgentRuntime {
            inner: Arc::new(RuntimeInner {
                registry: RwLock::new(Registry::default()),
                config: self.config,
                grace,
                events: EventSink::new(self.events),
            }),
        }
    }
}

/// Dispatches messages to registered agents.
///
/// Cloning the runtime yields another handle to the same registry, which is
/// how agents reach their peers: by holding a runtime handle and calling
/// [`send`](AgentRuntime::send) rather than touching each other directly.
#[derive(Clone)]
pub struct AgentRuntime {
    inner: Arc<RuntimeInner>,
}

impl Default for AgentRuntime {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl AgentRuntime {
    /// Create a runtime with the given configuration and no event sink.
    pub fn new(config: RuntimeConfig) -> Self {
        Self::builder().with_config(config).build()
    }

    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::default()
    }

    /// The configuration this runtime was built with.
    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    /// The grace policy applied on deregistration.
    pub fn grace_policy(&self) -> GracePolicy {
        self.inner.grace
    }

    /// Register an agent.
    ///
    /// The runtime takes ownership of the agent and reads its name and
    /// subscriptions once.
    ///
    /// # Errors
    ///
    /// - `DuplicateAgent` if an agent with the same name is registered. The
    ///   already registered agent is unaffected.
    /// - `InvalidSubscription` if the agent subscribes to no message type.
    ///
    /// Reusing the name of a deregistered agent whose handler is still
    /// running is allowed. The new agent accepts messages right away but its
    /// first invocation waits until the old handler has returned.
    pub async fn register<A: Agent>(&self, agent: A) -> RuntimeResult<()> {
        self.register_boxed(Box::new(agent)).await
    }

    /// Register an already boxed agent.
    pub async fn register_boxed(&self, agent: Box<dyn Agent>) -> RuntimeResult<()> {
        let name = agent.name().to_string();
        let subscriptions: HashSet<MessageType> = agent.subscriptions().into_iter().collect();

        if subscriptions.is_empty() {
            return Err(RuntimeError::InvalidSubscription(name));
        }

        let mut registry = self.inner.registry.write().await;
        if registry.mailboxes.contains_key(&name) {
            tracing::warn!(agent = %name, "Rejecting duplicate registration");
            return Err(RuntimeError::DuplicateAgent(name));
        }

        let sequence = registry.next_sequence;
        registry.next_sequence += 1;
        let predecessor = registry
            .tombstones
            .remove(&name)
            .filter(SlotState::is_held);

        let mailbox = Mailbox::spawn(
            agent,
            name.clone(),
            subscriptions,
            sequence,
            predecessor,
            self.inner.events.clone(),
        );
        let info = mailbox.info();
        registry.mailboxes.insert(name.clone(), mailbox);
        drop(registry);

        tracing::info!(agent = %name, subscriptions = ?info.subscriptions, "Agent registered");
        self.inner.events.emit(RuntimeEvent::AgentRegistered {
            agent: name,
            subscriptions: info.subscriptions,
        });

        Ok(())
    }

    /// Remove an agent from the registry.
    ///
    /// The agent stops accepting messages immediately. Messages still queued
    /// for it resolve as cancelled, the in-flight invocation (if any) has its
    /// token cancelled, and the call waits for the handler according to the
    /// grace policy. If the grace period expires the agent is removed anyway,
    /// the leak is logged and the stale result is discarded. The name's slot
    /// stays held until the stale handler returns or is aborted.
    ///
    /// # Errors
    ///
    /// `UnknownAgent` if no agent with this name is registered.
    pub async fn deregister(&self, name: &str) -> RuntimeResult<()> {
        let mailbox = self
            .inner
            .registry
            .write()
            .await
            .remove(name)
            .ok_or_else(|| RuntimeError::UnknownAgent(name.to_string()))?;

        self.retire(mailbox).await;
        Ok(())
    }

    /// Deliver `message` to the agent named `target` and wait for the outcome.
    ///
    /// # Errors
    ///
    /// - `UnknownAgent` if `target` is not registered
    /// - `NotSubscribed` if `target` does not accept the message's type
    /// - `Handler` if the handler failed
    /// - `Cancelled` if the invocation was cancelled
    pub async fn send(&self, message: Message, target: &str) -> RuntimeResult<Response> {
        self.dispatch(message, target).await?.response().await
    }

    /// Accept `message` for `target` and return a handle to the pending call
    /// without waiting for it.
    ///
    /// Acceptance order is the processing order: two calls dispatched to the
    /// same agent run in the order their `dispatch` calls returned.
    pub async fn dispatch(&self, message: Message, target: &str) -> RuntimeResult<PendingCall> {
        let registry = self.inner.registry.read().await;
        let mailbox = registry
            .mailboxes
            .get(target)
            .ok_or_else(|| RuntimeError::UnknownAgent(target.to_string()))?;

        let message_type = message.message_type();
        if !mailbox.accepts(&message_type) {
            return Err(RuntimeError::NotSubscribed {
                agent: target.to_string(),
                message_type: message_type.name().to_string(),
            });
        }

        Ok(mailbox.enqueue(message))
    }

    /// Deliver `message` to every agent subscribed to its type and wait for
    /// all outcomes.
    ///
    /// Results are returned in registration order, one per subscribed agent,
    /// whatever order the handlers finish in. A failing or cancelled agent
    /// does not affect delivery to the others.
    pub async fn publish(&self, message: Message) -> Vec<DeliveryResult> {
        let calls = self.dispatch_all(message).await;

        join_all(calls.into_iter().map(|call| async move {
            let agent = call.agent().to_string();
            DeliveryResult {
                agent,
                outcome: call.response().await,
            }
        }))
        .await
    }

    /// Accept `message` for every subscribed agent and return the pending
    /// calls in registration order. Each call names its target through
    /// [`PendingCall::agent`].
    pub async fn dispatch_all(&self, message: Message) -> Vec<PendingCall> {
        let message_type = message.message_type();
        let registry = self.inner.registry.read().await;

        let mut targets: Vec<&Mailbox> = registry
            .mailboxes
            .values()
            .filter(|mailbox| mailbox.accepts(&message_type))
            .collect();
        targets.sort_by_key(|mailbox| mailbox.sequence());

        if targets.is_empty() {
            tracing::debug!(%message_type, "Published message has no subscribers");
        }

        targets
            .into_iter()
            .map(|mailbox| mailbox.enqueue(message.clone()))
            .collect()
    }

    /// Check if an agent with the given name is registered.
    pub async fn has_agent(&self, name: &str) -> bool {
        self.inner.registry.read().await.mailboxes.contains_key(name)
    }

    /// Number of registered agents.
    pub async fn agent_count(&self) -> usize {
        self.inner.registry.read().await.mailboxes.len()
    }

    /// Snapshot of one registered agent.
    pub async fn agent(&self, name: &str) -> Option<AgentInfo> {
        self.inner
            .registry
            .read()
            .await
            .mailboxes
            .get(name)
            .map(Mailbox::info)
    }

    /// Snapshot of all registered agents, in registration order.
    pub async fn agents(&self) -> Vec<AgentInfo> {
        let registry = self.inner.registry.read().await;
        let mut mailboxes: Vec<&Mailbox> = registry.mailboxes.values().collect();
        mailboxes.sort_by_key(|mailbox| mailbox.sequence());
        mailboxes.into_iter().map(Mailbox::info).collect()
    }

    /// Deregister every agent.
    ///
    /// Agents are retired concurrently, each under the grace policy.
    pub async fn shutdown(&self) {
        let mailboxes: Vec<Mailbox> = {
            let mut registry = self.inner.registry.write().await;
            let names: Vec<String> = registry.mailboxes.keys().cloned().collect();
            names.iter().filter_map(|name| registry.remove(name)).collect()
        };

        tracing::info!("Shutting down runtime with {} agents", mailboxes.len());
        join_all(mailboxes.into_iter().map(|mailbox| self.retire(mailbox))).await;
    }

    async fn retire(&self, mailbox: Mailbox) {
        let name = mailbox.name().to_string();
        let clean = mailbox
            .retire(
                self.inner.grace,
                self.inner.config.stale_handler,
                &self.inner.events,
            )
            .await;
        self.inner.registry.write().await.prune_tombstones();

        tracing::info!(agent = %name, clean, "Agent deregistered");
        self.inner
            .events
            .emit(RuntimeEvent::AgentDeregistered { agent: name });
    }
}
