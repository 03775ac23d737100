//! Test fixtures: message types, runtimes and polling helpers.

use ak_core::{AgentRuntime, MessageType};
use ak_protocol::config_models::{RuntimeConfig, StaleHandlerPolicy};
use ak_protocol::ipc::RuntimeEvent;
use ak_protocol::runtime_models::SlotStatus;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ping;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pong;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Broadcast(pub String);

/// A numbered unit of work, used to check ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job(pub u32);

pub fn subscriptions<T: 'static>() -> Vec<MessageType> {
    vec![MessageType::of::<T>()]
}

/// Runtime with a bounded grace period and the given stale handler policy.
#[allow(dead_code)]
pub fn runtime_with_grace(grace_ms: u64, policy: StaleHandlerPolicy) -> AgentRuntime {
    AgentRuntime::new(
        RuntimeConfig::default()
            .with_grace_period_ms(grace_ms)
            .with_stale_handler(policy),
    )
}

/// Runtime that reports events on the returned receiver.
#[allow(dead_code)]
pub fn runtime_with_events(config: RuntimeConfig) -> (AgentRuntime, mpsc::Receiver<RuntimeEvent>) {
    let (tx, rx) = mpsc::channel(256);
    let runtime = AgentRuntime::builder().with_config(config).with_events(tx).build();
    (runtime, rx)
}

/// Poll until the named agent's slot is busy.
///
/// Panics after two seconds.
#[allow(dead_code)]
pub async fn wait_until_busy(runtime: &AgentRuntime, name: &str) {
    wait_for_slot(runtime, name, SlotStatus::Busy).await;
}

/// Poll until the named agent's slot is idle.
#[allow(dead_code)]
pub async fn wait_until_idle(runtime: &AgentRuntime, name: &str) {
    wait_for_slot(runtime, name, SlotStatus::Idle).await;
}

async fn wait_for_slot(runtime: &AgentRuntime, name: &str, status: SlotStatus) {
    let polled = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if let Some(info) = runtime.agent(name).await {
                if info.slot == status {
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await;

    assert!(polled.is_ok(), "Agent '{}' never reached {:?}", name, status);
}

/// Drain every event currently buffered on `rx`.
#[allow(dead_code)]
pub fn drain_events(rx: &mut mpsc::Receiver<RuntimeEvent>) -> Vec<RuntimeEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
