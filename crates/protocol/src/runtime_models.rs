//! Runtime state models.
//!
//! This module defines the structures used to report the state of registered
//! agents and the outcome of individual deliveries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// State of an agent's execution slot.
///
/// The only legal transitions are `Idle -> Busy` when a handler invocation
/// starts and `Busy -> Idle` when it returns, fails or is cancelled.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotStatus {
    /// No handler is running for the agent.
    Idle,

    /// A handler invocation holds the slot.
    Busy,
}

/// Terminal outcome of a single delivery to a single agent.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    /// The handler returned a response.
    Completed,

    /// The handler failed with an error.
    Failed,

    /// The invocation was cancelled, either before it started or by the
    /// handler observing its cancellation token.
    Cancelled,
}

/// Point-in-time snapshot of a registered agent.
#[derive(Serialize, Deserialize, Debug, Clone, TS)]
pub struct AgentInfo {
    /// Unique agent name within the runtime.
    pub name: String,

    /// Type names of the messages the agent subscribed to.
    pub subscriptions: Vec<String>,

    /// Current execution slot state.
    pub slot: SlotStatus,

    /// Number of accepted messages waiting for the slot.
    pub queued: usize,

    /// When the agent was registered.
    pub registered_at: DateTime<Utc>,
}
