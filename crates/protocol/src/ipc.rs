//! Runtime event protocol.
//!
//! The runtime optionally reports what it does through a channel of
//! [`RuntimeEvent`]s so that a UI, a log shipper or a test can observe agent
//! lifecycles and delivery outcomes without touching the registry.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::runtime_models::DeliveryStatus;

/// Events sent from the runtime to observers.
///
/// Uses tagged enum serialization for TypeScript compatibility:
/// ```json
/// {
///   "type": "deliveryFinished",
///   "payload": {
///     "agent": "echo",
///     "call_id": "uuid-here",
///     "status": "COMPLETED"
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum RuntimeEvent {
    /// An agent was added to the registry.
    AgentRegistered {
        agent: String,
        subscriptions: Vec<String>,
    },

    /// An agent was removed from the registry.
    AgentDeregistered { agent: String },

    /// A handler invocation (or a rejected queued call) reached a terminal
    /// outcome.
    DeliveryFinished {
        agent: String,
        #[ts(type = "string")]
        call_id: Uuid,
        status: DeliveryStatus,
    },

    /// A handler ignored cancellation past the grace period.
    ///
    /// Its eventual result will be discarded.
    HandlerLeaked {
        agent: String,
        #[ts(type = "string")]
        call_id: Uuid,
    },
}
