//! Runtime configuration models for `.agent-kit/config.toml`.
//!
//! This module defines the structure of the configuration file that controls
//! how the agent runtime reclaims execution slots from handlers that do not
//! finish after their invocation was cancelled.

use serde::Deserialize;
use serde::Serialize;
use ts_rs::TS;

/// What the runtime does with a handler that is still running after its
/// grace period expired.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "kebab-case")]
pub enum StaleHandlerPolicy {
    /// Let the handler run to completion; its result is discarded and the
    /// slot returns to idle when it finally returns.
    #[default]
    Detach,

    /// Abort the agent's worker task, dropping the handler at its next
    /// suspension point.
    Abort,
}

/// Represents runtime settings from `.agent-kit/config.toml`.
///
/// # Example
///
/// ```toml
/// # .agent-kit/config.toml
/// grace-period-ms = 5000
/// stale-handler = "abort"
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "kebab-case")]
pub struct RuntimeConfig {
    /// How long deregistration waits for an in-flight handler after
    /// requesting cancellation.
    ///
    /// When absent the runtime waits indefinitely.
    #[serde(default)]
    #[ts(type = "number | null")]
    pub grace_period_ms: Option<u64>,

    /// Policy applied to handlers that outlive the grace period.
    #[serde(default)]
    pub stale_handler: StaleHandlerPolicy,
}

impl RuntimeConfig {
    /// Set the grace period in milliseconds.
    pub fn with_grace_period_ms(mut self, millis: u64) -> Self {
        self.grace_period_ms = Some(millis);
        self
    }

    /// Wait indefinitely for in-flight handlers on deregistration.
    pub fn without_grace_period(mut self) -> Self {
        self.grace_period_ms = None;
        self
    }

    /// Set the stale handler policy.
    pub fn with_stale_handler(mut self, policy: StaleHandlerPolicy) -> Self {
        self.stale_handler = policy;
        self
    }
}
