//! Policies derived from the runtime configuration.

use ak_protocol::config_models::RuntimeConfig;
use std::time::Duration;

/// How long deregistration waits for an in-flight handler after requesting
/// cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GracePolicy {
    /// Wait for the handler however long it takes.
    Indefinite,
    /// Wait up to the given duration, then give up on the handler.
    GracePeriod(Duration),
}

impl From<&RuntimeConfig> for GracePolicy {
    fn from(config: &RuntimeConfig) -> Self {
        match config.grace_period_ms {
            Some(millis) => Self::GracePeriod(Duration::from_millis(millis)),
            None => Self::Indefinite,
        }
    }
}
