//! Optional event sink used by the runtime and its workers.

use ak_protocol::ipc::RuntimeEvent;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Non-blocking wrapper around an observer channel.
///
/// Agent workers must never wait on a slow observer, so events are offered
/// with `try_send` and dropped when the channel is full or closed.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventSink {
    tx: Option<mpsc::Sender<RuntimeEvent>>,
}

impl EventSink {
    pub(crate) fn new(tx: Option<mpsc::Sender<RuntimeEvent>>) -> Self {
        Self { tx }
    }

    pub(crate) fn emit(&self, event: RuntimeEvent) {
        let Some(tx) = &self.tx else {
            return;
        };

        match tx.try_send(event) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(event)) => {
                tracing::warn!(?event, "Runtime event channel full, dropping event");
            }
        }
    }
}
