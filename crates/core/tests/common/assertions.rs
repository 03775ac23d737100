//! Custom assertion helpers for runtime tests.

use ak_core::{Response, RuntimeError, RuntimeResult};
use ak_protocol::ipc::RuntimeEvent;

/// Assert that an outcome is the `Cancelled` outcome for `agent`.
#[allow(dead_code)]
pub fn assert_cancelled(outcome: &RuntimeResult<Response>, agent: &str) {
    match outcome {
        Err(RuntimeError::Cancelled { agent: a }) => assert_eq!(a, agent),
        other => panic!("Expected Cancelled for '{}', got: {:?}", agent, other),
    }
}

/// Assert that an outcome is a handler failure for `agent` with `reason`.
#[allow(dead_code)]
pub fn assert_handler_failed(outcome: &RuntimeResult<Response>, agent: &str, reason: &str) {
    match outcome {
        Err(RuntimeError::Handler { agent: a, reason: r }) => {
            assert_eq!(a, agent);
            assert_eq!(r, reason);
        }
        other => panic!("Expected Handler error for '{}', got: {:?}", agent, other),
    }
}

/// Whether the events contain a `HandlerLeaked` event for `agent`.
#[allow(dead_code)]
pub fn has_leak_event(events: &[RuntimeEvent], agent: &str) -> bool {
    events
        .iter()
        .any(|e| matches!(e, RuntimeEvent::HandlerLeaked { agent: a, .. } if a == agent))
}

/// Assert that every `Start(n)` is immediately followed by `End(n)` and that
/// jobs appear in ascending order.
#[allow(dead_code)]
pub fn assert_serialized_in_order(log: &[crate::common::mock_agents::Step], expected_jobs: u32) {
    use crate::common::mock_agents::Step;

    assert_eq!(
        log.len(),
        expected_jobs as usize * 2,
        "Unexpected log length: {:?}",
        log
    );

    for (i, pair) in log.chunks(2).enumerate() {
        let job = i as u32 + 1;
        assert_eq!(pair, [Step::Start(job), Step::End(job)], "Interleaving at job {}: {:?}", job, log);
    }
}
