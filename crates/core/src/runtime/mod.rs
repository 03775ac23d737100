//! Agent runtime: registration, routing, per-agent serialization and
//! cancellation wiring.
//!
//! Each registered agent is moved into its own worker task fed by a FIFO
//! mailbox, so at most one handler invocation runs per agent while unrelated
//! agents proceed independently.

pub mod agent_runtime;
pub mod call;
pub mod error;
mod events;
mod mailbox;

pub use agent_runtime::{AgentRuntime, RuntimeBuilder};
pub use call::{DeliveryResult, PendingCall};
pub use error::{RuntimeError, RuntimeResult};
