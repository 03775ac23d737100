//! Agent abstraction.
//!
//! This module provides the `Agent` trait, the type-erased message and
//! response envelopes it exchanges with the runtime, and a configurable
//! `MockAgent` used by tests and the CLI demo.

pub mod adapters;
pub mod base;
pub mod message;

pub use adapters::MockAgent;
pub use base::{Agent, AgentError};
pub use message::{Message, MessageType, Response};
