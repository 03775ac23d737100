//! # ak-core
//!
//! Agent execution and cancellation core for agent-kit.
//!
//! This crate provides:
//! - The `Agent` trait and type-erased message/response envelopes
//! - One-shot cooperative cancellation tokens
//! - The `AgentRuntime`: subscription routing, one mailbox and worker per
//!   agent, FIFO processing, fan-out with per-agent isolation and bounded
//!   deregistration
//! - Runtime configuration loading from `.agent-kit/`
//!
//! ## Modules
//!
//! - [`agents`]: Agent trait, messages and the mock agent
//! - [`cancellation`]: Cancellation tokens
//! - [`runtime`]: Registry, dispatcher and pending-call handles
//! - [`config`]: Configuration loading and policies

pub mod agents;
pub mod cancellation;
pub mod config;
pub mod runtime;

pub use agents::{Agent, AgentError, Message, MessageType, Response};
pub use cancellation::{Cancelled, CancellationToken};
pub use runtime::{AgentRuntime, DeliveryResult, PendingCall, RuntimeError, RuntimeResult};
