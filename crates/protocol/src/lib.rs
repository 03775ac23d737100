//! # ak-protocol
//!
//! Shared data models for agent-kit.
//!
//! This crate defines the serializable structures used by the runtime core
//! and by anything observing it:
//! - Runtime configuration loaded from `.agent-kit/config.toml`
//! - Execution slot and delivery status models
//! - Runtime events emitted while agents are registered and invoked
//!
//! ## Modules
//!
//! - [`config_models`]: Runtime configuration from config.toml
//! - [`runtime_models`]: Slot status, delivery status and agent snapshots
//! - [`ipc`]: Events emitted by the runtime to observers
//!
//! ## Design Principles
//!
//! - Minimal dependencies: Only serde, ts-rs, chrono and uuid
//! - TypeScript generation: All types derive `TS` for client compatibility
//! - Independent compilation: No dependencies on other agent-kit crates

pub mod config_models;
pub mod ipc;
pub mod runtime_models;

// Re-export all public types for convenience
pub use config_models::*;
pub use ipc::*;
pub use runtime_models::*;
