//! Configuration loading and management.
//!
//! This module loads the runtime configuration from the `.agent-kit/`
//! directory and turns it into the policies the runtime applies.

pub mod error;
pub mod loader;
pub mod models;
