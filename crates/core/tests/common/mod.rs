//! Common test utilities for the runtime integration tests.
//!
//! This module provides shared functionality across all integration tests:
//! - Test fixtures (message types, runtime builders, polling helpers)
//! - Custom assertions
//! - Instrumented mock agents

pub mod assertions;
pub mod fixtures;
pub mod mock_agents;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use mock_agents::*;
