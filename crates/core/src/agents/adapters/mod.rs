//! Agent adapter implementations.

pub mod mock_agent;

pub use mock_agent::{MockAgent, MockBehavior};
