//! Mock agent implementation for testing.

use crate::agents::base::{Agent, AgentError};
use crate::agents::message::{Message, MessageType, Response};
use crate::cancellation::CancellationToken;
use async_trait::async_trait;
use std::time::Duration;

/// What a [`MockAgent`] does with each message it receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockBehavior {
    /// Hand the message back as the response.
    Echo,
    /// Return an empty response.
    Silent,
    /// Fail with the given reason.
    Fail(String),
    /// Sleep for the given duration, honouring cancellation, then echo.
    Delay(Duration),
}

#[derive(Debug, Clone)]
pub struct MockAgent {
    name: String,
    subscriptions: Vec<MessageType>,
    behavior: MockBehavior,
}

impl MockAgent {
    pub fn new(
        name: impl Into<String>,
        subscriptions: Vec<MessageType>,
        behavior: MockBehavior,
    ) -> Self {
        Self {
            name: name.into(),
            subscriptions,
            behavior,
        }
    }

    pub fn echo(name: impl Into<String>, subscriptions: Vec<MessageType>) -> Self {
        Self::new(name, subscriptions, MockBehavior::Echo)
    }

    pub fn silent(name: impl Into<String>, subscriptions: Vec<MessageType>) -> Self {
        Self::new(name, subscriptions, MockBehavior::Silent)
    }

    pub fn failing(
        name: impl Into<String>,
        subscriptions: Vec<MessageType>,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(name, subscriptions, MockBehavior::Fail(reason.into()))
    }

    pub fn delayed(
        name: impl Into<String>,
        subscriptions: Vec<MessageType>,
        delay: Duration,
    ) -> Self {
        Self::new(name, subscriptions, MockBehavior::Delay(delay))
    }

    pub fn behavior(&self) -> &MockBehavior {
        &self.behavior
    }
}

#[async_trait]
impl Agent for MockAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn subscriptions(&self) -> Vec<MessageType> {
        self.subscriptions.clone()
    }

    async fn on_message(
        &mut self,
        message: Message,
        cancellation_token: CancellationToken,
    ) -> Result<Response, AgentError> {
        cancellation_token.check()?;

        match &self.behavior {
            MockBehavior::Echo => Ok(Response::echo(&message)),
            MockBehavior::Silent => Ok(Response::empty()),
            MockBehavior::Fail(reason) => Err(AgentError::Failed(reason.clone())),
            MockBehavior::Delay(delay) => {
                cancellation_token
                    .run_until_cancelled(tokio::time::sleep(*delay))
                    .await?;
                Ok(Response::echo(&message))
            }
        }
    }
}
