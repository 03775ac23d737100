//! Instrumented agents for deterministic runtime tests.

use super::fixtures::Job;
use ak_core::{Agent, AgentError, CancellationToken, Message, MessageType, Response};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

/// A step recorded by [`RecordingAgent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Start(u32),
    End(u32),
}

/// Records the start and end of every `Job` it handles and counts any
/// invocation that starts while another one is still running.
///
/// Each job sleeps for a duration that shrinks as the job number grows, so
/// later jobs would overtake earlier ones if the runtime ran them
/// concurrently.
#[allow(dead_code)]
pub struct RecordingAgent {
    pub name: String,
    pub log: Arc<Mutex<Vec<Step>>>,
    pub active: Arc<AtomicBool>,
    pub overlaps: Arc<AtomicUsize>,
}

impl RecordingAgent {
    #[allow(dead_code)]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            log: Arc::new(Mutex::new(Vec::new())),
            active: Arc::new(AtomicBool::new(false)),
            overlaps: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Agent for RecordingAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn subscriptions(&self) -> Vec<MessageType> {
        vec![MessageType::of::<Job>()]
    }

    async fn on_message(
        &mut self,
        message: Message,
        cancellation_token: CancellationToken,
    ) -> Result<Response, AgentError> {
        let Job(n) = *message
            .downcast_ref::<Job>()
            .ok_or_else(|| AgentError::failed("not a job"))?;

        if self.active.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        self.log.lock().unwrap().push(Step::Start(n));

        let delay = Duration::from_millis(u64::from(20u32.saturating_sub(n)));
        let slept = cancellation_token.run_until_cancelled(tokio::time::sleep(delay)).await;

        self.log.lock().unwrap().push(Step::End(n));
        self.active.store(false, Ordering::SeqCst);

        slept?;
        Ok(Response::new(n))
    }
}

/// Blocks each invocation until the test releases a permit, then checks its
/// cancellation token.
#[allow(dead_code)]
pub struct GatedAgent {
    pub name: String,
    pub subscriptions: Vec<MessageType>,
    pub gate: Arc<Semaphore>,
    pub handled: Arc<AtomicUsize>,
}

impl GatedAgent {
    #[allow(dead_code)]
    pub fn new(name: &str, subscriptions: Vec<MessageType>) -> Self {
        Self {
            name: name.to_string(),
            subscriptions,
            gate: Arc::new(Semaphore::new(0)),
            handled: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Agent for GatedAgent {
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
        self.handled.fetch_add(1, Ordering::SeqCst);

        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| AgentError::failed("gate closed"))?;
        permit.forget();

        cancellation_token.check()?;
        Ok(Response::echo(&message))
    }
}

/// Ignores its cancellation token and sleeps for a fixed time.
#[allow(dead_code)]
pub struct StubbornAgent {
    pub name: String,
    pub subscriptions: Vec<MessageType>,
    pub work: Duration,
    pub finished: Arc<AtomicBool>,
}

impl StubbornAgent {
    #[allow(dead_code)]
    pub fn new(name: &str, subscriptions: Vec<MessageType>, work: Duration) -> Self {
        Self {
            name: name.to_string(),
            subscriptions,
            work,
            finished: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait]
impl Agent for StubbornAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn subscriptions(&self) -> Vec<MessageType> {
        self.subscriptions.clone()
    }

    async fn on_message(
        &mut self,
        _message: Message,
        _cancellation_token: CancellationToken,
    ) -> Result<Response, AgentError> {
        tokio::time::sleep(self.work).await;
        self.finished.store(true, Ordering::SeqCst);
        Ok(Response::new("done"))
    }
}

/// Panics on every message.
#[allow(dead_code)]
pub struct PanickingAgent {
    pub name: String,
    pub subscriptions: Vec<MessageType>,
}

#[async_trait]
impl Agent for PanickingAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn subscriptions(&self) -> Vec<MessageType> {
        self.subscriptions.clone()
    }

    async fn on_message(
        &mut self,
        _message: Message,
        _cancellation_token: CancellationToken,
    ) -> Result<Response, AgentError> {
        panic!("handler bug");
    }
}

/// Tracks how many handlers run at once across every agent sharing it.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct ConcurrencyGauge {
    running: AtomicUsize,
    peak: AtomicUsize,
}

#[allow(dead_code)]
impl ConcurrencyGauge {
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        let running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(running, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.running.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Ignores its cancellation token, works for a fixed time and reports to a
/// shared [`ConcurrencyGauge`].
#[allow(dead_code)]
pub struct GaugedAgent {
    pub name: String,
    pub work: Duration,
    pub gauge: Arc<ConcurrencyGauge>,
}

#[async_trait]
impl Agent for GaugedAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn subscriptions(&self) -> Vec<MessageType> {
        vec![MessageType::of::<Job>()]
    }

    async fn on_message(
        &mut self,
        message: Message,
        _cancellation_token: CancellationToken,
    ) -> Result<Response, AgentError> {
        self.gauge.enter();
        tokio::time::sleep(self.work).await;
        self.gauge.exit();
        Ok(Response::echo(&message))
    }
}
