//! Countdown driver for a live session.
//!
//! A single tokio task owns the [`Session`] and applies intents and clock
//! ticks one at a time. The interval exists only while the session is
//! running: it is created fresh by every successful start and dropped as
//! soon as the session finishes or is reset, so no tick from an earlier
//! attempt can land on a later one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval};

use crate::error::ExamError;
use crate::model::{Answer, AnsweredRecord, Question};
use crate::scoring::Summary;
use crate::session::{FinishReason, Session, SessionSnapshot};

/// Configuration for the exam driver.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Wall-clock time per countdown second.
    pub tick_period: Duration,
    /// Pending intents buffered before senders wait.
    pub channel_capacity: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_secs(1),
            channel_capacity: 16,
        }
    }
}

/// A user intent forwarded by the presentation layer.
#[derive(Debug, Clone)]
pub enum Intent {
    Start {
        questions: Vec<Question>,
        duration_secs: u32,
    },
    SelectAnswer(Answer),
    Advance,
    GoToPrevious,
    Reset,
}

impl Intent {
    fn label(&self) -> &'static str {
        match self {
            Intent::Start { .. } => "start",
            Intent::SelectAnswer(_) => "select_answer",
            Intent::Advance => "advance",
            Intent::GoToPrevious => "go_to_previous",
            Intent::Reset => "reset",
        }
    }
}

/// Session lifecycle callbacks, invoked on the driver task.
pub trait SessionObserver: Send + Sync {
    fn on_started(&self, snapshot: &SessionSnapshot);
    fn on_answer(&self, record: &AnsweredRecord);
    fn on_tick(&self, remaining_secs: u32);
    fn on_finished(&self, summary: &Summary, reason: FinishReason);
}

/// No-op session observer.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_started(&self, _: &SessionSnapshot) {}
    fn on_answer(&self, _: &AnsweredRecord) {}
    fn on_tick(&self, _: u32) {}
    fn on_finished(&self, _: &Summary, _: FinishReason) {}
}

type Reply = oneshot::Sender<Result<SessionSnapshot, ExamError>>;

/// Owns a session and runs its countdown.
pub struct ExamDriver {
    session: Session,
    config: DriverConfig,
    observer: Arc<dyn SessionObserver>,
}

impl ExamDriver {
    pub fn new(config: DriverConfig) -> Self {
        Self {
            session: Session::new(),
            config,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Move the driver onto its own task.
    ///
    /// The task runs until every [`DriverHandle`] clone is dropped and then
    /// yields the final session.
    pub fn spawn(self) -> (DriverHandle, JoinHandle<Session>) {
        let (intent_tx, intent_rx) = mpsc::channel(self.config.channel_capacity.max(1));
        let (snapshot_tx, snapshot_rx) = watch::channel(self.session.snapshot());

        let task = tokio::spawn(self.run(intent_rx, snapshot_tx));
        let handle = DriverHandle {
            intents: intent_tx,
            snapshots: snapshot_rx,
        };
        (handle, task)
    }

    async fn run(
        mut self,
        mut intents: mpsc::Receiver<(Intent, Reply)>,
        snapshots: watch::Sender<SessionSnapshot>,
    ) -> Session {
        let mut ticker: Option<Interval> = None;

        loop {
            tokio::select! {
                // Intents win ties so a reset always beats a pending tick.
                biased;

                message = intents.recv() => {
                    let Some((intent, reply)) = message else {
                        break;
                    };
                    let is_start = matches!(intent, Intent::Start { .. });
                    let result = self.apply(intent);

                    if is_start && result.is_ok() {
                        let period = self.config.tick_period;
                        ticker = Some(tokio::time::interval_at(Instant::now() + period, period));
                    } else if !self.session.is_running() {
                        ticker = None;
                    }

                    if let Ok(snapshot) = &result {
                        snapshots.send_replace(snapshot.clone());
                    }
                    let _ = reply.send(result);
                }

                () = next_tick(&mut ticker) => {
                    match self.session.tick() {
                        Ok(remaining) => self.observer.on_tick(remaining),
                        Err(e) => tracing::debug!("dropped tick: {e}"),
                    }
                    if !self.session.is_running() {
                        ticker = None;
                        self.notify_finished();
                    }
                    snapshots.send_replace(self.session.snapshot());
                }
            }
        }

        tracing::debug!(
            session = self.session.id().map(tracing::field::display),
            "exam driver stopped"
        );
        self.session
    }

    fn apply(&mut self, intent: Intent) -> Result<SessionSnapshot, ExamError> {
        tracing::debug!(intent = intent.label(), status = %self.session.status(), "applying intent");
        match intent {
            Intent::Start {
                questions,
                duration_secs,
            } => {
                self.session.start(questions, duration_secs)?;
                self.observer.on_started(&self.session.snapshot());
            }
            Intent::SelectAnswer(answer) => self.session.select_answer(answer)?,
            Intent::Advance => {
                let record = self.session.advance()?;
                self.observer.on_answer(&record);
                if !self.session.is_running() {
                    self.notify_finished();
                }
            }
            Intent::GoToPrevious => self.session.go_to_previous()?,
            Intent::Reset => self.session.reset(),
        }
        Ok(self.session.snapshot())
    }

    fn notify_finished(&self) {
        if let (Some(summary), Some(reason)) =
            (self.session.summary(), self.session.finish_reason())
        {
            self.observer.on_finished(summary, reason);
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Cloneable handle used by presentation code to drive a session.
#[derive(Clone)]
pub struct DriverHandle {
    intents: mpsc::Sender<(Intent, Reply)>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl DriverHandle {
    /// Send an intent and wait for the resulting snapshot.
    pub async fn send(&self, intent: Intent) -> Result<SessionSnapshot, ExamError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.intents
            .send((intent, reply_tx))
            .await
            .map_err(|_| ExamError::DriverClosed)?;
        reply_rx.await.map_err(|_| ExamError::DriverClosed)?
    }

    pub async fn start(
        &self,
        questions: Vec<Question>,
        duration_secs: u32,
    ) -> Result<SessionSnapshot, ExamError> {
        self.send(Intent::Start {
            questions,
            duration_secs,
        })
        .await
    }

    pub async fn select_answer(&self, answer: Answer) -> Result<SessionSnapshot, ExamError> {
        self.send(Intent::SelectAnswer(answer)).await
    }

    pub async fn advance(&self) -> Result<SessionSnapshot, ExamError> {
        self.send(Intent::Advance).await
    }

    pub async fn go_to_previous(&self) -> Result<SessionSnapshot, ExamError> {
        self.send(Intent::GoToPrevious).await
    }

    pub async fn reset(&self) -> Result<SessionSnapshot, ExamError> {
        self.send(Intent::Reset).await
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver notified on every intent and tick.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }
}
