use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};

use crate::baseline::{Baseline, BaselineStore};
use crate::builder::BaselineBuilder;
use crate::classifier::ChangeClassifier;
use crate::events::RawEvent;
use crate::hasher::{FileHasher, RetryPolicy};
use crate::sink::ChangeSink;
use crate::watcher::DirectoryWatcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Ready,
    Monitoring,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineSource {
    /// Walk the directory and fingerprint everything from scratch.
    Build,
    /// Reuse the baseline persisted by a previous session.
    Resume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrepareOutcome {
    Built { files: usize },
    Resumed { entries: usize },
    /// Resume was requested but the backing store held nothing; the caller
    /// decides whether to fall back to a fresh build.
    NoBaseline,
}

/// Wires the raw-event source to the classifier, persisting the baseline
/// after each accepted change and forwarding events to a sink.
///
/// Lifecycle: Idle → Ready (via [`Monitor::prepare`]) → Monitoring (via
/// [`Monitor::run`]) → Stopped (via [`MonitorHandle::stop`]).
pub struct Monitor {
    directory: PathBuf,
    store: BaselineStore,
    classifier: ChangeClassifier,
    policy: RetryPolicy,
    poll_timeout: Duration,
    cancel: Arc<AtomicBool>,
    state: MonitorState,
}

#[derive(Debug, Clone)]
pub struct MonitorHandle {
    cancel: Arc<AtomicBool>,
}

impl MonitorHandle {
    /// Request a stop. Idempotent; the monitor finishes the event it is
    /// processing and then shuts down cleanly.
    pub fn stop(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }
}

impl Monitor {
    pub fn new<P: Into<PathBuf>>(directory: P, store: BaselineStore, policy: RetryPolicy) -> Self {
        Self {
            directory: directory.into(),
            store,
            classifier: ChangeClassifier::new(FileHasher::new(policy)),
            policy,
            poll_timeout: Duration::from_millis(100),
            cancel: Arc::new(AtomicBool::new(false)),
            state: MonitorState::Idle,
        }
    }

    /// How long the event loop waits between cancellation checks.
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn baseline(&self) -> &Baseline {
        self.store.baseline()
    }

    pub fn handle(&self) -> MonitorHandle {
        MonitorHandle {
            cancel: self.cancel.clone(),
        }
    }

    /// Obtain the initial baseline, transitioning Idle → Ready.
    ///
    /// Resuming from an empty or missing backing store does not transition;
    /// it returns [`PrepareOutcome::NoBaseline`] so the caller can fall
    /// back to a fresh build.
    pub fn prepare(&mut self, source: BaselineSource) -> Result<PrepareOutcome> {
        if self.state != MonitorState::Idle {
            bail!("monitor already prepared");
        }

        let outcome = match source {
            BaselineSource::Build => {
                let hasher = FileHasher::new(self.policy);
                let files = BaselineBuilder::new(&hasher).build(&self.directory, &mut self.store)?;
                PrepareOutcome::Built { files }
            }
            BaselineSource::Resume => {
                self.store.load()?;
                if self.store.baseline().is_empty() {
                    return Ok(PrepareOutcome::NoBaseline);
                }
                PrepareOutcome::Resumed {
                    entries: self.store.baseline().len(),
                }
            }
        };

        self.state = MonitorState::Ready;
        Ok(outcome)
    }

    /// Consume raw events until stopped.
    ///
    /// Each event is fully classified, persisted, and forwarded before the
    /// next one is taken; cancellation is observed between events, never in
    /// the middle of one.
    pub fn run(&mut self, sink: &mut dyn ChangeSink) -> Result<()> {
        if self.state != MonitorState::Ready {
            bail!("monitor is not ready (no baseline prepared)");
        }

        let watcher = DirectoryWatcher::subscribe(&self.directory, true)?;
        self.state = MonitorState::Monitoring;
        tracing::info!("monitoring started for {}", self.directory.display());

        while !self.cancel.load(Ordering::SeqCst) {
            match watcher.recv_timeout(self.poll_timeout) {
                Ok(raw) => self.process(raw, sink)?,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        self.state = MonitorState::Stopped;
        tracing::info!("monitoring stopped for {}", self.directory.display());
        Ok(())
    }

    fn process(&mut self, raw: RawEvent, sink: &mut dyn ChangeSink) -> Result<()> {
        let Some(event) = self.classifier.classify(&raw, self.store.baseline_mut()) else {
            return Ok(());
        };
        if !event.is_reportable() {
            tracing::debug!("content unchanged: {}", event.path.display());
            return Ok(());
        }

        // Persist before forwarding so durable state never lags observed
        // reality by more than the event in flight.
        self.store.save()?;
        if let Err(err) = sink.notify(&event) {
            tracing::warn!("notification sink failed: {:#}", err);
        }
        Ok(())
    }
}
