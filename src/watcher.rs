use std::path::Path;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::events::{RawEvent, RawEventKind};

/// Cancellable stream of raw filesystem notifications for one directory.
///
/// Adapter over the OS notification mechanism; consumers see only
/// [`RawEvent`]s through the channel API below.
pub struct DirectoryWatcher {
    _watcher: RecommendedWatcher,
    event_rx: Receiver<RawEvent>,
}

impl DirectoryWatcher {
    /// Subscribe to change notifications for `path`.
    ///
    /// Failure here means the monitoring session cannot start at all
    /// (missing or inaccessible directory, watch registration refused).
    pub fn subscribe<P: AsRef<Path>>(path: P, recursive: bool) -> Result<Self> {
        let path = path.as_ref();

        let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
        let (event_tx, event_rx) = mpsc::channel::<RawEvent>();

        let mut watcher =
            notify::recommended_watcher(tx).context("failed to create file system watcher")?;

        let mode = if recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher
            .watch(path, mode)
            .with_context(|| format!("failed to start watching {}", path.display()))?;

        // Background thread translating notify's event model into raw
        // created/modified/deleted notifications, one per affected path.
        thread::spawn(move || {
            while let Ok(result) = rx.recv() {
                match result {
                    Ok(event) => {
                        let kind = match event.kind {
                            EventKind::Create(_) => RawEventKind::Created,
                            EventKind::Modify(_) => RawEventKind::Modified,
                            EventKind::Remove(_) => RawEventKind::Deleted,
                            _ => continue,
                        };

                        for path in event.paths {
                            // A removed path can no longer be probed; it
                            // reports as a non-directory and downstream
                            // drops it unless it was fingerprinted.
                            let is_dir = path.is_dir();
                            let raw = RawEvent::new(path, kind).with_dir(is_dir);
                            if event_tx.send(raw).is_err() {
                                return; // receiver dropped, exit thread
                            }
                        }
                    }
                    Err(err) => {
                        tracing::error!("file watcher error: {}", err);
                    }
                }
            }
        });

        Ok(Self {
            _watcher: watcher,
            event_rx,
        })
    }

    pub fn try_recv(&self) -> Result<RawEvent, TryRecvError> {
        self.event_rx.try_recv()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<RawEvent, RecvTimeoutError> {
        self.event_rx.recv_timeout(timeout)
    }
}
