use std::path::PathBuf;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawEventKind {
    Created,
    Modified,
    Deleted,
}

/// Unclassified notification from the filesystem watcher, one per path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub path: PathBuf,
    pub kind: RawEventKind,
    pub is_dir: bool,
}

impl RawEvent {
    pub fn new(path: PathBuf, kind: RawEventKind) -> Self {
        Self {
            path,
            kind,
            is_dir: false,
        }
    }

    pub fn with_dir(mut self, is_dir: bool) -> Self {
        self.is_dir = is_dir;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    New,
    Modified,
    Deleted,
    Unchanged,
}

/// Semantic result of weighing a raw event against the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(path: PathBuf, kind: ChangeKind) -> Self {
        Self {
            path,
            kind,
            timestamp: Utc::now(),
        }
    }

    // Unchanged absorbs duplicate modify notifications from the OS; it is
    // classified but never forwarded to a sink.
    pub fn is_reportable(&self) -> bool {
        !matches!(self.kind, ChangeKind::Unchanged)
    }

    pub fn label(&self) -> &'static str {
        match self.kind {
            ChangeKind::New => "NEW",
            ChangeKind::Modified => "MODIFIED",
            ChangeKind::Deleted => "DELETED",
            ChangeKind::Unchanged => "UNCHANGED",
        }
    }
}
