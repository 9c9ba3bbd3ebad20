use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Mapping from file path to the hex digest recorded the last time that
/// path's content was observed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Baseline {
    entries: HashMap<PathBuf, String>,
}

impl Baseline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    pub fn insert(&mut self, path: PathBuf, digest: String) -> Option<String> {
        self.entries.insert(path, digest)
    }

    pub fn remove(&mut self, path: &Path) -> Option<String> {
        self.entries.remove(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &String)> {
        self.entries.iter()
    }
}

/// Owns the durable copy of the baseline and the in-memory working copy.
///
/// Durability contract: a mutation counts only once `save` has returned;
/// the monitor saves after every accepted classified event.
pub struct BaselineStore {
    path: PathBuf,
    current: Baseline,
}

impl BaselineStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            current: Baseline::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn baseline(&self) -> &Baseline {
        &self.current
    }

    pub fn baseline_mut(&mut self) -> &mut Baseline {
        &mut self.current
    }

    pub fn replace(&mut self, baseline: Baseline) {
        self.current = baseline;
    }

    /// Read the backing file. A missing file yields an empty baseline, and
    /// corrupt content is discarded with a warning rather than propagated;
    /// any other I/O failure is an error.
    pub fn load(&mut self) -> Result<&Baseline> {
        self.current = match fs::read_to_string(&self.path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(baseline) => baseline,
                Err(err) => {
                    tracing::warn!(
                        "baseline file {} is corrupted ({}), starting fresh",
                        self.path.display(),
                        err
                    );
                    Baseline::new()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => Baseline::new(),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to read baseline file {}", self.path.display())
                })
            }
        };
        Ok(&self.current)
    }

    /// Write the full baseline to disk.
    ///
    /// The write goes to a sibling temp file which is renamed over the real
    /// one, so a crash mid-write never leaves a half-written file readable
    /// as the current state.
    pub fn save(&self) -> Result<()> {
        let serialized =
            serde_json::to_string_pretty(&self.current).context("failed to serialize baseline")?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, serialized)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }

    pub fn set(&mut self, path: PathBuf, digest: String) {
        self.current.insert(path, digest);
    }

    pub fn remove(&mut self, path: &Path) -> bool {
        self.current.remove(path).is_some()
    }
}
