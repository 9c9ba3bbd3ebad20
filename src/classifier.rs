use crate::baseline::Baseline;
use crate::events::{ChangeEvent, ChangeKind, RawEvent, RawEventKind};
use crate::hasher::FileHasher;

/// Turns raw filesystem notifications into semantic change events, keeping
/// the baseline in step.
pub struct ChangeClassifier {
    hasher: FileHasher,
}

impl ChangeClassifier {
    pub fn new(hasher: FileHasher) -> Self {
        Self { hasher }
    }

    /// Decide what a raw notification means against the current baseline,
    /// updating the baseline to match.
    ///
    /// Returns `None` for noise: directory events, deletions of unknown
    /// paths, and files that vanished or stayed unreadable before they
    /// could be fingerprinted.
    pub fn classify(&self, event: &RawEvent, baseline: &mut Baseline) -> Option<ChangeEvent> {
        if event.is_dir {
            return None;
        }

        match event.kind {
            RawEventKind::Created => {
                let digest = self.digest(event)?;
                baseline.insert(event.path.clone(), digest);
                Some(ChangeEvent::new(event.path.clone(), ChangeKind::New))
            }
            RawEventKind::Modified => {
                let digest = self.digest(event)?;
                if baseline.get(&event.path) == Some(digest.as_str()) {
                    // duplicate notification, content is what we already
                    // recorded
                    return Some(ChangeEvent::new(event.path.clone(), ChangeKind::Unchanged));
                }
                baseline.insert(event.path.clone(), digest);
                Some(ChangeEvent::new(event.path.clone(), ChangeKind::Modified))
            }
            RawEventKind::Deleted => {
                if baseline.remove(&event.path).is_some() {
                    Some(ChangeEvent::new(event.path.clone(), ChangeKind::Deleted))
                } else {
                    None
                }
            }
        }
    }

    fn digest(&self, event: &RawEvent) -> Option<String> {
        match self.hasher.hash(&event.path) {
            Ok(digest) => Some(digest),
            Err(err) => {
                tracing::debug!("could not fingerprint {}: {}", event.path.display(), err);
                None
            }
        }
    }
}
