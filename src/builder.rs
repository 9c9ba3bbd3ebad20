use std::path::Path;

use anyhow::Result;
use ignore::WalkBuilder;

use crate::baseline::{Baseline, BaselineStore};
use crate::hasher::FileHasher;

/// One-shot walk of a directory tree producing the initial baseline.
pub struct BaselineBuilder<'a> {
    hasher: &'a FileHasher,
}

impl<'a> BaselineBuilder<'a> {
    pub fn new(hasher: &'a FileHasher) -> Self {
        Self { hasher }
    }

    /// Fingerprint every regular file under `root` and persist the result.
    ///
    /// Files that cannot be hashed after retries are skipped with a
    /// diagnostic; they simply have no entry. Returns the number of files
    /// recorded.
    pub fn build(&self, root: &Path, store: &mut BaselineStore) -> Result<usize> {
        let mut baseline = Baseline::new();

        // Standard filters off: an integrity baseline must see hidden files
        // and must not honor .gitignore.
        for result in WalkBuilder::new(root).standard_filters(false).build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!("error walking directory: {}", err);
                    continue;
                }
            };

            // Symlinks and directories are not fingerprinted; the walk
            // still descends into subdirectories.
            if !entry.file_type().map_or(false, |ft| ft.is_file()) {
                continue;
            }

            let path = entry.into_path();
            match self.hasher.hash(&path) {
                Ok(digest) => {
                    baseline.insert(path, digest);
                }
                Err(err) => {
                    tracing::warn!("skipping unhashable file: {}", err);
                }
            }
        }

        let count = baseline.len();
        store.replace(baseline);
        store.save()?;
        tracing::info!("new baseline created for {} ({} files)", root.display(), count);
        Ok(count)
    }
}
