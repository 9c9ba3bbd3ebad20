use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use sha2::{Digest, Sha256};
use thiserror::Error;

const CHUNK_SIZE: usize = 4096;

/// How often and how patiently a transiently inaccessible file is retried.
///
/// Passed into [`FileHasher`] rather than hard-coded so tests can run with
/// zero delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Same attempt budget, no waiting between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            delay: Duration::ZERO,
        }
    }
}

#[derive(Debug, Error)]
pub enum HashError {
    /// Transient access failures on every attempt; the file is unobservable
    /// this cycle, not deleted.
    #[error("{path}: still inaccessible after {attempts} attempts")]
    Exhausted { path: PathBuf, attempts: u32 },

    /// Permanent failure (file vanished mid-read, not readable at all).
    #[error("{path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Streams file content through SHA-256 in fixed-size chunks.
#[derive(Debug, Clone, Default)]
pub struct FileHasher {
    policy: RetryPolicy,
}

impl FileHasher {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Fingerprint of the file's content as lowercase hex.
    ///
    /// A locked or momentarily inaccessible file is retried per the policy;
    /// any other failure aborts immediately.
    pub fn hash(&self, path: &Path) -> Result<String, HashError> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match digest_file(path) {
                Ok(digest) => return Ok(digest),
                Err(err) if is_transient(&err) => {
                    tracing::warn!(
                        "access denied: {} (attempt {}/{})",
                        path.display(),
                        attempts,
                        self.policy.max_attempts
                    );
                    if attempts >= self.policy.max_attempts {
                        return Err(HashError::Exhausted {
                            path: path.to_path_buf(),
                            attempts,
                        });
                    }
                    thread::sleep(self.policy.delay);
                }
                Err(source) => {
                    return Err(HashError::Unreadable {
                        path: path.to_path_buf(),
                        source,
                    })
                }
            }
        }
    }
}

fn digest_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; CHUNK_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::PermissionDenied | io::ErrorKind::WouldBlock
    )
}
