use std::path::PathBuf;
use clap::{Parser, ValueEnum};

#[derive(Parser)]
#[command(name = "fimwatch")]
#[command(version = "0.2.0")]
#[command(about = "A file integrity monitor that fingerprints a directory tree and reports content changes in real time")]
#[command(long_about = "fimwatch keeps a SHA-256 fingerprint for every file under a watched directory and reports, as they happen, files whose content changes, files that appear, and files that disappear. The fingerprint baseline is persisted, so a later session can resume it and catch tampering that happened in between.")]
pub struct Cli {
    /// Directory to monitor
    #[arg(value_name = "PATH", help = "Directory to monitor (defaults to current directory)")]
    pub path: Option<PathBuf>,

    /// Build a fresh baseline instead of resuming the stored one
    #[arg(long, help = "Fingerprint the tree from scratch before monitoring")]
    pub rebuild: bool,

    /// Baseline file location
    #[arg(long, value_name = "FILE", help = "Backing file for the fingerprint baseline")]
    pub baseline: Option<PathBuf>,

    /// Hash attempts before a locked file is skipped
    #[arg(long, help = "Hash attempts for transiently inaccessible files")]
    pub retries: Option<u32>,

    /// Delay between hash retries in milliseconds
    #[arg(long, value_name = "MS", help = "Delay between hash retries in ms")]
    pub retry_delay: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Disable colors in output
    #[arg(long, help = "Disable colored output")]
    pub no_color: bool,

    /// Output format
    #[arg(long, default_value = "text", help = "Output format")]
    pub output: OutputFormat,

    /// Configuration file
    #[arg(long, value_name = "FILE", help = "TOML configuration file")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines (default)
    Text,
    /// One JSON object per event, for scripting
    Json,
    /// Single-letter kind plus path
    Compact,
}

impl Cli {
    pub fn get_watch_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        })
    }

    pub fn setup_logging(&self) {
        let level = if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .init();
    }

    pub fn validate(&self) -> Result<(), String> {
        let path = self.get_watch_path();

        if !path.exists() {
            return Err(format!("Path does not exist: {}", path.display()));
        }

        if !path.is_dir() {
            return Err(format!("Path is not a directory: {}", path.display()));
        }

        if self.retries == Some(0) {
            return Err("Retries must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            path: None,
            rebuild: false,
            baseline: None,
            retries: None,
            retry_delay: None,
            verbose: false,
            no_color: false,
            output: OutputFormat::Text,
            config: None,
        }
    }
}
