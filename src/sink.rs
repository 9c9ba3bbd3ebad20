use anyhow::Result;

use crate::cli::OutputFormat;
use crate::events::{ChangeEvent, ChangeKind};

/// Downstream consumer of classified events.
///
/// Delivery is fire-and-forget from the engine's point of view: a failing
/// sink is logged by the monitor and never aborts the session.
pub trait ChangeSink {
    fn notify(&mut self, event: &ChangeEvent) -> Result<()>;
}

/// Renders classified events to stdout.
pub struct ConsoleSink {
    format: OutputFormat,
    no_color: bool,
}

impl ConsoleSink {
    pub fn new(format: OutputFormat, no_color: bool) -> Self {
        Self { format, no_color }
    }

    fn print_text(&self, event: &ChangeEvent) {
        let time_str = event.timestamp.format("%H:%M:%S");

        if self.no_color {
            println!("[{}] {} {}", time_str, event.label(), event.path.display());
        } else {
            let color = match event.kind {
                ChangeKind::New => "\x1b[32m",       // Green
                ChangeKind::Modified => "\x1b[33m",  // Yellow
                ChangeKind::Deleted => "\x1b[31m",   // Red
                ChangeKind::Unchanged => "\x1b[2m",  // Dim
            };
            println!(
                "[{}] {}{}\x1b[0m {}",
                time_str,
                color,
                event.label(),
                event.path.display()
            );
        }
    }

    fn print_compact(&self, event: &ChangeEvent) {
        let tag = match event.kind {
            ChangeKind::New => "N",
            ChangeKind::Modified => "M",
            ChangeKind::Deleted => "D",
            ChangeKind::Unchanged => "U",
        };
        println!("{} {}", tag, event.path.display());
    }
}

impl ChangeSink for ConsoleSink {
    fn notify(&mut self, event: &ChangeEvent) -> Result<()> {
        match self.format {
            OutputFormat::Text => self.print_text(event),
            OutputFormat::Json => println!("{}", serde_json::to_string(event)?),
            OutputFormat::Compact => self.print_compact(event),
        }
        Ok(())
    }
}
