pub mod baseline;
pub mod builder;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod events;
pub mod hasher;
pub mod monitor;
pub mod prompt;
pub mod sink;
pub mod watcher;

pub use baseline::*;
pub use builder::*;
pub use classifier::*;
pub use events::*;
pub use hasher::*;
pub use monitor::*;
pub use prompt::*;
pub use sink::*;
pub use watcher::*;
