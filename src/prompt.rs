use std::path::PathBuf;

/// The two human decisions needed before monitoring can start.
///
/// Implementations may be interactive; the engine only ever sees resolved
/// answers, with `None` meaning the user backed out.
pub trait Prompt {
    /// "Build a new baseline?" — `None` if the choice was cancelled.
    fn confirm_rebuild(&mut self) -> Option<bool>;

    /// Which directory to monitor — `None` if none was selected.
    fn choose_directory(&mut self) -> Option<PathBuf>;
}

/// Non-interactive prompt resolved from command-line flags.
pub struct ArgsPrompt {
    rebuild: bool,
    path: Option<PathBuf>,
}

impl ArgsPrompt {
    pub fn new(rebuild: bool, path: Option<PathBuf>) -> Self {
        Self { rebuild, path }
    }
}

impl Prompt for ArgsPrompt {
    fn confirm_rebuild(&mut self) -> Option<bool> {
        Some(self.rebuild)
    }

    fn choose_directory(&mut self) -> Option<PathBuf> {
        self.path.clone().or_else(|| std::env::current_dir().ok())
    }
}
