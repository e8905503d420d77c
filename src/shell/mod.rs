pub use self::job_control::{JobTable, DEFAULT_JOB_CAPACITY};
pub use self::shell::Shell;

pub mod builtins;
pub mod execute_command;
pub mod job_control;
#[allow(clippy::module_inception)]
pub mod shell;
pub mod signals;

/// Policy object to control a Shell's behavior
#[derive(Debug, Copy, Clone)]
pub struct ShellConfig {
    /// Determines if new command entries will be added to the shell's command history.
    ///
    /// Note: This is checked before the other command history config fields.
    enable_command_history: bool,

    /// Number of entries to store in the shell's command history
    command_history_capacity: usize,

    /// Determines if the shell takes over SIGINT and SIGTSTP (foreground-only mode).
    enable_job_control: bool,

    /// Determines if the prompt and some messages (e.g. "exit") should be displayed.
    display_messages: bool,

    /// Maximum number of background jobs tracked at once.
    job_capacity: usize,
}

impl ShellConfig {
    /// Creates an interactive shell, e.g. command history, signal handling
    ///
    /// # Complete List
    /// - Command History is enabled
    /// - SIGINT is ignored and SIGTSTP toggles foreground-only mode
    /// - The prompt and some additional messages are displayed
    pub fn interactive(command_history_capacity: usize) -> Self {
        Self {
            enable_command_history: true,
            command_history_capacity,
            enable_job_control: true,
            display_messages: true,
            job_capacity: DEFAULT_JOB_CAPACITY,
        }
    }

    /// Creates a noninteractive shell, e.g. no command history, default
    /// signal handling
    ///
    /// # Complete List
    /// - Command History is disabled.
    /// - Signals keep their default dispositions; foreground-only mode
    ///   cannot be entered.
    /// - Fewer messages are displayed
    pub fn noninteractive() -> Self {
        Default::default()
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            enable_command_history: false,
            command_history_capacity: 0,
            enable_job_control: false,
            display_messages: false,
            job_capacity: DEFAULT_JOB_CAPACITY,
        }
    }
}
