//! Msh - Shell Module
//!
//! The Shell runs the read-dispatch loop: each line is expanded, parsed and
//! either handled by a builtin or launched as a child process, and finished
//! background jobs are reported before the next line is read.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process;

use failure::ResultExt;
use nix::unistd::{self, Pid};

use crate::core::{
    job::Termination,
    parser::{self, Command},
    variable_expansion,
};
use crate::editor::Editor;
use crate::errors::{Error, ErrorKind, Result};
use crate::shell::{builtins, execute_command, signals, JobTable, ShellConfig};

const PROMPT: &str = ": ";

/// Msh Shell
pub struct Shell {
    /// Responsible for reading lines and keeping history.
    editor: Editor,
    job_table: JobTable,
    /// Outcome of the last foreground command.
    last_status: Termination,
    config: ShellConfig,
    /// Substituted for `$$`.
    pid: Pid,
    /// Is `false` if stdin is not a terminal.
    is_interactive: bool,
}

impl Shell {
    /// Constructs a new Shell to manage background jobs and command history.
    pub fn new(config: ShellConfig) -> Result<Shell> {
        let history_capacity = if config.enable_command_history {
            config.command_history_capacity
        } else {
            0
        };

        let shell = Shell {
            editor: Editor::with_capacity(history_capacity)?,
            job_table: JobTable::with_capacity(config.job_capacity),
            last_status: Termination::default(),
            config,
            pid: Pid::this(),
            is_interactive: isatty(),
        };

        if config.enable_job_control {
            let temp_result = signals::install_shell_handlers();
            log_if_err!(temp_result, "failed to install signal handlers");
        }

        info!("msh started up");
        Ok(shell)
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Outcome of the last foreground command, as reported by `status`.
    pub fn last_status(&self) -> Termination {
        self.last_status
    }

    pub(crate) fn set_last_status(&mut self, status: Termination) {
        self.last_status = status;
    }

    /// Prompt shown before each line. Empty unless a person is typing.
    /// Returns `None` when end of file is reached.
    fn prompt(&mut self) -> Result<Option<String>> {
        let prompt = if self.config.display_messages && self.is_interactive {
            PROMPT
        } else {
            ""
        };

        self.editor.readline(prompt)
    }

    /// Runs one line of input.
    ///
    /// Syntax errors and failures to launch a command are reported to the
    /// user and do not produce an `Err`.
    pub fn execute_command_string(&mut self, input: &str) -> Result<()> {
        let expanded = variable_expansion::expand_variables(input, self.pid);
        if parser::is_comment_or_blank(&expanded) {
            return Ok(());
        }

        if self.config.enable_command_history {
            self.editor.add_history_entry(input.trim());
        }

        let command = match Command::parse(&expanded, signals::is_foreground_only()) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(()),
            Err(e) => {
                if let ErrorKind::Syntax(ref token) = *e.kind() {
                    eprintln!("msh: syntax error near: {}", token);
                    return Ok(());
                }

                return Err(e);
            }
        };

        self.execute_command(&command)
    }

    /// Runs every line of a file in order, as if typed at the prompt.
    pub fn execute_commands_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let buffer = fs::read_to_string(path).context(ErrorKind::Io)?;
        for line in buffer.lines() {
            self.execute_command_string(line)?;
            self.check_jobs();
        }

        Ok(())
    }

    /// Runs lines from stdin until EOF is received.
    pub fn execute_from_stdin(&mut self) {
        loop {
            let input = match self.prompt() {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    error!("failed to read input: {}", e);
                    eprintln!("msh: {}", e);
                    break;
                }
            };

            let temp_result = self.execute_command_string(&input);
            log_if_err!(temp_result, "execute_command_string");
            if let Err(e) = temp_result {
                eprintln!("msh: {}", e);
            }

            // Report background jobs that finished, removing them.
            self.check_jobs();
        }

        if self.config.display_messages && self.is_interactive {
            println!("exit");
        }
    }

    /// Reports and forgets finished background jobs, without blocking.
    pub fn check_jobs(&mut self) {
        self.job_table.do_job_notification();
    }

    /// Dispatches a parsed command to a builtin or a child process.
    fn execute_command(&mut self, command: &Command) -> Result<()> {
        if builtins::is_builtin(&command.name) {
            let stdout = io::stdout();
            let mut stdout = stdout.lock();
            if let Err(e) = builtins::run(self, &command.name, command.operands(), &mut stdout) {
                warn!("builtin {} failed: {}", command.name, e);
                eprintln!("msh: {}", e);
            }

            return Ok(());
        }

        match execute_command::spawn_command(command, &mut self.job_table) {
            Ok(Some(termination)) => self.last_status = termination,
            Ok(None) => {}
            Err(e) => self.report_launch_failure(&e),
        }

        Ok(())
    }

    fn report_launch_failure(&self, e: &Error) {
        error!("failed to run command: {}", e);
        if let ErrorKind::Syntax(ref token) = *e.kind() {
            eprintln!("msh: syntax error near: {}", token);
        } else {
            eprintln!("msh: {}", e);
        }
    }

    /// Exit the shell with a status of 0, killing background jobs first.
    pub fn exit(&mut self) -> ! {
        self.exit_with_status(0)
    }

    /// Exit the shell with status `code`, killing background jobs first.
    pub fn exit_with_status(&mut self, code: i32) -> ! {
        self.job_table.kill_all();

        let temp_result = io::stdout().flush();
        log_if_err!(temp_result, "failed to flush stdout during shutdown");

        info!("msh has shut down ({})", code);
        process::exit(code);
    }
}

fn isatty() -> bool {
    let temp_result = unistd::isatty(libc::STDIN_FILENO);
    log_if_err!(temp_result, "unistd::isatty");
    temp_result.unwrap_or(false)
}

impl fmt::Debug for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pid: {}\tlast status: {}\n{:?}\n{:?}",
            self.pid, self.last_status, self.job_table, self.editor
        )
    }
}
