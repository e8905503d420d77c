use std::ffi::CString;
use std::io::{self, Write};
use std::os::unix::io::RawFd;

use failure::ResultExt;
use nix::{
    errno::Errno,
    fcntl::{self, OFlag},
    sys::stat::Mode,
    unistd::{self, ForkResult, Pid},
};

use crate::core::{
    job::{Job, Termination},
    parser::Command,
};
use crate::errors::{ErrorKind, Result};
use crate::shell::{job_control, job_control::JobTable, signals};
use crate::util::unix::{write_stderr, write_stdout};

/// Exit status of a child that could not be set up or could not exec.
pub const CHILD_FAILURE_EXIT_STATUS: i32 = 1;

/// Replaces one of the child's standard streams with a file.
///
/// Everything the child needs is prepared before `fork`, so the child only
/// performs system calls between `fork` and `exec`.
#[derive(Debug)]
struct Redirect {
    path: CString,
    target: RawFd,
    flags: OFlag,
    mode: Mode,
    failure_message: String,
}

impl Redirect {
    fn input(path: &str) -> Result<Self> {
        Ok(Self {
            path: to_cstring(path)?,
            target: libc::STDIN_FILENO,
            flags: OFlag::O_RDONLY,
            mode: Mode::empty(),
            failure_message: format!("cannot open {} for input\n", path),
        })
    }

    fn output(path: &str) -> Result<Self> {
        Ok(Self {
            path: to_cstring(path)?,
            target: libc::STDOUT_FILENO,
            flags: OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
            // rw-r-----
            mode: Mode::S_IRUSR | Mode::S_IWUSR | Mode::S_IRGRP,
            failure_message: format!("cannot open {} for output\n", path),
        })
    }

    /// Opens the file and moves it onto the target stream. Runs in the child.
    fn apply(&self) -> nix::Result<()> {
        let fd = match fcntl::open(self.path.as_c_str(), self.flags, self.mode) {
            Ok(fd) => fd,
            Err(e) => {
                write_stdout(self.failure_message.as_bytes());
                return Err(e);
            }
        };

        unistd::dup2(fd, self.target)?;
        if fd != self.target {
            unistd::close(fd)?;
        }

        Ok(())
    }
}

fn to_cstring(s: &str) -> Result<CString> {
    Ok(CString::new(s).context(ErrorKind::Syntax(s.to_string()))?)
}

/// Runs an external command.
///
/// Foreground commands are waited for and their `Termination` is returned.
/// Background commands are registered in `job_table` and `None` is returned
/// immediately.
pub fn spawn_command(command: &Command, job_table: &mut JobTable) -> Result<Option<Termination>> {
    let argv = command.argv()?;
    let mut redirects = Vec::with_capacity(2);
    if let Some(path) = command.stdin_target() {
        redirects.push(Redirect::input(path)?);
    }
    if let Some(path) = command.stdout_target() {
        redirects.push(Redirect::output(path)?);
    }

    // Anything still buffered would otherwise be written twice, once by each
    // process.
    io::stdout().flush().context(ErrorKind::Io)?;

    let foreground = !command.background;
    match unsafe { unistd::fork() }.context(ErrorKind::Nix)? {
        ForkResult::Child => exec_child(foreground, &argv, &redirects),
        ForkResult::Parent { child } => {
            debug!("forked {} for: {:?}", child, command);
            if foreground {
                wait_for_foreground(child).map(Some)
            } else {
                start_background(child, command, job_table);
                Ok(None)
            }
        }
    }
}

fn exec_child(foreground: bool, argv: &[CString], redirects: &[Redirect]) -> ! {
    // The dispositions are best effort; a child with the shell's handlers
    // can still run its program.
    let _ = signals::reset_for_child(foreground);

    for redirect in redirects {
        if redirect.apply().is_err() {
            exit_child();
        }
    }

    let error = match unistd::execvp(&argv[0], argv) {
        Ok(never) => match never {},
        Err(e) => e,
    };
    report_exec_failure(&argv[0], error);
    exit_child()
}

/// Leaves a forked child without running the parent's exit handlers or
/// flushing its copy of the stdio buffers.
fn exit_child() -> ! {
    unsafe { libc::_exit(CHILD_FAILURE_EXIT_STATUS) }
}

fn report_exec_failure(program: &CString, error: Errno) {
    write_stderr(program.as_bytes());
    write_stderr(b": ");
    write_stderr(error.desc().as_bytes());
    write_stderr(b"\n");
}

fn wait_for_foreground(child: Pid) -> Result<Termination> {
    let termination = job_control::wait_for_pid(child)?;
    debug!("foreground child {} finished: {}", child, termination);
    let status = foreground_status(termination);
    if let Termination::Signaled(_) = status {
        println!("{}", status);
    }

    Ok(status)
}

/// A foreground command killed by any signal is recorded as interrupted.
fn foreground_status(termination: Termination) -> Termination {
    match termination {
        Termination::Signaled(_) => Termination::Signaled(signals::INTERRUPT_SIGNAL as i32),
        exited => exited,
    }
}

fn start_background(child: Pid, command: &Command, job_table: &mut JobTable) {
    println!("background pid is {}", child);
    if let Err(e) = job_table.insert(Job::new(child, &command.input)) {
        warn!("not tracking background pid {}: {}", child, e);
        println!("msh: {}, background pid {} is not tracked", e, child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_redirect() {
        let redirect = Redirect::input("in.txt").expect("path should be valid");
        assert_eq!(redirect.path, CString::new("in.txt").unwrap());
        assert_eq!(redirect.target, libc::STDIN_FILENO);
        assert_eq!(redirect.flags, OFlag::O_RDONLY);
        assert_eq!(redirect.failure_message, "cannot open in.txt for input\n");
    }

    #[test]
    fn test_output_redirect() {
        let redirect = Redirect::output("out.txt").expect("path should be valid");
        assert_eq!(redirect.target, libc::STDOUT_FILENO);
        assert!(redirect.flags.contains(OFlag::O_CREAT | OFlag::O_TRUNC));
        assert_eq!(redirect.mode.bits(), 0o640);
        assert_eq!(redirect.failure_message, "cannot open out.txt for output\n");
    }

    #[test]
    fn test_foreground_status() {
        assert_eq!(foreground_status(Termination::Exited(0)), Termination::Exited(0));
        assert_eq!(foreground_status(Termination::Exited(3)), Termination::Exited(3));
        assert_eq!(foreground_status(Termination::Signaled(2)), Termination::Signaled(2));
        assert_eq!(foreground_status(Termination::Signaled(15)), Termination::Signaled(2));
        assert_eq!(foreground_status(Termination::Signaled(9)), Termination::Signaled(2));
    }

    #[test]
    fn test_redirect_rejects_interior_nul() {
        assert!(Redirect::output("bad\0path").is_err());
    }
}
