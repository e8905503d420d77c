use std::ffi::CString;

use failure::ResultExt;

use crate::errors::{ErrorKind, Result};

/// Null device used in place of missing redirects for background commands.
pub const NULL_DEVICE: &str = "/dev/null";

/// Maximum number of entries in a command's argument vector.
pub const MAX_ARGS: usize = 512;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RedirectInstruction {
    Input,
    Output,
}

impl RedirectInstruction {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "<" => Some(RedirectInstruction::Input),
            ">" => Some(RedirectInstruction::Output),
            _ => None,
        }
    }
}

/// One parsed input line.
///
/// A `Command` lives for a single pass through the read-dispatch loop and
/// is dropped at the end of it, redirects included.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Command {
    /// The line the command was parsed from, after variable expansion.
    pub input: String,
    pub name: String,
    /// `args[0]` is always `name`.
    pub args: Vec<String>,
    pub input_redirect: Option<String>,
    pub output_redirect: Option<String>,
    pub background: bool,
}

impl Command {
    pub fn new<S: AsRef<str>>(name: S) -> Self {
        let name = name.as_ref().to_string();
        Self {
            input: name.clone(),
            args: vec![name.clone()],
            name,
            ..Default::default()
        }
    }

    /// Arguments following the command name.
    pub fn operands(&self) -> &[String] {
        &self.args[1..]
    }

    /// Where stdin should come from, if it must be replaced at all.
    ///
    /// Background commands without an explicit redirect read from the null
    /// device so they never compete with the shell for terminal input.
    pub fn stdin_target(&self) -> Option<&str> {
        self.redirect_target(&self.input_redirect)
    }

    /// Where stdout should go, if it must be replaced at all.
    pub fn stdout_target(&self) -> Option<&str> {
        self.redirect_target(&self.output_redirect)
    }

    /// The argument vector in the form `execvp(3)` expects. The terminating
    /// null pointer is appended by the exec wrapper.
    pub fn argv(&self) -> Result<Vec<CString>> {
        self.args
            .iter()
            .map(|arg| -> Result<CString> {
                Ok(CString::new(arg.as_bytes()).context(ErrorKind::Syntax(arg.clone()))?)
            })
            .collect()
    }

    fn redirect_target<'a>(&'a self, redirect: &'a Option<String>) -> Option<&'a str> {
        match redirect {
            Some(path) => Some(path.as_str()),
            None if self.background => Some(NULL_DEVICE),
            None => None,
        }
    }
}
