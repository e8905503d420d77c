//! Msh Parser
//!
//! Grammar of a line:
//!
//! ```text
//! command [arg ...] [< input_file] [> output_file] [&]
//! ```
//!
//! Tokens are separated by runs of spaces and newlines. Anything that does
//! not fit the grammar is rejected with a syntax error naming the offending
//! token.

pub use self::ast::{Command, RedirectInstruction, MAX_ARGS, NULL_DEVICE};
use crate::errors::{Error, Result};

pub mod ast;

const BACKGROUND_TOKEN: &str = "&";
const COMMENT_PREFIX: char = '#';
const END_OF_LINE: &str = "newline";

/// Returns `true` for lines the shell skips entirely: lines with no tokens
/// and lines whose first token starts with `#`.
pub fn is_comment_or_blank(input: &str) -> bool {
    match tokenize(input).next() {
        Some(token) => token.starts_with(COMMENT_PREFIX),
        None => true,
    }
}

fn tokenize(input: &str) -> impl Iterator<Item = &str> {
    input
        .split(|c| c == ' ' || c == '\n')
        .filter(|token| !token.is_empty())
}

fn is_operator(token: &str) -> bool {
    token == BACKGROUND_TOKEN || RedirectInstruction::from_token(token).is_some()
}

impl Command {
    /// Parses an already-expanded line.
    ///
    /// Returns `Ok(None)` for a line without tokens. When `foreground_only`
    /// is set a trailing `&` is accepted but ignored.
    pub fn parse(input: &str, foreground_only: bool) -> Result<Option<Command>> {
        let mut tokens = tokenize(input).peekable();
        let name = match tokens.next() {
            Some(name) if is_operator(name) => return Err(Error::syntax(name)),
            Some(name) => name,
            None => return Ok(None),
        };

        let mut command = Command::new(name);
        command.input = input.trim_end_matches('\n').to_string();

        while let Some(token) = tokens.peek() {
            if is_operator(token) {
                break;
            }
            if command.args.len() == MAX_ARGS {
                return Err(Error::syntax(token));
            }
            command.args.push(token.to_string());
            tokens.next();
        }

        while let Some(token) = tokens.next() {
            if token == BACKGROUND_TOKEN {
                if let Some(next) = tokens.next() {
                    return Err(Error::syntax(next));
                }
                if foreground_only {
                    debug!("foreground-only mode, ignoring '&'");
                } else {
                    command.background = true;
                }
                break;
            }

            let instruction =
                RedirectInstruction::from_token(token).ok_or_else(|| Error::syntax(token))?;
            let target = match tokens.next() {
                Some(target) if !is_operator(target) => target.to_string(),
                Some(target) => return Err(Error::syntax(target)),
                None => return Err(Error::syntax(END_OF_LINE)),
            };
            let slot = match instruction {
                RedirectInstruction::Input => &mut command.input_redirect,
                RedirectInstruction::Output => &mut command.output_redirect,
            };
            if slot.is_some() {
                return Err(Error::syntax(token));
            }
            *slot = Some(target);
        }

        debug!("parsed Command: {:?}", command);
        Ok(Some(command))
    }
}
