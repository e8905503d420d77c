use std::fmt;

use failure::{Fail, ResultExt};
use rustyline::{
    self,
    completion::{Completer, FilenameCompleter, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::{DefaultHistory, History},
    validate::Validator,
    CompletionType, Config, Helper,
};

use crate::errors::{ErrorKind, Result};

struct EditorHelper(FilenameCompleter);

impl Completer for EditorHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        self.0.complete(line, pos, ctx)
    }
}

impl Hinter for EditorHelper {
    type Hint = String;
}

impl Highlighter for EditorHelper {}

impl Helper for EditorHelper {}

impl Validator for EditorHelper {}

/// Line reader for the interactive shell, with in-memory history.
pub struct Editor {
    internal: rustyline::Editor<EditorHelper, DefaultHistory>,
    history_capacity: usize,
}

impl Editor {
    pub fn with_capacity(history_capacity: usize) -> Result<Editor> {
        let mut builder = Config::builder()
            .history_ignore_space(true)
            .completion_type(CompletionType::Circular);
        if history_capacity > 0 {
            builder = builder
                .max_history_size(history_capacity)
                .context(ErrorKind::Readline)?;
        }

        let mut internal =
            rustyline::Editor::with_config(builder.build()).context(ErrorKind::Readline)?;
        internal.set_helper(Some(EditorHelper(FilenameCompleter::new())));

        Ok(Editor {
            internal,
            history_capacity,
        })
    }

    /// Reads one line. Returns `None` at end of input.
    ///
    /// Ctrl-C at the prompt abandons the current line and yields an empty
    /// one, so the caller simply prompts again.
    pub fn readline(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.internal.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Eof) => Ok(None),
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(e) => Err(e.context(ErrorKind::Readline).into()),
        }
    }

    pub fn add_history_entry(&mut self, line: &str) {
        if self.history_capacity == 0 {
            return;
        }

        let temp_result = self.internal.add_history_entry(line);
        log_if_err!(temp_result, "failed to add history entry");
    }
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "history: {}\tcapacity: {}",
            self.internal.history().len(),
            self.history_capacity
        )
    }
}
