use crate::shell::builtins::{self, prelude::*};

pub struct Status;

impl BuiltinCommand for Status {
    const NAME: &'static str = builtins::STATUS_NAME;

    const HELP: &'static str = "\
Usage: status

    Print the exit value or terminating signal of the last foreground
    command. Builtins and background commands do not change it. Arguments
    are ignored.";

    fn run<T: AsRef<str>>(shell: &mut Shell, _args: &[T], stdout: &mut dyn Write) -> Result<()> {
        writeln!(stdout, "{}", shell.last_status()).context(ErrorKind::Io)?;
        stdout.flush().context(ErrorKind::Io)?;
        Ok(())
    }
}
