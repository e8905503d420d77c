use crate::shell::builtins::{self, prelude::*};

pub struct Exit;

impl BuiltinCommand for Exit {
    const NAME: &'static str = builtins::EXIT_NAME;

    const HELP: &'static str = "\
Usage: exit

    Exit the shell with a status of 0. Background jobs that are still
    running are killed first. Arguments are ignored.";

    fn run<T: AsRef<str>>(shell: &mut Shell, _args: &[T], _stdout: &mut dyn Write) -> Result<()> {
        shell.exit();
    }
}
