use std::env;
use std::path::PathBuf;

use serde_derive::Deserialize;

use crate::shell::builtins::{self, prelude::*};

pub struct Cd;

#[derive(Debug, Deserialize)]
struct CdArgs {
    arg_dir: Option<String>,
}

impl BuiltinCommand for Cd {
    const NAME: &'static str = builtins::CD_NAME;

    const HELP: &'static str = "\
Usage: cd [<dir>]

    Change the current directory to DIR. The variable $HOME is the default
    DIR. Both absolute and relative paths are accepted.";

    fn run<T: AsRef<str>>(_shell: &mut Shell, args: &[T], _stdout: &mut dyn Write) -> Result<()> {
        let args: CdArgs = parse_args(Self::HELP, Self::NAME, args.iter().map(AsRef::as_ref))?;
        debug!("{:?}", args);

        let dir = match args.arg_dir {
            Some(dir) => PathBuf::from(dir),
            None => home_dir().ok_or_else(|| Error::builtin_command("cd: HOME not set", 1))?,
        };

        env::set_current_dir(&dir)
            .map_err(|e| Error::builtin_command(format!("cd: {}: {}", dir.display(), e), 1))?;
        info!("changed directory to {}", dir.display());
        Ok(())
    }
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
        .or_else(::dirs::home_dir)
}
