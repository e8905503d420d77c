use std::path::PathBuf;
use std::process;

use docopt::Docopt;
use failure::Error;
use log::{debug, error, LevelFilter};
use msh_rs::{errors::Result, Shell, ShellConfig};
use nix::unistd::Pid;
use serde_derive::Deserialize;

const COMMAND_HISTORY_CAPACITY: usize = 100;
const LOG_FILE_NAME: &str = ".msh_log";
const FAILURE_EXIT_STATUS: i32 = 1;

const USAGE: &str = "
msh.

Usage:
    msh [options]
    msh [options] -c <command>
    msh [options] <file>
    msh (-h | --help)
    msh --version

Options:
    -h --help       Show this screen.
    --version       Show version.
    -c              If the -c option is present, then commands are read from the first non-option
                        argument command_string.
    --log=<path>    File to write log to, defaults to ~/.msh_log
";

/// Docopts input arguments.
#[derive(Debug, Deserialize)]
struct Args {
    arg_command: Option<String>,
    arg_file: Option<String>,
    flag_version: bool,
    flag_c: bool,
    flag_log: Option<String>,
}

fn main() {
    let args: Args = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());

    if let Err(e) = init_logger(&args.flag_log) {
        eprintln!("msh: logging disabled: {}", e);
    }
    debug!("{:?}", args);

    if args.flag_version {
        println!("msh version {}", env!("CARGO_PKG_VERSION"));
    } else if args.flag_c || args.arg_file.is_some() {
        execute_from_command_string_or_file(&args);
    } else {
        execute_from_stdin();
    }
}

fn init_logger(path: &Option<String>) -> std::result::Result<(), Error> {
    let log_path = match path.clone().map(PathBuf::from).or_else(default_log_path) {
        Some(log_path) => log_path,
        None => return Ok(()),
    };

    let pid = Pid::this();
    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                pid,
                record.level(),
                record.target(),
                message
            ))
        })
        .level(LevelFilter::Trace)
        .chain(fern::log_file(log_path)?)
        .apply()?;

    Ok(())
}

fn default_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(LOG_FILE_NAME))
}

fn execute_from_command_string_or_file(args: &Args) -> ! {
    let shell_config = ShellConfig::noninteractive();
    let mut shell = Shell::new(shell_config).unwrap_or_else(|e| display_error_and_exit(&e));

    let result = if let Some(ref command) = args.arg_command {
        shell.execute_command_string(command)
    } else if let Some(ref file_path) = args.arg_file {
        shell.execute_commands_from_file(file_path)
    } else {
        unreachable!();
    };
    shell.check_jobs();

    exit(result, &mut shell);
}

fn execute_from_stdin() -> ! {
    let shell_config = ShellConfig::interactive(COMMAND_HISTORY_CAPACITY);
    let mut shell = Shell::new(shell_config).unwrap_or_else(|e| display_error_and_exit(&e));
    shell.execute_from_stdin();
    shell.exit()
}

fn display_error_and_exit(error: &msh_rs::errors::Error) -> ! {
    error!("failed to create shell: {}", error);
    eprintln!("msh: {}", error);
    process::exit(FAILURE_EXIT_STATUS);
}

fn exit(result: Result<()>, shell: &mut Shell) -> ! {
    if let Err(e) = result {
        eprintln!("msh: {}", e);
        shell.exit_with_status(FAILURE_EXIT_STATUS);
    } else {
        shell.exit();
    }
}
