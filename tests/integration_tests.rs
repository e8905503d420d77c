//! Integration Tests

#[macro_use]
extern crate lazy_static;


use std::collections::HashMap;
use std::fs::{self, DirEntry};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;

use crate::workdir::{stderr_of, stdout_of, WorkDir};

struct ScriptData<'a> {
    pub stdout: &'a str,
    pub stderr: &'a str,
    pub exit_status: i32,
}

lazy_static! {
    static ref MSH_SCRIPTS_MAP: HashMap<&'static str, ScriptData<'static>> = {
        let mut map = HashMap::new();
        map.insert("simple_echo.msh", ScriptData { stdout: "test\n", stderr: "", exit_status: 0 });
        map.insert("simple_redirects.msh", ScriptData {
            stdout: "test output\n2\n",
            stderr: "",
            exit_status: 0
        });
        map.insert("simple_status.msh", ScriptData {
            stdout: "exit value 1\nexit value 0\n",
            stderr: "",
            exit_status: 0
        });
        map.insert("simple_comments.msh", ScriptData { stdout: "shown\n", stderr: "", exit_status: 0 });
        map.insert("simple_cd.msh", ScriptData { stdout: "/\n", stderr: "", exit_status: 0 });
        map.insert("simple_exit.msh", ScriptData { stdout: "before\n", stderr: "", exit_status: 0 });
        map.insert("simple_exec_failure.msh", ScriptData {
            stdout: "exit value 1\n",
            stderr: "nosuchcommand_msh: No such file or directory\n",
            exit_status: 0
        });
        map
    };
}

#[test]
fn test_all_simple_msh_scripts() {
    let simple_scripts = get_path_to_test_scripts()
        .read_dir()
        .expect("read_dir failed")
        .map(|entry| entry.expect("unable to open test script"))
        .filter(|entry| is_simple_msh_script(entry));

    for entry in simple_scripts {
        let work_dir = WorkDir::new("msh-script");
        let file_path = entry.path();
        let filename = entry.file_name();
        let filename = filename.to_str().expect("filename should be valid Unicode");
        let expected_data = MSH_SCRIPTS_MAP
            .get(filename)
            .expect("simple script should have matching data in MSH_SCRIPTS_MAP");

        let output = work_dir
            .command(&[&file_path])
            .output()
            .expect("unable to run msh");
        assert_eq!(stdout_of(&output), expected_data.stdout, "{}", filename);
        assert_eq!(stderr_of(&output), expected_data.stderr, "{}", filename);
        assert_eq!(
            output.status.code(),
            Some(expected_data.exit_status),
            "{}",
            filename
        );
    }
}

fn get_path_to_test_scripts() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("scripts")
}

/// Does filename start with 'simple' and end with '.msh'?
fn is_simple_msh_script(entry: &DirEntry) -> bool {
    let filename = entry.file_name();
    let unicode_filename = filename.to_str().expect("filename should be valid Unicode");
    unicode_filename.starts_with("simple") && unicode_filename.ends_with(".msh")
}

/// Extracts the pid from a "background pid is N" line.
fn background_pid(stdout: &str) -> Pid {
    let line = stdout
        .lines()
        .find(|line| line.starts_with("background pid is "))
        .expect("background job should be announced");
    let raw = line["background pid is ".len()..]
        .trim()
        .parse()
        .expect("pid should be a number");
    Pid::from_raw(raw)
}

#[test]
fn test_command_string() {
    let work_dir = WorkDir::new("msh-c");
    let output = work_dir.output(&mut work_dir.command(&["-c", "echo hi there"]));
    assert_eq!(stdout_of(&output), "hi there\n");
}

#[test]
fn test_version() {
    let work_dir = WorkDir::new("msh-version");
    let output = work_dir.output(&mut work_dir.command(&["--version"]));
    assert!(stdout_of(&output).starts_with("msh version "));
}

#[test]
fn test_missing_script_fails() {
    let work_dir = WorkDir::new("msh-missing");
    let output = work_dir
        .command(&["no_such_script.msh"])
        .output()
        .expect("unable to run msh");
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).starts_with("msh: "));
}

#[test]
fn test_log_file_is_written() {
    let work_dir = WorkDir::new("msh-log");
    work_dir.output(&mut work_dir.command(&["-c", "true"]));
    let log = fs::read_to_string(work_dir.log_path()).expect("log file should exist");
    assert!(log.contains("msh started up"));
}

#[test]
fn test_pid_expansion() {
    let work_dir = WorkDir::new("msh-pid");
    let mut child = work_dir.spawn_interactive();
    let pid = child.id();
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(b"echo hi$$ $$$\nstatus\n")
        .expect("unable to write script");
    let output = child.wait_with_output().expect("msh did not finish");

    assert_eq!(
        stdout_of(&output),
        format!("hi{} {}$\nexit value 0\n", pid, pid)
    );
}

#[test]
fn test_syntax_errors_are_reported() {
    let work_dir = WorkDir::new("msh-syntax");
    let output = work_dir.pipe("cat <\nsleep & 5\n< in.txt\n&\necho ok\nstatus\n");
    assert_eq!(stdout_of(&output), "ok\nexit value 0\n");
    assert_eq!(
        stderr_of(&output),
        "msh: syntax error near: newline\n\
         msh: syntax error near: 5\n\
         msh: syntax error near: <\n\
         msh: syntax error near: &\n"
    );
    assert!(output.status.success());
}

#[test]
fn test_redirect_failure_sets_status() {
    let work_dir = WorkDir::new("msh-redirect");
    let output = work_dir.pipe("ls > /no/such/dir/out.txt\nstatus\ncat < missing.txt\n");
    assert_eq!(
        stdout_of(&output),
        "cannot open /no/such/dir/out.txt for output\n\
         exit value 1\n\
         cannot open missing.txt for input\n"
    );
}

#[test]
fn test_background_job_is_reported() {
    let work_dir = WorkDir::new("msh-bg");
    let output = work_dir.pipe("true &\nsleep 1\necho after\n");
    let stdout = stdout_of(&output);
    let pid = background_pid(&stdout);

    let done = format!("background pid {} is done: exit value 0\n", pid);
    let done_at = stdout.find(&done).expect("background job should be reaped");
    let after_at = stdout.find("after\n").expect("shell should keep running");
    assert!(done_at < after_at);
}

#[test]
fn test_background_output_goes_to_null_device() {
    let work_dir = WorkDir::new("msh-bg-null");
    let output = work_dir.pipe("echo hidden &\nsleep 1\n");
    let stdout = stdout_of(&output);
    assert!(!stdout.contains("hidden"));
    assert!(stdout.contains("is done: exit value 0"));
}

#[test]
fn test_foreground_signal_is_reported() {
    let work_dir = WorkDir::new("msh-signal");
    fs::write(work_dir.path().join("term_self.sh"), "kill -TERM $$\n").unwrap();
    let output = work_dir.pipe("sh term_self.sh\nstatus\n");
    assert_eq!(
        stdout_of(&output),
        "terminated by signal 2\nterminated by signal 2\n"
    );
}

#[test]
fn test_background_signal_keeps_its_number() {
    let work_dir = WorkDir::new("msh-bg-signal");
    fs::write(work_dir.path().join("term_self.sh"), "kill -TERM $$\n").unwrap();
    let output = work_dir.pipe("sh term_self.sh &\nsleep 1\nstatus\n");
    let stdout = stdout_of(&output);
    let pid = background_pid(&stdout);
    assert!(stdout.contains(&format!(
        "background pid {} is done: terminated by signal 15\n",
        pid
    )));
    assert!(stdout.ends_with("exit value 0\n"));
}

#[test]
fn test_foreground_child_is_interruptible() {
    let work_dir = WorkDir::new("msh-fg-int");
    fs::write(work_dir.path().join("int_self.sh"), "kill -INT $$\necho survived\n").unwrap();
    let output = work_dir.pipe("sh int_self.sh\nstatus\n");
    assert_eq!(
        stdout_of(&output),
        "terminated by signal 2\nterminated by signal 2\n"
    );
}

#[test]
fn test_background_child_ignores_interrupt() {
    let work_dir = WorkDir::new("msh-bg-int");
    fs::write(
        work_dir.path().join("int_self.sh"),
        "kill -INT $$\necho survived > bg.txt\n",
    )
    .unwrap();
    let output = work_dir.pipe("sh int_self.sh &\nsleep 1\n");
    let stdout = stdout_of(&output);
    let pid = background_pid(&stdout);

    assert!(stdout.contains(&format!("background pid {} is done: exit value 0\n", pid)));
    let written = fs::read_to_string(work_dir.path().join("bg.txt")).unwrap();
    assert_eq!(written, "survived\n");
}

#[test]
fn test_children_ignore_stop_signal() {
    let work_dir = WorkDir::new("msh-child-tstp");
    fs::write(work_dir.path().join("tstp_self.sh"), "kill -TSTP $$\necho survived\n").unwrap();
    let output = work_dir.pipe("sh tstp_self.sh\nstatus\n");
    assert_eq!(stdout_of(&output), "survived\nexit value 0\n");
}

#[test]
fn test_exit_kills_background_jobs() {
    let work_dir = WorkDir::new("msh-exit");
    let output = work_dir.pipe("sleep 30 &\nexit\n");
    assert!(output.status.success());

    let pid = background_pid(&stdout_of(&output));
    assert!(signal::kill(pid, None).is_err());
}

/// Reads lines from `reader` until one equals `expected`.
fn wait_for_line<R: BufRead>(reader: &mut R, expected: &str) {
    let mut line = String::new();
    loop {
        line.clear();
        let n = reader.read_line(&mut line).expect("unable to read stdout");
        assert!(n > 0, "msh closed stdout before printing {:?}", expected);
        if line.trim_end() == expected {
            return;
        }
    }
}

#[test]
fn test_sigtstp_toggles_foreground_only_mode() {
    let work_dir = WorkDir::new("msh-tstp");
    let mut child = work_dir.spawn_interactive();
    let pid = Pid::from_raw(child.id() as i32);
    let mut stdin = child.stdin.take().expect("stdin should be piped");
    let mut stdout = BufReader::new(child.stdout.take().expect("stdout should be piped"));

    stdin.write_all(b"echo ready\n").unwrap();
    wait_for_line(&mut stdout, "ready");

    signal::kill(pid, Signal::SIGTSTP).unwrap();
    wait_for_line(&mut stdout, "Entering foreground-only mode (& is now ignored)");

    stdin.write_all(b"echo fg &\n").unwrap();
    wait_for_line(&mut stdout, "fg");

    signal::kill(pid, Signal::SIGTSTP).unwrap();
    wait_for_line(&mut stdout, "Exiting foreground-only mode");

    stdin.write_all(b"true &\nexit\n").unwrap();
    drop(stdin);
    let mut rest = String::new();
    for line in stdout.lines() {
        rest.push_str(&line.unwrap());
        rest.push('\n');
    }
    assert!(rest.contains("background pid is "));
    assert!(child.wait().unwrap().success());
}

#[test]
fn test_sigint_is_ignored_by_shell() {
    let work_dir = WorkDir::new("msh-int");
    let mut child = work_dir.spawn_interactive();
    let pid = Pid::from_raw(child.id() as i32);
    let mut stdin = child.stdin.take().expect("stdin should be piped");
    let mut stdout = BufReader::new(child.stdout.take().expect("stdout should be piped"));

    stdin.write_all(b"echo ready\n").unwrap();
    wait_for_line(&mut stdout, "ready");

    signal::kill(pid, Signal::SIGINT).unwrap();
    thread::sleep(Duration::from_millis(100));

    stdin.write_all(b"echo alive\n").unwrap();
    wait_for_line(&mut stdout, "alive");
    drop(stdin);
    assert!(child.wait().unwrap().success());
}
