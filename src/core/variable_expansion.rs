use nix::unistd::Pid;

/// Expands to the process id of the shell.
pub const PID_VARIABLE: &str = "$$";

/// Replaces every occurrence of `$$` in `input` with the decimal `pid`.
///
/// Occurrences are matched left to right without overlap, and replaced text
/// is never scanned again, so `$$$` expands to the pid followed by a lone `$`.
pub fn expand_variables(input: &str, pid: Pid) -> String {
    if !input.contains(PID_VARIABLE) {
        return input.to_string();
    }

    let expanded = input.replace(PID_VARIABLE, &pid.to_string());
    debug!("expanded '{}' to '{}'", input, expanded);
    expanded
}
