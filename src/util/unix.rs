use nix::unistd;

/// Writes `message` straight to the stdout file descriptor, bypassing the
/// buffered `std::io::Stdout`. Safe to call from a signal handler or from a
/// freshly forked child.
pub fn write_stdout(message: &[u8]) {
    write_all(libc::STDOUT_FILENO, message);
}

/// Unbuffered counterpart of `write_stdout` for the stderr descriptor.
pub fn write_stderr(message: &[u8]) {
    write_all(libc::STDERR_FILENO, message);
}

fn write_all(fd: libc::c_int, mut message: &[u8]) {
    while !message.is_empty() {
        match unistd::write(fd, message) {
            Ok(0) => return,
            Ok(n) => message = &message[n..],
            Err(nix::errno::Errno::EINTR) => continue,
            Err(_) => return,
        }
    }
}
