//! Signal dispositions for the shell and its children.
//!
//! The shell ignores SIGINT so that Ctrl-C only reaches foreground children.
//! SIGTSTP toggles foreground-only mode, in which a trailing `&` is ignored.

use std::sync::atomic::{AtomicBool, Ordering};

use failure::ResultExt;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};

use crate::errors::{ErrorKind, Result};
use crate::util::unix::write_stdout;

/// Signal whose default disposition is restored in foreground children.
pub const INTERRUPT_SIGNAL: Signal = Signal::SIGINT;
/// Signal that toggles foreground-only mode.
pub const TOGGLE_SIGNAL: Signal = Signal::SIGTSTP;

const ENTER_FOREGROUND_ONLY_MESSAGE: &str =
    "\nEntering foreground-only mode (& is now ignored)\n";
const EXIT_FOREGROUND_ONLY_MESSAGE: &str = "\nExiting foreground-only mode\n";

/// Written only from the SIGTSTP handler.
static FOREGROUND_ONLY: AtomicBool = AtomicBool::new(false);

pub fn is_foreground_only() -> bool {
    FOREGROUND_ONLY.load(Ordering::SeqCst)
}

/// Flips foreground-only mode and announces the new mode on stdout.
/// Returns `true` if the shell is now in foreground-only mode.
///
/// Only async-signal-safe operations are used: an atomic read-modify-write
/// and `write(2)` on the raw stdout descriptor.
pub fn toggle_foreground_only() -> bool {
    let was_foreground_only = FOREGROUND_ONLY.fetch_xor(true, Ordering::SeqCst);
    if was_foreground_only {
        write_stdout(EXIT_FOREGROUND_ONLY_MESSAGE.as_bytes());
    } else {
        write_stdout(ENTER_FOREGROUND_ONLY_MESSAGE.as_bytes());
    }

    !was_foreground_only
}

extern "C" fn handle_toggle_signal(_: libc::c_int) {
    toggle_foreground_only();
}

/// Installs the shell's own dispositions: SIGINT ignored, SIGTSTP toggling
/// foreground-only mode. Children inherit both until `reset_for_child`.
pub fn install_shell_handlers() -> Result<()> {
    // Block every other signal while the toggle handler runs; restart
    // interrupted reads and waits rather than surfacing EINTR.
    let toggle_action = SigAction::new(
        SigHandler::Handler(handle_toggle_signal),
        SaFlags::SA_RESTART,
        SigSet::all(),
    );
    let ignore_action = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::all());

    unsafe {
        signal::sigaction(TOGGLE_SIGNAL, &toggle_action).context(ErrorKind::Nix)?;
        signal::sigaction(INTERRUPT_SIGNAL, &ignore_action).context(ErrorKind::Nix)?;
    }

    debug!("installed shell signal handlers");
    Ok(())
}

/// Applies a child's dispositions between `fork` and `exec`.
///
/// Children never toggle foreground-only mode. Foreground children get the
/// default SIGINT behavior back so Ctrl-C can stop them; background children
/// keep ignoring it like the shell.
pub fn reset_for_child(foreground: bool) -> nix::Result<()> {
    unsafe {
        signal::signal(TOGGLE_SIGNAL, SigHandler::SigIgn)?;
        if foreground {
            signal::signal(INTERRUPT_SIGNAL, SigHandler::SigDfl)?;
        }
    }

    Ok(())
}
