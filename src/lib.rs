//! Msh - a small job-control shell
//!
//! Lines of the form `command [arg ...] [< in] [> out] [&]` are run as child
//! processes, in the foreground or in the background. SIGTSTP switches the
//! shell in and out of foreground-only mode.

#![deny(
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]

#[macro_use]
extern crate log;

#[macro_use]
mod util;

pub mod core;
mod editor;
pub mod errors;
pub mod shell;

pub use crate::shell::{Shell, ShellConfig};
