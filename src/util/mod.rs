/// Logs the error of a `Result` at error level along with a formatted
/// message, leaving the `Result` itself untouched.
macro_rules! log_if_err {
    ($result:expr, $fmt:literal) => {
        if let Err(ref e) = $result {
            error!(concat!($fmt, ": {}"), e);
        }
    };
    ($result:expr, $fmt:literal, $($arg:tt)+) => {
        if let Err(ref e) = $result {
            error!(concat!($fmt, ": {}"), $($arg)+, e);
        }
    };
}

pub mod unix;
