//! Shared utilities for MobileCLI.

use std::fmt::Display;

/// Panic in debug builds, log error with backtrace in release.
///
/// Use for registry and keeper invariants that must never break, but which
/// should not take a running shell down with them in production.
#[macro_export]
macro_rules! debug_panic {
    ( $($fmt_arg:tt)* ) => {
        if cfg!(debug_assertions) {
            panic!( $($fmt_arg)* );
        } else {
            let backtrace = std::backtrace::Backtrace::capture();
            tracing::error!("{}\n{:?}", format_args!($($fmt_arg)*), backtrace);
        }
    };
}

/// Log-and-continue helpers for best-effort steps.
pub trait ResultExt<T> {
    /// Log the error at `warn` with `what` as context and return `None`.
    fn warn_on_err(self, what: impl Display) -> Option<T>;
}

impl<T, E: Display> ResultExt<T> for Result<T, E> {
    fn warn_on_err(self, what: impl Display) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!("{}: {}", what, error);
                None
            }
        }
    }
}

/// Pluralize a count for status lines ("1 session", "3 sessions").
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
