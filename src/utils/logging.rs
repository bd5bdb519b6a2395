//! Logging macros gated on a per-module `ENABLE_LOGS` const.
//!
//! Modules that want to silence their own diagnostics without touching
//! `RUST_LOG` declare the flag next to their imports:
//!
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_debug, log_warn};
//!
//! log_debug!("ranked {} items", 12);
//! ```
//!
//! When the flag is `false` the branch is constant-folded away; otherwise the
//! call goes straight to the `log` facade and is filtered by `env_logger`.

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// Warnings are for degraded behaviour the caller can't see, such as a
/// scoring strategy that failed and was counted as zero.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}
