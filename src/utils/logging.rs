//! Logger setup and per-tick logging macros.
//!
//! The blocking loop runs once a second, so its chatter is routed through
//! macros that check a module-level `LOG_TICKS` flag:
//! ```ignore
//! const LOG_TICKS: bool = true;
//!
//! use crate::{tick_debug, tick_info, tick_warn};
//!
//! tick_debug!("foreground: {:?}", app);
//! ```

/// Installs `env_logger` at `info`, overridable through `RUST_LOG`.
/// Safe to call more than once.
pub fn init() {
    let _ = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();
}

/// Debug log gated by the calling module's `LOG_TICKS` const.
#[macro_export]
macro_rules! tick_debug {
    ($($arg:tt)*) => {
        if LOG_TICKS {
            log::debug!($($arg)*);
        }
    };
}

/// Info log gated by the calling module's `LOG_TICKS` const.
#[macro_export]
macro_rules! tick_info {
    ($($arg:tt)*) => {
        if LOG_TICKS {
            log::info!($($arg)*);
        }
    };
}

/// Warn log gated by the calling module's `LOG_TICKS` const.
#[macro_export]
macro_rules! tick_warn {
    ($($arg:tt)*) => {
        if LOG_TICKS {
            log::warn!($($arg)*);
        }
    };
}
