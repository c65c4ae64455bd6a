//! ## Logging Configuration
//!
//! Logging is set up at program startup using the `ctor` crate and is controlled by
//! the `DEBUG_BOOKING_FEATURES` environment variable:
//!
//! - **Disabled** (default): the variable is unset, empty, `"0"` or `"false"`.
//! - **Enabled**: any other value installs a `tracing_subscriber` formatter at `DEBUG` level.
//!
//! ```sh
//! export DEBUG_BOOKING_FEATURES=true
//! ```

use ctor::ctor;
use tracing::Level;

/// Name of the environment variable that switches debug logging on.
pub const DEBUG_ENV_VAR: &str = "DEBUG_BOOKING_FEATURES";

/// Returns true if the given value of [`DEBUG_ENV_VAR`] enables logging.
pub fn logging_enabled(value: Option<&str>) -> bool {
    value.is_some_and(|v| !(v == "0" || v == "false" || v.is_empty()))
}

#[ctor]
fn set_debug_level() {
    let value = std::env::var(DEBUG_ENV_VAR).ok();
    if logging_enabled(value.as_deref()) {
        // A subscriber may already be installed by the host application.
        let _ = tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .try_init();
    }
}
