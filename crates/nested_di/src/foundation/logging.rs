//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

use crate::config::ContainerSettings;

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    init_with_filter(None);
}

/// Initialize logging with an explicit filter, e.g. `"nested_di=debug"`.
///
/// `RUST_LOG` still wins when set. Calling this more than once is harmless.
pub fn init_with_filter(filter: Option<&str>) {
    let env = env_logger::Env::default().default_filter_or(filter.unwrap_or("info"));
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}

/// Initialize logging from container settings
pub fn init_from_settings(settings: &ContainerSettings) {
    init_with_filter(settings.log_filter.as_deref());
}
