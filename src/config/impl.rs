use std::sync::{Arc, OnceLock};

use super::StaticConfig;

static CONFIG: OnceLock<Arc<StaticConfig>> = OnceLock::new();

/// Initialize the global configuration
///
/// Loads configuration from `path` (or "config.toml" in the current
/// directory). If the file doesn't exist, uses in-memory defaults.
/// Only the first call has any effect; later calls return the same instance.
///
/// # Examples
/// ```no_run
/// use geosession::config::init_config;
/// init_config(None);
/// ```
pub fn init_config(path: Option<&str>) -> Arc<StaticConfig> {
    Arc::clone(CONFIG.get_or_init(|| Arc::new(StaticConfig::load(path))))
}
