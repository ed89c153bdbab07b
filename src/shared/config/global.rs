use once_cell::sync::Lazy;
use std::sync::Arc;

use crate::shared::config::model::{CONFIG_PATH_ENV, Settings, load_settings};

/// Process-wide settings, loaded on first access.
pub static CONFIG: Lazy<Arc<Settings>> = Lazy::new(|| {
    let settings = load_settings().unwrap_or_else(|e| {
        panic!("Failed to load configuration (path from {}): {}", CONFIG_PATH_ENV, e)
    });
    Arc::new(settings)
});
