//! Startup options.
//!
//! JS callers pass overrides as a plain object; the wasm layer stringifies it
//! and hands the JSON here. Missing or null-ish input means defaults.

use portfolio_core::{ConfigError, PageConfig};

/// Build a [`PageConfig`] from optional JSON overrides.
pub fn page_config(json: Option<&str>) -> Result<PageConfig, ConfigError> {
    match json.map(str::trim) {
        None | Some("" | "null" | "undefined") => Ok(PageConfig::default()),
        Some(json) => PageConfig::from_json(json),
    }
}
