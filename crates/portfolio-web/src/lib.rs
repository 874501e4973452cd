#![forbid(unsafe_code)]

//! WASM frontend for the portfolio page.
//!
//! The page logic lives in `portfolio-core` and is host-agnostic. This crate
//! binds it to a real browser document through `web-sys`:
//! - a `WebDom` implementing the core `Dom` trait,
//! - closures that forward DOM events and intersection batches into the page,
//! - one `setTimeout` re-armed to the next pending page timer,
//! - a `PortfolioApp` handle exported to JS, with at most one live page per
//!   document.

pub mod instance;
pub mod options;

#[cfg(target_arch = "wasm32")]
mod logging;
#[cfg(target_arch = "wasm32")]
mod wasm;
#[cfg(target_arch = "wasm32")]
mod web_dom;

#[cfg(target_arch = "wasm32")]
pub use wasm::PortfolioApp;

#[cfg(not(target_arch = "wasm32"))]
use portfolio_core::{ConfigError, PageConfig};

/// Native builds compile this crate as a stub so `cargo check --workspace` stays
/// green on non-wasm targets. It resolves options like the web build but never
/// mounts anything.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct PortfolioApp {
    config: PageConfig,
}

#[cfg(not(target_arch = "wasm32"))]
impl PortfolioApp {
    /// Resolve `options` (JSON overrides) against the defaults.
    pub fn start(options: Option<&str>) -> Result<Self, ConfigError> {
        let config = options::page_config(options)?;
        Ok(Self { config })
    }

    /// Always false: there is no document to mount into.
    pub fn is_mounted(&self) -> bool {
        false
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn destroy(&mut self) {}
}
