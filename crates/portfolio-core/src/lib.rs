#![forbid(unsafe_code)]

//! Core: page components, DOM capability, and the host-driven runtime for the
//! portfolio site.
//!
//! Nothing in this crate touches a browser. The web crate supplies a
//! [`dom::Dom`] implementation over `web-sys`; tests use
//! [`testing::FakeDocument`].

pub mod components;
pub mod config;
pub mod dom;
pub mod page;
pub mod registry;
pub mod timer;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use config::{ConfigError, PageConfig};
pub use dom::{Dom, DomEvent, EventType, IntersectionEntry, Target};
pub use page::{DispatchOutcome, Page};
