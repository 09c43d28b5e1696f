//! spalite navigation core.
//!
//! Turns a static multi-page site into a single-page-like experience:
//! same-origin link clicks fetch the target page, swap its content region
//! into the live document and record a history entry, without a full
//! reload. The core is host-agnostic; the browser binding and the headless
//! driver plug in through the [`host`] traits.

// Re-exports from spalite-types.
pub use spalite_types::config;
pub use spalite_types::error;
pub use spalite_types::input;

pub mod cache;
pub mod controller;
pub mod document;
pub mod headless;
pub mod host;
pub mod html;
pub mod links;
pub mod path;
pub mod url;

#[cfg(test)]
pub(crate) mod test_utils;

pub use controller::{NavigationController, NavigationOutcome, PageChanged};
pub use host::{FetchRequest, FetchResponse, FetchResult, NavigationMode, PageFetcher, PageHost};
pub use path::PathNormalizer;
