//! Foundation types for spalite.
//!
//! This crate holds the host-agnostic pieces shared by the navigation core,
//! the browser binding, and the headless driver: error types, pointer and
//! anchor input snapshots, and the navigation configuration.

pub mod config;
pub mod error;
pub mod input;
