//! Genreshelf Library
//!
//! Exposes the cache, catalog clients, configuration, and terminal UI so the
//! binary and integration tests share one implementation.

pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod logging;
pub mod ui;
