//! battle-admin - HTTP backend for the battle game administration tool.
//!
//! This library exposes the core modules for use in integration tests.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod mapping;
pub mod models;
pub mod server;
