//! Application-level utilities for the msgvault CLI.
//!
//! This module provides:
//! - Lazily-resolved configuration and storage
//! - Secret loading from the environment
//! - Construction of the core services

mod context;
mod secrets;

pub use context::AppContext;
