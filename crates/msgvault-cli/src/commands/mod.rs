//! Command handlers.

pub mod account;
pub mod entries;
