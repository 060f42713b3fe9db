//! Shared types for the EcoDEX backend
//!
//! Common error type and configuration loading used by the service crates.

pub mod config;
pub mod error;

pub use error::{Error, Result};
