//! Shared configuration and error types for the notebook visualization crates.

pub mod config;
pub mod error;

pub use error::{Error, Result};
