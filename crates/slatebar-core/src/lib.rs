//! Core types, configuration, and utilities for the slatebar panel.
//!
//! This crate provides:
//! - Configuration parsing from TOML
//! - Error types shared across the workspace
//! - Logging setup

pub mod config;
pub mod error;
pub mod logging;

pub use config::{Config, ConfigSource, DEFAULT_CONFIG_TOML};
pub use error::{Error, Result};
