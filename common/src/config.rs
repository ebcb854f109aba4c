//! Environment variable parsing helpers
//!
//! Provides ergonomic helpers for reading configuration from environment variables.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Extension trait for parsing environment variables.
///
/// Provides convenient methods for reading env vars with defaults, required values,
/// and type parsing.
pub trait ConfigExt {
    /// Get an environment variable with a default value.
    ///
    /// # Example
    /// ```ignore
    /// let binary = String::env_or("ORACLEDB_SQLPLUS", "sqlplus");
    /// ```
    fn env_or(name: &str, default: &str) -> String {
        env::var(name).unwrap_or_else(|_| default.to_string())
    }

    /// Get a required environment variable, returning an error if not set.
    ///
    /// Empty values count as unset.
    ///
    /// # Example
    /// ```ignore
    /// let connect_string = String::env_required("ORACLEDB_CONNECTIONSTRING")?;
    /// ```
    fn env_required(name: &str) -> Result<String> {
        env::var(name)
            .ok()
            .filter(|v| !v.is_empty())
            .context(format!("{} must be set", name))
    }

    /// Get an environment variable as a boolean.
    ///
    /// Returns `true` if the value is "true" (case-insensitive), otherwise `default`.
    fn env_bool(name: &str, default: bool) -> bool {
        env::var(name)
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(default)
    }

    /// Get an environment variable as a path, falling back to `default`
    /// resolved relative to the home directory.
    ///
    /// # Example
    /// ```ignore
    /// let dir = PathBuf::env_path_or("ORACLEDB_ACCESS_TOKEN_LOC", ".oci/db-token");
    /// ```
    fn env_path_or(name: &str, home_relative_default: &str) -> PathBuf {
        match env::var(name) {
            Ok(v) if !v.is_empty() => PathBuf::from(v),
            _ => home_dir().join(home_relative_default),
        }
    }
}

// Blanket implementation for all types
impl<T> ConfigExt for T {}

/// Home directory from `HOME`, or the current directory when unset.
pub fn home_dir() -> PathBuf {
    env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}
