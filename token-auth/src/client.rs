//! Database client capability
//!
//! The session only needs three things from a database client: open a
//! connection from a [`ConnectConfig`], run a statement on it, and close it.

use crate::credentials::CredentialRecord;
use serde::Serialize;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("token-based authentication requires external authentication")]
    ExternalAuthRequired,
    #[error("failed to start database client {binary}")]
    Spawn {
        binary: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to stage token files")]
    Stage(#[source] io::Error),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("statement failed: {0}")]
    Statement(String),
    #[error("client exited unexpectedly: {0}")]
    Disconnected(String),
    #[error("close failed: {0}")]
    Close(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Connection settings for token-based authentication.
///
/// There is no password field: the only constructor enables external
/// authentication and carries the token pair instead.
#[derive(Debug, Clone)]
pub struct ConnectConfig {
    access_token: CredentialRecord,
    external_auth: bool,
    connect_string: String,
}

impl ConnectConfig {
    pub fn token_based(access_token: CredentialRecord, connect_string: impl Into<String>) -> Self {
        Self {
            access_token,
            external_auth: true,
            connect_string: connect_string.into(),
        }
    }

    pub fn access_token(&self) -> &CredentialRecord {
        &self.access_token
    }

    pub fn external_auth(&self) -> bool {
        self.external_auth
    }

    pub fn connect_string(&self) -> &str {
        &self.connect_string
    }
}

/// Rows returned by a statement, every value rendered as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Opens connections.
#[allow(async_fn_in_trait)]
pub trait Connector {
    type Connection: Connection;

    async fn connect(&self, config: &ConnectConfig) -> Result<Self::Connection, ClientError>;
}

/// One open database connection. `close` consumes it, so it runs at most once.
#[allow(async_fn_in_trait)]
pub trait Connection {
    async fn execute(&mut self, sql: &str) -> Result<QueryResult, ClientError>;

    async fn close(self) -> Result<(), ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_based_enables_external_auth() {
        let config = ConnectConfig::token_based(
            CredentialRecord {
                token: "tok".to_string(),
                private_key: "key".to_string(),
            },
            "mydb_low",
        );

        assert!(config.external_auth());
        assert_eq!(config.connect_string(), "mydb_low");
        assert_eq!(config.access_token().token, "tok");
    }

    #[test]
    fn test_debug_does_not_leak_token() {
        let config = ConnectConfig::token_based(
            CredentialRecord {
                token: "very-secret".to_string(),
                private_key: "also-secret".to_string(),
            },
            "mydb_low",
        );

        let shown = format!("{:?}", config);
        assert!(!shown.contains("secret"));
        assert!(!shown.to_lowercase().contains("password"));
    }
}
