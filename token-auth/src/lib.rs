//! Token-based authentication to Oracle Autonomous Database
//!
//! Mints a short-lived database token with the OCI CLI, loads the token and
//! private key it writes, and runs one query over a connection that
//! authenticates with them instead of a password.

pub mod client;
pub mod config;
pub mod credentials;
pub mod mint;
pub mod session;
pub mod sqlplus;

pub use client::{ClientError, ConnectConfig, Connection, Connector, QueryResult};
pub use config::Config;
pub use credentials::{strip_pem_framing, CredentialError, CredentialLoader, CredentialRecord};
pub use session::{SessionOutcome, SessionReport, SessionRunner, DEFAULT_QUERY};
