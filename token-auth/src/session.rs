//! One authenticated database round trip
//!
//! Opens a single connection with the token pair, runs one statement and
//! always closes the connection it opened. Nothing is retried.

use crate::client::{ConnectConfig, Connection, Connector, QueryResult};
use crate::credentials::CredentialRecord;
use tracing::{debug, error, info};

/// Statement run by the token-auth binary
pub const DEFAULT_QUERY: &str = "SELECT TO_CHAR(current_date, 'DD-Mon-YYYY HH24:MI') AS D FROM DUAL";

/// Progress of a session; every run ends in `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoConnection,
    Acquiring,
    Connected,
    Querying,
    Succeeded,
    Failed,
    Closing,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    ConnectFailed(String),
    QueryFailed(String),
    Succeeded(QueryResult),
}

/// Result of a session. A close failure is kept apart from the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub outcome: SessionOutcome,
    pub close_error: Option<String>,
    pub states: Vec<SessionState>,
}

impl SessionReport {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, SessionOutcome::Succeeded(_))
    }
}

pub struct SessionRunner<C> {
    connector: C,
    connect_string: String,
}

impl<C: Connector> SessionRunner<C> {
    pub fn new(connector: C, connect_string: impl Into<String>) -> Self {
        Self {
            connector,
            connect_string: connect_string.into(),
        }
    }

    /// Connect with `credentials`, run `sql`, close.
    pub async fn run(&self, credentials: CredentialRecord, sql: &str) -> SessionReport {
        let mut states = vec![SessionState::NoConnection];

        let config = ConnectConfig::token_based(credentials, self.connect_string.clone());

        enter(&mut states, SessionState::Acquiring);
        let mut connection = match self.connector.connect(&config).await {
            Ok(connection) => connection,
            Err(e) => {
                let message = format!("{:#}", anyhow::Error::new(e));
                error!(
                    connect_string = %config.connect_string(),
                    error = %message,
                    "Failed to connect"
                );
                enter(&mut states, SessionState::Failed);
                enter(&mut states, SessionState::Done);
                return SessionReport {
                    outcome: SessionOutcome::ConnectFailed(message),
                    close_error: None,
                    states,
                };
            }
        };
        enter(&mut states, SessionState::Connected);
        info!(connect_string = %config.connect_string(), "Connected with token-based authentication");

        enter(&mut states, SessionState::Querying);
        let outcome = match connection.execute(sql).await {
            Ok(result) => {
                let rendered = serde_json::to_string(&result).unwrap_or_default();
                info!(rows = result.rows.len(), result = %rendered, "Result is:");
                enter(&mut states, SessionState::Succeeded);
                SessionOutcome::Succeeded(result)
            }
            Err(e) => {
                let message = format!("{:#}", anyhow::Error::new(e));
                error!(error = %message, "Query failed");
                enter(&mut states, SessionState::Failed);
                SessionOutcome::QueryFailed(message)
            }
        };

        enter(&mut states, SessionState::Closing);
        let close_error = match connection.close().await {
            Ok(()) => {
                debug!("Connection closed");
                None
            }
            Err(e) => {
                let message = format!("{:#}", anyhow::Error::new(e));
                error!(error = %message, "Failed to close connection");
                Some(message)
            }
        };
        enter(&mut states, SessionState::Done);

        SessionReport {
            outcome,
            close_error,
            states,
        }
    }
}

fn enter(states: &mut Vec<SessionState>, state: SessionState) {
    debug!(?state, "Session state");
    states.push(state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Calls {
        connects: AtomicUsize,
        executes: AtomicUsize,
        closes: AtomicUsize,
        seen: Mutex<Option<ConnectConfig>>,
    }

    struct FakeConnector {
        calls: Arc<Calls>,
        fail_connect: bool,
        fail_query: bool,
        fail_close: bool,
    }

    impl FakeConnector {
        fn new() -> Self {
            Self {
                calls: Arc::new(Calls::default()),
                fail_connect: false,
                fail_query: false,
                fail_close: false,
            }
        }
    }

    struct FakeConnection {
        calls: Arc<Calls>,
        fail_query: bool,
        fail_close: bool,
    }

    impl Connector for FakeConnector {
        type Connection = FakeConnection;

        async fn connect(&self, config: &ConnectConfig) -> Result<FakeConnection, ClientError> {
            self.calls.connects.fetch_add(1, Ordering::SeqCst);
            *self.calls.seen.lock().unwrap() = Some(config.clone());
            if self.fail_connect {
                return Err(ClientError::Connect("ORA-01017: invalid credential".to_string()));
            }
            Ok(FakeConnection {
                calls: Arc::clone(&self.calls),
                fail_query: self.fail_query,
                fail_close: self.fail_close,
            })
        }
    }

    impl Connection for FakeConnection {
        async fn execute(&mut self, _sql: &str) -> Result<QueryResult, ClientError> {
            self.calls.executes.fetch_add(1, Ordering::SeqCst);
            if self.fail_query {
                return Err(ClientError::Statement("ORA-00942: table or view does not exist".to_string()));
            }
            Ok(QueryResult {
                columns: vec!["D".to_string()],
                rows: vec![vec!["16-Oct-2026 10:42".to_string()]],
            })
        }

        async fn close(self) -> Result<(), ClientError> {
            self.calls.closes.fetch_add(1, Ordering::SeqCst);
            if self.fail_close {
                return Err(ClientError::Close("ORA-03113: end-of-file on communication channel".to_string()));
            }
            Ok(())
        }
    }

    fn credentials() -> CredentialRecord {
        CredentialRecord {
            token: "tok".to_string(),
            private_key: "key".to_string(),
        }
    }

    #[tokio::test]
    async fn test_success_closes_once() {
        let connector = FakeConnector::new();
        let calls = Arc::clone(&connector.calls);

        let report = SessionRunner::new(connector, "mydb_low")
            .run(credentials(), DEFAULT_QUERY)
            .await;

        assert!(report.succeeded());
        assert_eq!(report.close_error, None);
        assert_eq!(calls.executes.load(Ordering::SeqCst), 1);
        assert_eq!(calls.closes.load(Ordering::SeqCst), 1);
        assert_eq!(
            report.states,
            vec![
                SessionState::NoConnection,
                SessionState::Acquiring,
                SessionState::Connected,
                SessionState::Querying,
                SessionState::Succeeded,
                SessionState::Closing,
                SessionState::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_passes_token_config_to_connector() {
        let connector = FakeConnector::new();
        let calls = Arc::clone(&connector.calls);

        SessionRunner::new(connector, "mydb_low")
            .run(credentials(), DEFAULT_QUERY)
            .await;

        let seen = calls.seen.lock().unwrap().clone().unwrap();
        assert!(seen.external_auth());
        assert_eq!(seen.connect_string(), "mydb_low");
        assert_eq!(seen.access_token(), &credentials());
    }

    #[tokio::test]
    async fn test_query_failure_still_closes_once() {
        let mut connector = FakeConnector::new();
        connector.fail_query = true;
        let calls = Arc::clone(&connector.calls);

        let report = SessionRunner::new(connector, "mydb_low")
            .run(credentials(), DEFAULT_QUERY)
            .await;

        assert!(matches!(report.outcome, SessionOutcome::QueryFailed(ref m) if m.contains("ORA-00942")));
        assert_eq!(calls.closes.load(Ordering::SeqCst), 1);
        assert_eq!(report.states.last(), Some(&SessionState::Done));
    }

    #[tokio::test]
    async fn test_connect_failure_never_closes() {
        let mut connector = FakeConnector::new();
        connector.fail_connect = true;
        let calls = Arc::clone(&connector.calls);

        let report = SessionRunner::new(connector, "mydb_low")
            .run(credentials(), DEFAULT_QUERY)
            .await;

        assert!(matches!(report.outcome, SessionOutcome::ConnectFailed(ref m) if m.contains("ORA-01017")));
        assert_eq!(calls.connects.load(Ordering::SeqCst), 1);
        assert_eq!(calls.executes.load(Ordering::SeqCst), 0);
        assert_eq!(calls.closes.load(Ordering::SeqCst), 0);
        assert!(!report.states.contains(&SessionState::Closing));
        assert_eq!(report.states.last(), Some(&SessionState::Done));
    }

    #[tokio::test]
    async fn test_close_failure_does_not_mask_query_failure() {
        let mut connector = FakeConnector::new();
        connector.fail_query = true;
        connector.fail_close = true;
        let calls = Arc::clone(&connector.calls);

        let report = SessionRunner::new(connector, "mydb_low")
            .run(credentials(), DEFAULT_QUERY)
            .await;

        assert!(matches!(report.outcome, SessionOutcome::QueryFailed(_)));
        assert!(report.close_error.as_deref().unwrap().contains("ORA-03113"));
        assert_eq!(calls.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_connect_failure_reports_full_cause() {
        struct SpawnFails;

        impl Connector for SpawnFails {
            type Connection = FakeConnection;

            async fn connect(&self, _config: &ConnectConfig) -> Result<FakeConnection, ClientError> {
                Err(ClientError::Spawn {
                    binary: "sqlplus".to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
                })
            }
        }

        let report = SessionRunner::new(SpawnFails, "mydb_low")
            .run(credentials(), DEFAULT_QUERY)
            .await;

        assert_eq!(
            report.outcome,
            SessionOutcome::ConnectFailed(
                "failed to start database client sqlplus: No such file or directory".to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_close_failure_keeps_success() {
        let mut connector = FakeConnector::new();
        connector.fail_close = true;

        let report = SessionRunner::new(connector, "mydb_low")
            .run(credentials(), DEFAULT_QUERY)
            .await;

        assert!(report.succeeded());
        assert!(report.close_error.is_some());
    }
}
