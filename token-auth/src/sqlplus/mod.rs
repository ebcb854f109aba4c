//! SQL*Plus-backed database client
//!
//! Each connection is one long-lived `sqlplus -S -L /@<descriptor>` child
//! logged on with external authentication. Statements are written to its
//! stdin; a `PROMPT` sentinel marks where each response ends on stdout.

mod descriptor;
mod output;
mod stage;
mod version;

pub use descriptor::{classify, logon_argument, token_descriptor, DescriptorKind};
pub use output::{error_lines, parse_csv_line, parse_csv_output};
pub use stage::{reframe_pem, TokenStage};
pub use version::{client_release, parse_release, ClientRelease};

use crate::client::{ClientError, ConnectConfig, Connection, Connector, QueryResult};
use std::env;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Session settings sent right after logon
const SESSION_SETUP: &str = "SET MARKUP CSV ON QUOTE ON\n\
                             SET FEEDBACK OFF\n\
                             SET PAGESIZE 50000\n\
                             SET SQLBLANKLINES ON\n\
                             SET ECHO OFF\n";

/// Opens connections by starting SQL*Plus.
#[derive(Debug, Clone)]
pub struct SqlPlusConnector {
    binary: String,
    stage_root: PathBuf,
}

impl SqlPlusConnector {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            stage_root: env::temp_dir(),
        }
    }

    /// Directory under which per-connection token directories are created.
    pub fn with_stage_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.stage_root = root.into();
        self
    }
}

impl Connector for SqlPlusConnector {
    type Connection = SqlPlusConnection;

    async fn connect(&self, config: &ConnectConfig) -> Result<SqlPlusConnection, ClientError> {
        if !config.external_auth() {
            return Err(ClientError::ExternalAuthRequired);
        }

        let stage =
            TokenStage::create(&self.stage_root, config.access_token()).map_err(ClientError::Stage)?;

        let (descriptor, kind) = token_descriptor(config.connect_string(), stage.path());
        if kind == DescriptorKind::Alias {
            warn!(
                alias = %descriptor,
                "Net service alias cannot carry TOKEN_LOCATION; sqlnet.ora must set TOKEN_AUTH=OCI_TOKEN"
            );
        }
        debug!(?kind, descriptor = %descriptor, "Connecting");

        let mut child = Command::new(&self.binary)
            .arg("-S")
            .arg("-L")
            .arg(logon_argument(&descriptor, kind))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ClientError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => return Err(ClientError::Disconnected("client stdio not captured".to_string())),
        };

        let mut connection = SqlPlusConnection {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            stage,
            sentinel: format!("__token_auth_{}__", Uuid::new_v4().simple()),
        };

        match connection.handshake().await {
            Ok(()) => {
                info!(pid = ?connection.child.id(), "SQL*Plus session established");
                Ok(connection)
            }
            Err(e) => {
                connection.abort().await;
                Err(e)
            }
        }
    }
}

/// A logged-on SQL*Plus process.
pub struct SqlPlusConnection {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    stage: TokenStage,
    sentinel: String,
}

impl SqlPlusConnection {
    async fn handshake(&mut self) -> Result<(), ClientError> {
        let script = format!("{}PROMPT {}\n", SESSION_SETUP, self.sentinel);

        // A failed -L logon exits before reading stdin; its output explains why.
        let sent = self.send(&script).await;
        let output = match self.read_until_sentinel().await {
            Ok(output) => output,
            Err(ClientError::Disconnected(output)) => return Err(ClientError::Connect(output)),
            Err(e) => return Err(e),
        };
        sent?;

        let errors = error_lines(&output);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ClientError::Connect(errors.join("; ")))
        }
    }

    async fn send(&mut self, script: &str) -> Result<(), ClientError> {
        self.stdin.write_all(script.as_bytes()).await?;
        self.stdin.flush().await?;
        Ok(())
    }

    /// Collect stdout lines up to the sentinel prompt.
    async fn read_until_sentinel(&mut self) -> Result<Vec<String>, ClientError> {
        let mut output = Vec::new();
        loop {
            match self.stdout.next_line().await? {
                Some(line) if line.trim_end() == self.sentinel => return Ok(output),
                Some(line) => output.push(line),
                None => {
                    let errors = error_lines(&output);
                    let message = if errors.is_empty() {
                        output.join("\n").trim().to_string()
                    } else {
                        errors.join("; ")
                    };
                    return Err(ClientError::Disconnected(message));
                }
            }
        }
    }

    async fn abort(mut self) {
        if let Err(e) = self.child.kill().await {
            debug!(error = %e, "SQL*Plus already exited");
        }
        if let Err(e) = self.stage.remove() {
            warn!(error = %e, "Failed to remove staged token files");
        }
    }
}

impl Connection for SqlPlusConnection {
    /// Run one SQL statement; a trailing `;` is optional.
    async fn execute(&mut self, sql: &str) -> Result<QueryResult, ClientError> {
        let statement = sql.trim().trim_end_matches(';').trim_end();
        debug!(sql = %statement, "Executing");

        self.send(&format!("{}\n/\nPROMPT {}\n", statement, self.sentinel))
            .await?;
        let output = self.read_until_sentinel().await?;

        let errors = error_lines(&output);
        if !errors.is_empty() {
            return Err(ClientError::Statement(errors.join("; ")));
        }
        Ok(parse_csv_output(&output))
    }

    async fn close(mut self) -> Result<(), ClientError> {
        let exit = self.send("EXIT\n").await;
        let status = self.child.wait().await;
        let staged = self.stage.remove();

        exit?;
        let status = status?;
        staged.map_err(ClientError::Stage)?;

        if status.success() {
            Ok(())
        } else {
            Err(ClientError::Close(format!("sqlplus exited with {}", status)))
        }
    }
}
