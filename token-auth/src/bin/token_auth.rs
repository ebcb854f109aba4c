//! Standalone connection using token-based authentication
//!
//! Mints a database token with the OCI CLI, then connects to an Oracle
//! Autonomous Database with the token and private key instead of a
//! password and runs one query.
//!
//! Configuration is read first: without `ORACLEDB_CONNECTIONSTRING` the
//! program exits before minting a token or reading the token files.

use anyhow::Result;
use common::init_logging;
use std::time::Instant;
use token_auth::mint::{mint_token, MintOutcome};
use token_auth::sqlplus::{client_release, SqlPlusConnector};
use token_auth::{Config, CredentialLoader, SessionRunner, DEFAULT_QUERY};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = init_logging("token-auth");

    let start = Instant::now();
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Invalid configuration");
            std::process::exit(1);
        }
    };

    info!(
        token_dir = %config.token_dir.display(),
        connect_string = %config.connect_string,
        "=== Token-based authentication ==="
    );

    let minted = if config.skip_token_mint {
        info!("ORACLEDB_SKIP_TOKEN_MINT=true - using existing token files");
        MintOutcome::Skipped
    } else {
        mint_token(&config.token_command).await
    };

    let loader = CredentialLoader::new(&config.token_dir);
    let credentials = if config.strict_credentials {
        match loader.load() {
            Ok(credentials) => credentials,
            Err(e) => {
                error!(
                    error = %format!("{:#}", anyhow::Error::new(e)),
                    "Failed to load credentials"
                );
                std::process::exit(1);
            }
        }
    } else {
        loader.load_lenient()
    };

    if !credentials.is_complete() {
        warn!(?minted, "Token or private key is empty; the database will reject the logon");
    }

    match client_release(&config.sqlplus_binary).await {
        Ok(release) if release.supports_token_auth() => {
            info!(major = release.major, minor = release.minor, "Oracle client release");
        }
        Ok(release) => warn!(
            major = release.major,
            minor = release.minor,
            "Token-based authentication needs Oracle Client 19.14+ or 21.5+"
        ),
        Err(e) => warn!(error = %format!("{:#}", e), "Could not determine Oracle client release"),
    }

    let connector = SqlPlusConnector::new(&config.sqlplus_binary);
    let report = SessionRunner::new(connector, &config.connect_string)
        .run(credentials, DEFAULT_QUERY)
        .await;

    let duration_ms = start.elapsed().as_millis() as u64;
    if report.succeeded() {
        info!(duration_ms, "Done");
        Ok(())
    } else {
        error!(duration_ms, outcome = ?report.outcome, "Session did not succeed");
        std::process::exit(1);
    }
}
