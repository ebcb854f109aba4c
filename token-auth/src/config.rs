//! Token-auth configuration from environment variables

use anyhow::{Context, Result};
use common::ConfigExt;
use std::path::PathBuf;

/// Default location the OCI CLI writes `token` and `oci_db_key.pem` to
pub const DEFAULT_TOKEN_DIR: &str = ".oci/db-token";

/// Command that mints a fresh database token
pub const DEFAULT_TOKEN_COMMAND: &str = "oci iam db-token get";

/// Configuration for one token-authenticated run
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding `token` and `oci_db_key.pem`
    pub token_dir: PathBuf,
    /// Net service alias, Easy Connect string or full connect descriptor
    pub connect_string: String,
    pub token_command: String,
    pub skip_token_mint: bool,
    /// Abort on unreadable credential files instead of continuing with empty values
    pub strict_credentials: bool,
    pub sqlplus_binary: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let connect_string = String::env_required("ORACLEDB_CONNECTIONSTRING").context(
            "ORACLEDB_CONNECTIONSTRING is required.\n\
             Set it to the Oracle Net alias or connect descriptor of the database.\n\
             Example: adb.eu-frankfurt-1.oraclecloud.com:1522/abc_mydb_low.adb.oraclecloud.com",
        )?;

        Ok(Self {
            token_dir: PathBuf::env_path_or("ORACLEDB_ACCESS_TOKEN_LOC", DEFAULT_TOKEN_DIR),
            connect_string,
            token_command: String::env_or("ORACLEDB_TOKEN_COMMAND", DEFAULT_TOKEN_COMMAND),
            skip_token_mint: bool::env_bool("ORACLEDB_SKIP_TOKEN_MINT", false),
            strict_credentials: bool::env_bool("ORACLEDB_STRICT_CREDENTIALS", false),
            sqlplus_binary: String::env_or("ORACLEDB_SQLPLUS", "sqlplus"),
        })
    }
}
