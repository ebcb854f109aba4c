//! Database token minting via the OCI CLI
//!
//! `oci iam db-token get` writes `token` and `oci_db_key.pem` into its token
//! directory. Failure here is not fatal: files from an earlier run may still
//! be valid.

use common::run_command_line;
use tracing::{error, info};

/// What happened when the minting command ran.
#[derive(Debug, PartialEq, Eq)]
pub enum MintOutcome {
    Minted,
    Skipped,
    Failed(String),
}

/// Run the minting command once and log its output.
pub async fn mint_token(command_line: &str) -> MintOutcome {
    info!(command = %command_line, "Minting database token");

    match run_command_line(command_line).await {
        Ok(output) if output.success => {
            for line in output.stdout.lines() {
                info!("  {}", line);
            }
            MintOutcome::Minted
        }
        Ok(output) => {
            let mut reason = format!("exit {}: {}", output.exit_description(), output.stderr);
            if !output.stdout.is_empty() {
                reason.push_str(&format!(" (stdout: {})", output.stdout));
            }
            error!(
                command = %command_line,
                code = %output.exit_description(),
                stdout = %output.stdout,
                stderr = %output.stderr,
                "Token minting command failed, continuing with existing token files"
            );
            MintOutcome::Failed(reason)
        }
        Err(e) => {
            error!(
                command = %command_line,
                error = %format!("{:#}", e),
                "Could not run token minting command, continuing with existing token files"
            );
            MintOutcome::Failed(format!("{:#}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_cli_does_not_abort() {
        let outcome = mint_token("definitely-not-the-oci-cli iam db-token get").await;
        assert!(matches!(outcome, MintOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn test_empty_command_line_fails() {
        assert!(matches!(mint_token("").await, MintOutcome::Failed(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_failed() {
        let outcome = mint_token("false").await;
        assert_eq!(outcome, MintOutcome::Failed("exit 1: ".to_string()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failure_keeps_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("mint.sh");
        std::fs::write(&script, "echo 'Config file not found'\necho 'denied' >&2\nexit 2\n").unwrap();

        let outcome = mint_token(&format!("sh {}", script.display())).await;
        assert_eq!(
            outcome,
            MintOutcome::Failed("exit 2: denied (stdout: Config file not found)".to_string())
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_success_is_minted() {
        assert_eq!(mint_token("echo Private key written").await, MintOutcome::Minted);
    }
}
