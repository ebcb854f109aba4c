//! Client release detection
//!
//! Token-based authentication needs Oracle Client 19.14+ or 21.5+.

use anyhow::{anyhow, Result};
use common::command::run_checked;

/// Release of the installed client, e.g. `(19, 14)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClientRelease {
    pub major: u32,
    pub minor: u32,
}

impl ClientRelease {
    pub fn supports_token_auth(&self) -> bool {
        match self.major {
            19 => self.minor >= 14,
            21 => self.minor >= 5,
            major => major > 21,
        }
    }
}

/// Parse `sqlplus -V` output.
///
/// Prefers the `Version 19.14.0.0.0` line, falling back to
/// `Release 19.0.0.0.0` which carries no update number.
pub fn parse_release(output: &str) -> Option<ClientRelease> {
    let find = |keyword: &str| {
        output.split_whitespace().skip_while(|w| *w != keyword).nth(1).and_then(|v| {
            let mut parts = v.split('.');
            let major = parts.next()?.parse().ok()?;
            let minor = parts.next()?.parse().ok()?;
            Some(ClientRelease { major, minor })
        })
    };
    find("Version").or_else(|| find("Release"))
}

/// Ask the client binary for its release.
pub async fn client_release(binary: &str) -> Result<ClientRelease> {
    let output = run_checked(binary, &["-V"]).await?;
    parse_release(&output).ok_or_else(|| anyhow!("Unrecognized {} -V output: {}", binary, output))
}
