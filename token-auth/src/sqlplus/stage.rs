//! Private on-disk copy of the token pair for the client to read
//!
//! The Oracle client reads `token` and `oci_db_key.pem` from a
//! TOKEN_LOCATION directory rather than taking them in memory.

use crate::credentials::{CredentialRecord, PEM_FOOTER, PEM_HEADER, PRIVATE_KEY_FILE, TOKEN_FILE};
use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::TempDir;
use tracing::debug;

const PEM_LINE_WIDTH: usize = 64;

/// Wrap a bare base64 key body back into PEM framing.
pub fn reframe_pem(body: &str) -> String {
    let chars: Vec<char> = body.chars().collect();
    let mut pem = String::with_capacity(body.len() + body.len() / PEM_LINE_WIDTH + 64);

    pem.push_str(PEM_HEADER);
    pem.push('\n');
    for line in chars.chunks(PEM_LINE_WIDTH) {
        pem.extend(line);
        pem.push('\n');
    }
    pem.push_str(PEM_FOOTER);
    pem.push('\n');
    pem
}

/// Directory holding one connection's token files. Removed on drop.
#[derive(Debug)]
pub struct TokenStage {
    dir: TempDir,
}

impl TokenStage {
    /// Create a fresh `<root>/token-auth-*` directory (0700) with both files (0600).
    pub fn create(root: &Path, credentials: &CredentialRecord) -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("token-auth-")
            .permissions(fs::Permissions::from_mode(0o700))
            .tempdir_in(root)?;

        let stage = Self { dir };
        stage.write_secret(TOKEN_FILE, &credentials.token)?;
        stage.write_secret(PRIVATE_KEY_FILE, &reframe_pem(&credentials.private_key))?;

        debug!(dir = %stage.path().display(), "Staged token files");
        Ok(stage)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Delete the directory, reporting any failure to do so.
    pub fn remove(self) -> io::Result<()> {
        self.dir.close()
    }

    fn write_secret(&self, name: &str, contents: &str) -> io::Result<()> {
        let path = self.path().join(name);
        fs::write(&path, contents)?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600))
    }
}
