//! Connect descriptor rewriting for token authentication

use std::path::Path;

/// Shape of a connect string as the Oracle client understands it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorKind {
    /// `(DESCRIPTION=...)`
    Full,
    /// `[tcps://]host[:port]/service[?params]`
    EasyConnect,
    /// Net service name resolved through tnsnames.ora
    Alias,
}

pub fn classify(connect_string: &str) -> DescriptorKind {
    let trimmed = connect_string.trim();
    if trimmed.starts_with('(') {
        DescriptorKind::Full
    } else if trimmed.contains('/') || trimmed.contains(':') {
        DescriptorKind::EasyConnect
    } else {
        DescriptorKind::Alias
    }
}

/// Point `connect_string` at the token files in `token_dir`.
///
/// Aliases and strings that already name a TOKEN_LOCATION are returned
/// unchanged; for aliases the settings must come from sqlnet.ora. A
/// TOKEN_AUTH already present is kept and only the location is added.
pub fn token_descriptor(connect_string: &str, token_dir: &Path) -> (String, DescriptorKind) {
    let trimmed = connect_string.trim();
    let kind = classify(trimmed);
    let upper = trimmed.to_ascii_uppercase();

    if upper.contains("TOKEN_LOCATION") {
        return (trimmed.to_string(), kind);
    }
    let has_token_auth = upper.contains("TOKEN_AUTH");

    let location = token_dir.display();
    let rewritten = match kind {
        DescriptorKind::Full => {
            let mut params = String::new();
            if !has_token_auth {
                params.push_str("(TOKEN_AUTH=OCI_TOKEN)");
            }
            params.push_str(&format!("(TOKEN_LOCATION={})", location));

            // ASCII uppercasing keeps byte offsets aligned with `trimmed`.
            if let Some(insert_at) = security_clause_body(&upper) {
                format!("{}{}{}", &trimmed[..insert_at], params, &trimmed[insert_at..])
            } else if let Some(at) = trimmed.rfind(')') {
                format!("{}(SECURITY={}){}", &trimmed[..at], params, &trimmed[at..])
            } else {
                trimmed.to_string()
            }
        }
        DescriptorKind::EasyConnect => {
            let separator = if trimmed.contains('?') { '&' } else { '?' };
            let auth = if has_token_auth { "" } else { "token_auth=OCI_TOKEN&" };
            format!(
                "{}{}{}token_location={}",
                trimmed, separator, auth, location
            )
        }
        DescriptorKind::Alias => trimmed.to_string(),
    };

    (rewritten, kind)
}

/// Byte offset just past the `=` of a `(SECURITY = ...` clause.
///
/// Whitespace between the keyword and `=` is allowed, as in Oracle Net.
fn security_clause_body(upper: &str) -> Option<usize> {
    const KEYWORD: &str = "(SECURITY";

    upper.match_indices(KEYWORD).find_map(|(at, _)| {
        let after = at + KEYWORD.len();
        let rest = &upper[after..];
        let value = rest.trim_start();
        value
            .starts_with('=')
            .then(|| after + (rest.len() - value.len()) + 1)
    })
}

/// SQL*Plus logon argument using external authentication.
pub fn logon_argument(descriptor: &str, kind: DescriptorKind) -> String {
    match kind {
        DescriptorKind::EasyConnect if descriptor.contains('?') => format!("/@\"{}\"", descriptor),
        _ => format!("/@{}", descriptor),
    }
}
