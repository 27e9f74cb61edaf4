//! Object key normalization and role session naming.

use jiff::Timestamp;
use uuid::Uuid;

/// Normalizes an object key and places it under `prefix`.
///
/// Leading slashes are dropped and runs of slashes collapse into one. When a
/// non-empty prefix is configured and the key is not already under it, the
/// key is joined to the prefix. Applying the function to its own output
/// returns the output unchanged.
pub fn normalize_key(prefix: Option<&str>, name: &str) -> String {
    let key = collapse_slashes(name);
    let prefix = prefix.map(|p| collapse_slashes(p).trim_end_matches('/').to_string());

    match prefix.as_deref() {
        None | Some("") => key,
        Some(prefix) if key == prefix || key.starts_with(&format!("{prefix}/")) => key,
        Some(prefix) if key.is_empty() => format!("{prefix}/"),
        Some(prefix) => format!("{prefix}/{key}"),
    }
}

fn collapse_slashes(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.trim_start_matches('/').chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    out
}

/// Generates a unique, human-traceable role session name.
///
/// The name is `{prefix}-{unix millis}-{8 hex chars}` and stays within the
/// 64 characters and `[\w+=,.@-]` alphabet that STS providers accept.
pub fn new_role_session_name(prefix: &str) -> String {
    let millis = Timestamp::now().as_millisecond();
    let suffix = Uuid::new_v4().simple().to_string();
    let name = format!("{prefix}-{millis}-{}", &suffix[..8]);
    name.chars().take(64).collect()
}
