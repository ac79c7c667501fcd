use axum::http::HeaderMap;
use sha2::{Digest, Sha256};

pub const DEFAULT_IDENTITY_HEADER: &str = "x-authenticated-user";

// Authenticated caller, as vouched for by the auth layer in front of us
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    uid: String,
}

impl CallerIdentity {
    pub fn uid(&self) -> &str {
        &self.uid
    }

    // Short hash of the uid so logs never carry the raw identifier
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.uid.as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        digest[..12].to_string()
    }
}

// missing, blank or non-utf8 values are unauthenticated
pub fn resolve_identity(headers: &HeaderMap, header: &str) -> Option<CallerIdentity> {
    let uid = headers.get(header)?.to_str().ok()?.trim();
    if uid.is_empty() {
        return None;
    }
    Some(CallerIdentity {
        uid: uid.to_string(),
    })
}
