use chrono::{DateTime, Utc};

/// Length of a session token in raw bytes before hex encoding.
const TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Session {
    pub(crate) token: String,
    pub(crate) user_id: i64,
    pub(crate) expires_at: DateTime<Utc>,
}

impl Session {
    /// A session stays valid up to and including its `expires_at` instant.
    pub(crate) fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Generates an opaque 64-char hex token from the thread-local CSPRNG.
pub(crate) fn generate_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
