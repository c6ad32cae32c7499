use rand::Rng;

/// Expected database schema version
/// Databases carrying any other version are not read from or written to
pub const EXPECTED_DB_VERSION: &str = "1";

/// Videos above this many bytes are persisted metadata-only (50 MiB)
pub const DEFAULT_PAYLOAD_THRESHOLD_BYTES: u64 = 50 * 1024 * 1024;

/// Retention window for the age-based sweep (in hours)
pub const DEFAULT_RETENTION_HOURS: i64 = 24;

/// Upper bound on opening the object store before it degrades to a no-op
pub const DEFAULT_OPEN_TIMEOUT_SECS: u64 = 5;

/// Ephemeral register key holding the current session tag
pub const SESSION_TAG_KEY: &str = "session_tag";

/// Ephemeral register key for the transient "closing" flag
pub const CLOSING_FLAG_KEY: &str = "closing";

/// Durable register key for the pending-purge intent (value is the session tag)
pub const PENDING_PURGE_KEY: &str = "pending_purge";

/// Prefix shared by every session tag
pub const SESSION_TAG_PREFIX: &str = "session_";

/// Length of the random suffix of a session tag
pub const SESSION_TAG_SUFFIX_LEN: usize = 12;

/// Generate the random alphanumeric suffix of a session tag
pub fn generate_session_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(SESSION_TAG_SUFFIX_LEN)
        .map(char::from)
        .collect::<String>()
}
