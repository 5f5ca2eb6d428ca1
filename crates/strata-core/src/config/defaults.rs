// Single source of truth for all default values.

// --- Storage ---
pub const DEFAULT_DB_FILENAME: &str = "strata.db";
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5_000;
pub const DEFAULT_READ_POOL_SIZE: usize = 4;

// --- Repository ---
pub const DEFAULT_REPOSITORY_URL: &str = "http://localhost:8080/rest";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

// --- Index ---
pub const DEFAULT_INDEX_URL: &str = "http://localhost:9200";

// --- Engine ---
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;
pub const DEFAULT_ERROR_BACKOFF_SECS: u64 = 10;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;
