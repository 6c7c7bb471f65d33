//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 5000;

// =============================================================================
// DATABASE DEFAULTS
// =============================================================================

/// Maximum connections in the pool (kept small; each request holds a
/// connection only for the duration of a single query)
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 2;

/// Initial backoff for database connection retries at startup
pub const DATABASE_RETRY_BASE_MS: u64 = 500;

/// Number of connection attempts before falling back to lazy connect
pub const DATABASE_RETRY_ATTEMPTS: u32 = 4;

// =============================================================================
// AUTHENTICATION DEFAULTS
// =============================================================================

/// JWT token expiry in days
pub const JWT_EXPIRY_DAYS: i64 = 7;

/// Default bcrypt cost factor
pub const DEFAULT_BCRYPT_ROUNDS: u32 = 12;

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LENGTH: usize = 6;

// =============================================================================
// EXECUTION DEFAULTS
// =============================================================================

/// Default wall-clock limit for one run, in seconds
pub const DEFAULT_RUN_TIMEOUT_SECONDS: u64 = 15;

/// Default container memory limit (docker-style size string)
pub const DEFAULT_MEMORY_LIMIT: &str = "512m";

/// Wall-clock limit for the compile phase, in seconds
pub const COMPILE_TIMEOUT_SECONDS: u64 = 15;

/// Maximum concurrent PIDs inside a sandbox
pub const SANDBOX_PIDS_LIMIT: i64 = 100;

/// Working directory inside the sandbox
pub const SANDBOX_WORKDIR: &str = "/app";

/// Path the engine injects stdin at inside the sandbox
pub const SANDBOX_STDIN_PATH: &str = "/app/stdin.txt";

/// Captured stdout/stderr are cut off at this many characters
pub const OUTPUT_TRUNCATE_CHARS: usize = 10_000;

/// Marker appended to truncated sandbox output
pub const OUTPUT_TRUNCATED_MARKER: &str = "... [Truncated]";

// =============================================================================
// SUPPORTED LANGUAGES
// =============================================================================

/// Language identifiers
pub mod languages {
    pub const JAVA: &str = "java";
    pub const PYTHON: &str = "python";
    pub const C: &str = "c";
    pub const CPP: &str = "cpp";
    pub const JAVASCRIPT: &str = "javascript";
    pub const CSHARP: &str = "csharp";

    /// All supported language identifiers
    pub const ALL: &[&str] = &[JAVA, PYTHON, C, CPP, JAVASCRIPT, CSHARP];
}

// =============================================================================
// SUBMISSION VALIDATION
// =============================================================================

/// Maximum number of files in a submission
pub const MAX_FILES: usize = 10;

/// Maximum size of a single file in bytes
pub const DEFAULT_MAX_FILE_SIZE: usize = 50_000;

/// Maximum total size of all files in bytes
pub const DEFAULT_MAX_TOTAL_FILES_SIZE: usize = 200_000;

/// Maximum stdin length in characters (longer input is truncated)
pub const MAX_INPUT_LENGTH: usize = 10_000;

/// Maximum source length in characters (longer source is truncated)
pub const MAX_CODE_LENGTH: usize = 50_000;

/// Filenames must match this pattern
pub const VALID_FILENAME_PATTERN: &str = r"^[a-zA-Z0-9_.-]+$";

/// Filenames matching any of these are rejected outright
pub const FORBIDDEN_FILENAME_PATTERNS: &[&str] = &[
    r"\.\.",
    r"^/",
    r"^~",
    r"\.pyc$",
    r"\.class$",
    r"\.exe$",
    r"\.dll$",
    r"\.so$",
    r"\.sh$",
];

// =============================================================================
// DEPLOYMENT VALIDATION
// =============================================================================

/// Default minimum security score for the deployment gate
pub const DEFAULT_MIN_SECURITY_SCORE: u32 = 80;

/// Probability of a simulated critical dependency failure
pub const DEPLOYMENT_CRITICAL_FAILURE_RATE: f64 = 0.05;

// =============================================================================
// RATE LIMITING
// =============================================================================

/// Per-endpoint quotas (requests per window)
pub mod rate_limits {
    /// Registration - max requests per window
    pub const REGISTER_MAX_REQUESTS: i64 = 10;
    /// Login - max requests per window
    pub const LOGIN_MAX_REQUESTS: i64 = 20;
    /// Ephemeral run - max requests per window
    pub const RUN_MAX_REQUESTS: i64 = 50;
    /// Graded submit - max requests per window
    pub const SUBMIT_MAX_REQUESTS: i64 = 30;
    /// Everything else - max requests per window
    pub const GENERAL_MAX_REQUESTS: i64 = 100;

    /// All quotas share an hourly window
    pub const WINDOW_SECS: i64 = 3600;
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for paginated results
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum page size for paginated results
pub const MAX_PAGE_SIZE: i64 = 50;
