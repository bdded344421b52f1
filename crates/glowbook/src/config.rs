use std::{env, time::Duration};

const DEFAULT_REMINDER_LEAD_MINUTES: i64 = 60;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Supabase project URL (default: "http://localhost:54321")
    pub supabase_url: String,
    /// Supabase anonymous API key (default: empty)
    pub supabase_anon_key: String,
    /// Access token of the signed-in user, if any
    pub access_token: Option<String>,
    /// Application prefix for keyed store namespaces (default: "glowbook")
    pub namespace: String,
    /// Cache TTL in seconds (default: 300)
    pub cache_ttl_seconds: u64,
    /// Maximum number of entries in the memory medium (default: 10,000)
    pub cache_max_entries: usize,
    /// Path to SQLite database file (default: "glowbook.db")
    pub sqlite_path: String,
    /// How long before an appointment its reminder fires (default: 60)
    pub reminder_lead_minutes: i64,
    /// HTTP request timeout in seconds (default: 30)
    pub http_timeout_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `GLOWBOOK_SUPABASE_URL` - Supabase project URL (default: "http://localhost:54321")
    /// - `GLOWBOOK_SUPABASE_ANON_KEY` - Supabase anon key (default: "")
    /// - `GLOWBOOK_ACCESS_TOKEN` - User access token (optional)
    /// - `GLOWBOOK_NAMESPACE` - Keyed store namespace prefix (default: "glowbook")
    /// - `CACHE_TTL_SECONDS` - Cache TTL in seconds (default: 300)
    /// - `CACHE_MAX_ENTRIES` - Memory medium capacity (default: 10,000)
    /// - `SQLITE_PATH` - SQLite database path (default: "glowbook.db")
    /// - `REMINDER_LEAD_MINUTES` - Reminder lead time (default: 60)
    /// - `HTTP_TIMEOUT_SECONDS` - HTTP timeout (default: 30)
    pub fn from_env() -> Self {
        Self {
            supabase_url: env::var("GLOWBOOK_SUPABASE_URL")
                .unwrap_or_else(|_| "http://localhost:54321".to_string()),
            supabase_anon_key: env::var("GLOWBOOK_SUPABASE_ANON_KEY").unwrap_or_default(),
            access_token: env::var("GLOWBOOK_ACCESS_TOKEN")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            namespace: env::var("GLOWBOOK_NAMESPACE").unwrap_or_else(|_| "glowbook".to_string()),
            cache_ttl_seconds: env::var("CACHE_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            cache_max_entries: env::var("CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "glowbook.db".to_string()),
            reminder_lead_minutes: env::var("REMINDER_LEAD_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_REMINDER_LEAD_MINUTES),
            http_timeout_seconds: env::var("HTTP_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }

    /// Get cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    /// Get HTTP timeout as a Duration.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }

    /// Get reminder lead time. Out-of-range values fall back to 60 minutes.
    pub fn reminder_lead(&self) -> chrono::Duration {
        chrono::Duration::try_minutes(self.reminder_lead_minutes)
            .unwrap_or_else(|| chrono::Duration::minutes(DEFAULT_REMINDER_LEAD_MINUTES))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
