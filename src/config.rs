/// Application-level constants
pub const APP_NAME: &str = "Hansu Hub";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable overriding the Hub API base URL.
pub const API_BASE_URL_ENV: &str = "HANSU_API_BASE_URL";

/// Default Hub API base URL (local backend).
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// HTTP timeout for Hub API requests, in seconds.
pub const API_TIMEOUT_SECS: u64 = 15;

/// Progress tick interval for module runs, in milliseconds.
pub const TICK_INTERVAL_MS: u64 = 150;

/// Progress added per tick. Must divide 100 so runs land exactly on full.
pub const TICK_STEP: u8 = 5;

/// Default log filter when RUST_LOG is not set.
pub fn default_log_filter() -> &'static str {
    "info,hansu_hub_lib=debug"
}

/// Resolve the Hub API base URL: env override, falling back to the
/// local backend. Trailing slashes are trimmed so path joins stay
/// predictable.
pub fn api_base_url() -> String {
    std::env::var(API_BASE_URL_ENV)
        .ok()
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_name_is_hansu_hub() {
        assert_eq!(APP_NAME, "Hansu Hub");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "2.4.0");
    }

    #[test]
    fn tick_step_divides_full_progress() {
        assert_eq!(100 % u32::from(TICK_STEP), 0);
    }

    #[test]
    fn default_base_url_is_local() {
        assert_eq!(DEFAULT_API_BASE_URL, "http://localhost:8000/api");
        assert!(!DEFAULT_API_BASE_URL.ends_with('/'));
    }

    #[test]
    fn base_url_env_override_and_fallback() {
        std::env::set_var(API_BASE_URL_ENV, "https://hub.example.com/api/");
        assert_eq!(api_base_url(), "https://hub.example.com/api");

        std::env::set_var(API_BASE_URL_ENV, "   ");
        assert_eq!(api_base_url(), DEFAULT_API_BASE_URL);

        std::env::remove_var(API_BASE_URL_ENV);
        assert_eq!(api_base_url(), DEFAULT_API_BASE_URL);
    }

    #[test]
    fn default_log_filter_mentions_crate() {
        assert!(default_log_filter().contains("hansu_hub_lib"));
    }
}
