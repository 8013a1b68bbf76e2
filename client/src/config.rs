//! Client configuration loaded via OrthoConfig.
//!
//! Settings layer defaults, then an optional configuration file, then
//! `DOCQ_`-prefixed environment variables — the embedding shell passes the
//! result to the outbound adapters.

use ortho_config::OrthoConfig;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_AUTH_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1/";
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// Configuration values for the hosted store and auth collaborators.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DOCQ")]
pub struct ClientSettings {
    /// Base URL of the hosted realtime store, e.g.
    /// `https://docq.example-db.app/`.
    pub store_base_url: String,
    /// Base URL of the hosted auth service; defaults to the public endpoint.
    pub auth_base_url: Option<String>,
    /// API key identifying this client to the auth service.
    pub api_key: String,
    /// Per-request timeout in seconds for both adapters.
    pub request_timeout_seconds: Option<u64>,
}

impl ClientSettings {
    /// Return the configured auth base URL, falling back to the default.
    #[must_use]
    pub fn auth_base_url(&self) -> &str {
        self.auth_base_url
            .as_deref()
            .unwrap_or(DEFAULT_AUTH_BASE_URL)
    }

    /// Return the configured request timeout, falling back to the default.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_seconds
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS),
        )
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> ClientSettings {
        ClientSettings::load_from_iter([OsString::from("client")]).expect("config should load")
    }

    #[rstest]
    fn defaults_fill_the_optional_values() {
        let _guard = lock_env([
            (
                "DOCQ_STORE_BASE_URL",
                Some("https://docq.example-db.app/".to_owned()),
            ),
            ("DOCQ_AUTH_BASE_URL", None::<String>),
            ("DOCQ_API_KEY", Some("test-key".to_owned())),
            ("DOCQ_REQUEST_TIMEOUT_SECONDS", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.store_base_url, "https://docq.example-db.app/");
        assert_eq!(settings.auth_base_url(), DEFAULT_AUTH_BASE_URL);
        assert_eq!(
            settings.request_timeout(),
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECONDS)
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            (
                "DOCQ_STORE_BASE_URL",
                Some("https://staging.example-db.app/".to_owned()),
            ),
            (
                "DOCQ_AUTH_BASE_URL",
                Some("https://auth.staging.example/v1/".to_owned()),
            ),
            ("DOCQ_API_KEY", Some("staging-key".to_owned())),
            ("DOCQ_REQUEST_TIMEOUT_SECONDS", Some("5".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.store_base_url, "https://staging.example-db.app/");
        assert_eq!(settings.auth_base_url(), "https://auth.staging.example/v1/");
        assert_eq!(settings.api_key, "staging-key");
        assert_eq!(settings.request_timeout(), Duration::from_secs(5));
    }
}
