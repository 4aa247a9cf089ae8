//! Transport configuration, populated from environment variables.

use std::time::Duration;

/// Settings for [`HttpTransport`](crate::HttpTransport).
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `DOCJSON_TIMEOUT_SECS` | `30` | Whole-request timeout |
/// | `DOCJSON_USER_AGENT` | `docjson/<version>` | `User-Agent` header |
/// | `DOCJSON_MAX_REDIRECTS` | `10` | Redirects followed before giving up |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub max_redirects: usize,
    /// Sent as `Accept` on every request.
    pub accept: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("docjson/{}", docjson::VERSION),
            max_redirects: 10,
            accept: "application/json".into(),
        }
    }
}

impl HttpConfig {
    /// Populate config from environment variables, applying defaults where
    /// absent or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let timeout = lookup("DOCJSON_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        let max_redirects = lookup("DOCJSON_MAX_REDIRECTS")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(defaults.max_redirects);

        Self {
            timeout,
            user_agent: lookup("DOCJSON_USER_AGENT").unwrap_or(defaults.user_agent),
            max_redirects,
            accept: defaults.accept,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_when_unset() {
        let config = HttpConfig::from_lookup(|_| None);
        assert_eq!(config, HttpConfig::default());
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("docjson/"));
    }

    #[test]
    fn reads_overrides() {
        let env: HashMap<&str, &str> = [
            ("DOCJSON_TIMEOUT_SECS", "5"),
            ("DOCJSON_USER_AGENT", "probe/1.0"),
            ("DOCJSON_MAX_REDIRECTS", "0"),
        ]
        .into_iter()
        .collect();
        let config = HttpConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "probe/1.0");
        assert_eq!(config.max_redirects, 0);
    }

    #[test]
    fn garbage_falls_back_to_default() {
        let config = HttpConfig::from_lookup(|k| {
            (k == "DOCJSON_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert_eq!(config.timeout, Duration::from_secs(30));
    }
}
