use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the API lives and how long a single request may take
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// e.g. `http://localhost:3000`, without trailing slash
    pub base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// `CITYFIX_API_URL` and `CITYFIX_API_TIMEOUT` (seconds); unset or
    /// unparsable values keep the defaults
    pub fn from_env() -> Self {
        let mut config = match std::env::var("CITYFIX_API_URL") {
            Ok(url) => Self::new(url),
            Err(_) => Self::default(),
        };
        if let Some(secs) = std::env::var("CITYFIX_API_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.timeout = Duration::from_secs(secs);
        }
        config
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = ClientConfig::new("http://api.cityfix.test/").with_timeout(Duration::from_secs(5));
        assert_eq!(config.base_url, "http://api.cityfix.test");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }
}
