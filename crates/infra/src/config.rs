//! Service configuration.

use std::time::Duration;

/// Environment variable holding the lock acquisition timeout in milliseconds.
pub const LOCK_TIMEOUT_ENV: &str = "GRANARY_LOCK_TIMEOUT_MS";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceConfig {
    /// How long `create_*` waits for a busy warehouse. `None` waits forever.
    pub lock_timeout: Option<Duration>,
}

impl ServiceConfig {
    pub fn with_lock_timeout(timeout: Duration) -> Self {
        Self {
            lock_timeout: Some(timeout),
        }
    }

    /// Read configuration from the process environment.
    ///
    /// Unset means no timeout. An unparsable value is logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lock_timeout = lookup(LOCK_TIMEOUT_ENV).and_then(|raw| match raw.trim().parse::<u64>() {
            Ok(ms) => Some(Duration::from_millis(ms)),
            Err(_) => {
                tracing::warn!(
                    value = %raw,
                    "{LOCK_TIMEOUT_ENV} is not a number of milliseconds; waiting without timeout"
                );
                None
            }
        });

        Self { lock_timeout }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_means_no_timeout() {
        let config = ServiceConfig::from_lookup(|_| None);
        assert_eq!(config, ServiceConfig::default());
    }

    #[test]
    fn parses_milliseconds() {
        let config = ServiceConfig::from_lookup(|_| Some(" 250 ".to_string()));
        assert_eq!(config.lock_timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn garbage_falls_back_to_no_timeout() {
        let config = ServiceConfig::from_lookup(|_| Some("soon".to_string()));
        assert_eq!(config.lock_timeout, None);
    }
}
