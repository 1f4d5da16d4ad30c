use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

const DEFAULT_PORT: u16 = 4747;
const DEFAULT_STATIC_DIR: &str = ".static";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

const PORT_ENV: &str = "FIXTURE_SERVER_PORT";
const STATIC_DIR_ENV: &str = "FIXTURE_SERVER_STATIC_DIR";
const POLL_INTERVAL_ENV: &str = "FIXTURE_SERVER_POLL_INTERVAL_MS";

/// Knobs for the fixture server. Defaults match what the end-to-end suites
/// expect when they run against a local build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FixtureServerConfig {
    pub port: u16,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
    /// Period of every polling wait; a stop is observed within one interval.
    #[serde(with = "millis")]
    pub poll_interval: Duration,
}

impl Default for FixtureServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl FixtureServerConfig {
    /// Defaults overlaid with `FIXTURE_SERVER_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(PORT_ENV) {
            match raw.parse() {
                Ok(port) => config.port = port,
                Err(err) => {
                    warn!(target: "fixture_server", %raw, error = %err, "ignoring invalid {PORT_ENV}")
                }
            }
        }
        if let Some(raw) = lookup(STATIC_DIR_ENV) {
            config.static_dir = PathBuf::from(raw);
        }
        if let Some(raw) = lookup(POLL_INTERVAL_ENV) {
            match raw.parse() {
                Ok(millis) => config.poll_interval = Duration::from_millis(millis),
                Err(err) => warn!(
                    target: "fixture_server",
                    %raw,
                    error = %err,
                    "ignoring invalid {POLL_INTERVAL_ENV}"
                ),
            }
        }

        config
    }

    pub fn with_static_dir(mut self, static_dir: impl Into<PathBuf>) -> Self {
        self.static_dir = static_dir.into();
        self
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn env_overrides_defaults_and_ignores_garbage() {
        let env: HashMap<&str, &str> = HashMap::from([
            (PORT_ENV, "5000"),
            (STATIC_DIR_ENV, "/tmp/fixtures"),
            (POLL_INTERVAL_ENV, "soon"),
        ]);
        let config = FixtureServerConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.port, 5000);
        assert_eq!(config.static_dir, PathBuf::from("/tmp/fixtures"));
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
    }

    #[test]
    fn poll_interval_serializes_as_millis() {
        let config: FixtureServerConfig =
            serde_json::from_str(r#"{ "poll_interval": 10 }"#).expect("config parses");
        assert_eq!(config.poll_interval, Duration::from_millis(10));
        assert_eq!(config.port, DEFAULT_PORT);

        let rendered = serde_json::to_value(&config).expect("config renders");
        assert_eq!(rendered["poll_interval"], 10);
    }
}
