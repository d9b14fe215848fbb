use crate::Error;
use serde::{Deserialize, Serialize};
use slog::{debug, warn, Logger};
use std::num::NonZeroUsize;

pub const DEFAULT_PAYLOAD_CACHE_SIZE: usize = 10;

/// Prefix of the additional config entry which fixes the number of blobs per payload.
const BLOBS_CONFIG_PREFIX: &str = "blobs=";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Emulate the terminal proof-of-work block handoff instead of answering from a registry.
    pub transition_emulation: bool,
    /// The number of payload build requests remembered between `forkchoiceUpdated` and
    /// `getPayload`.
    pub payload_cache_size: usize,
    /// Generate exactly this many blobs per payload rather than a random number.
    pub blobs_to_generate: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transition_emulation: false,
            payload_cache_size: DEFAULT_PAYLOAD_CACHE_SIZE,
            blobs_to_generate: None,
        }
    }
}

impl Config {
    pub fn payload_cache_size(&self) -> Result<NonZeroUsize, Error> {
        NonZeroUsize::new(self.payload_cache_size)
            .ok_or_else(|| Error::InvalidConfig("payload_cache_size must be non-zero".into()))
    }

    /// Applies free-form `key=value` entries supplied alongside the configuration.
    ///
    /// Only `blobs=<n>` is understood; unknown entries are ignored with a warning.
    pub fn apply_additional_configs(
        &mut self,
        additional_configs: &[String],
        log: &Logger,
    ) -> Result<(), Error> {
        for config in additional_configs {
            match config.strip_prefix(BLOBS_CONFIG_PREFIX) {
                Some(count) => {
                    let count = count.trim().parse::<usize>().map_err(|e| {
                        Error::InvalidConfig(format!("invalid blob count {:?}: {}", config, e))
                    })?;
                    debug!(log, "Fixed blob count configured"; "blobs" => count);
                    self.blobs_to_generate = Some(count);
                }
                None => warn!(log, "Ignoring unknown additional config"; "config" => config),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logging::test_logger;

    #[test]
    fn blobs_entry_fixes_blob_count() {
        let mut config = Config::default();
        config
            .apply_additional_configs(&["blobs=3".to_string()], &test_logger())
            .unwrap();
        assert_eq!(config.blobs_to_generate, Some(3));
    }

    #[test]
    fn unknown_entries_are_ignored() {
        let mut config = Config::default();
        config
            .apply_additional_configs(&["foo=bar".to_string()], &test_logger())
            .unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn malformed_blob_count_is_rejected() {
        let mut config = Config::default();
        let result = config.apply_additional_configs(&["blobs=many".to_string()], &test_logger());
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
        assert_eq!(config.blobs_to_generate, None);
    }

    #[test]
    fn zero_cache_size_is_invalid() {
        let config = Config {
            payload_cache_size: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.payload_cache_size(),
            Err(Error::InvalidConfig(_))
        ));
        assert_eq!(
            Config::default().payload_cache_size().unwrap().get(),
            DEFAULT_PAYLOAD_CACHE_SIZE
        );
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"transition_emulation": true}"#).unwrap();
        assert!(config.transition_emulation);
        assert_eq!(config.payload_cache_size, DEFAULT_PAYLOAD_CACHE_SIZE);
    }
}
