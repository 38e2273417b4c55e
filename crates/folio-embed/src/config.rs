//! Embed subsystem tunables.
//!
//! Uses `serde(default)` so partial configs work; missing fields fall back
//! to the defaults below.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    /// Seconds to wait for the host to finish initializing a view before
    /// demoting the attempt to a timeout error.
    pub init_timeout_secs: u64,
    /// Height of the fixed status bar, excluded from the visible viewport.
    pub status_bar_inset: f64,
    /// Frames to wait before the post-mount re-measure.
    pub deferred_recheck_frames: u8,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            init_timeout_secs: 10,
            status_bar_inset: 36.0,
            deferred_recheck_frames: 2,
        }
    }
}

impl EmbedConfig {
    pub fn init_timeout(&self) -> Duration {
        Duration::from_secs(self.init_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EmbedConfig::default();
        assert_eq!(config.init_timeout(), Duration::from_secs(10));
        assert_eq!(config.status_bar_inset, 36.0);
        assert_eq!(config.deferred_recheck_frames, 2);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: EmbedConfig = serde_json::from_str(r#"{"init_timeout_secs": 5}"#).unwrap();
        assert_eq!(config.init_timeout(), Duration::from_secs(5));
        assert_eq!(config.status_bar_inset, 36.0);
        assert_eq!(config.deferred_recheck_frames, 2);
    }
}
