use std::env;

use crate::services::aggregator::DEFAULT_EDITOR_SCRIPT;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Optimization command
    pub editor_script: String,

    // Input limits
    pub max_m3u_size_mb: u64,
    pub max_epg_size_mb: u64,

    // Output
    pub output_dir: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            editor_script: env::var("EDITOR_SCRIPT")
                .unwrap_or_else(|_| DEFAULT_EDITOR_SCRIPT.to_string()),

            max_m3u_size_mb: env::var("MAX_M3U_SIZE_MB")
                .unwrap_or_else(|_| "500".to_string())
                .parse()
                .unwrap_or(500),

            max_epg_size_mb: env::var("MAX_EPG_SIZE_MB")
                .unwrap_or_else(|_| "1024".to_string())
                .parse()
                .unwrap_or(1024),

            output_dir: env::var("ANALYSIS_OUTPUT_DIR").unwrap_or_else(|_| ".".to_string()),
        }
    }

    pub fn max_m3u_bytes(&self) -> u64 {
        self.max_m3u_size_mb.saturating_mul(1024 * 1024)
    }

    pub fn max_epg_bytes(&self) -> u64 {
        self.max_epg_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_m3u_size_mb: u64, max_epg_size_mb: u64) -> Config {
        Config {
            editor_script: DEFAULT_EDITOR_SCRIPT.to_string(),
            max_m3u_size_mb,
            max_epg_size_mb,
            output_dir: ".".to_string(),
        }
    }

    #[test]
    fn test_size_limits_in_bytes() {
        let config = config(500, 1024);
        assert_eq!(config.max_m3u_bytes(), 500 * 1024 * 1024);
        assert_eq!(config.max_epg_bytes(), 1024 * 1024 * 1024);
    }

    #[test]
    fn test_huge_size_limits_saturate() {
        let config = config(u64::MAX, u64::MAX / 2);
        assert_eq!(config.max_m3u_bytes(), u64::MAX);
        assert_eq!(config.max_epg_bytes(), u64::MAX);
    }
}
