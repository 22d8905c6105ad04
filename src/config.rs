//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::*;

/// Monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Averaging window for `volume()`, in milliseconds
    pub sample_window_ms: u32,

    /// Assumed spectrum callback cadence, readings per second.
    ///
    /// Hardcoded estimate of the backend's callback rate; if the real
    /// cadence diverges, the window covers more or less wall time than
    /// `sample_window_ms`.
    pub assumed_readings_per_sec: u32,

    /// Offset added to every reading at ingest time, in dB
    pub offset_db: f32,

    /// Analyser smoothing time constant, `0.0..1.0`
    pub smoothing: f32,

    /// Analyser FFT size; must be a power of two, produces half as many
    /// magnitude bins
    pub fft_size: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_window_ms: DEFAULT_SAMPLE_WINDOW_MS,
            assumed_readings_per_sec: DEFAULT_READINGS_PER_SEC,
            offset_db: DEFAULT_OFFSET_DB,
            smoothing: DEFAULT_SMOOTHING,
            fft_size: DEFAULT_FFT_SIZE,
        }
    }
}

impl MonitorConfig {
    /// Number of readings that feed one `volume()` average
    pub fn window_capacity(&self) -> usize {
        (self.sample_window_ms as u64 * self.assumed_readings_per_sec as u64 / 1000) as usize
    }

    /// Validate analyser parameters
    pub fn validate(&self) -> crate::Result<()> {
        if self.fft_size < 2 || !self.fft_size.is_power_of_two() {
            return Err(crate::Error::Config(format!(
                "fft_size must be a power of two >= 2, got {}",
                self.fft_size
            )));
        }
        if !(0.0..1.0).contains(&self.smoothing) {
            return Err(crate::Error::Config(format!(
                "smoothing must be in [0, 1), got {}",
                self.smoothing
            )));
        }
        Ok(())
    }

    /// Load configuration from file
    pub fn load(path: &PathBuf) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &PathBuf) -> crate::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "audio-streamer", "decibel-monitor")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_window_capacity() {
        // 2000 ms at 25 readings/s
        let config = MonitorConfig::default();
        assert_eq!(config.window_capacity(), 50);
    }

    #[test]
    fn test_window_capacity_rounds_down() {
        let config = MonitorConfig {
            sample_window_ms: 1500,
            assumed_readings_per_sec: 3,
            ..Default::default()
        };
        // 1500 * 3 / 1000 = 4.5, integer arithmetic keeps 4
        assert_eq!(config.window_capacity(), 4);
    }

    #[test]
    fn test_validate_rejects_bad_fft_size() {
        let config = MonitorConfig {
            fft_size: 300,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_smoothing() {
        let config = MonitorConfig {
            smoothing: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
