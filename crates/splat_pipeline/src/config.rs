//! # Pipeline Configuration
//!
//! Loaded once at startup from TOML. Every field has a default, so a config
//! file only needs the values it changes:
//!
//! ```toml
//! upload_batch = 20000
//!
//! [simulation]
//! gravity = 9.8
//!
//! [sort]
//! strategy = "exact"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use splat_core::constants::{MAX_DELTA_TIME, MAX_SELECTED, RECORDS_PER_UPLOAD};
use splat_sim::{PlayerParams, SimulationParams, SortConfig};

use crate::error::{PipelineError, PipelineResult};

/// Everything tunable about the pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Collision and integration tunables.
    pub simulation: SimulationParams,
    /// Render ordering.
    pub sort: SortConfig,
    /// Player controller.
    pub player: PlayerParams,
    /// Records handed to the renderer per frame.
    pub upload_batch: usize,
    /// Capacity of the selection buffer.
    pub max_selected: usize,
    /// Largest simulate step in seconds.
    pub max_delta_time: f32,
    /// Capacity of each worker channel.
    pub channel_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationParams::default(),
            sort: SortConfig::default(),
            player: PlayerParams::default(),
            upload_batch: RECORDS_PER_UPLOAD,
            max_selected: MAX_SELECTED,
            max_delta_time: MAX_DELTA_TIME,
            channel_capacity: 4,
        }
    }
}

impl PipelineConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] on a parse error or an
    /// out-of-range value.
    pub fn from_toml_str(text: &str) -> PipelineResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| PipelineError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Io`] if the file cannot be read, otherwise
    /// as [`Self::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> PipelineResult<()> {
        self.simulation
            .validate()
            .map_err(|e| PipelineError::InvalidConfig(format!("simulation: {e}")))?;

        if self.sort.buckets < 2 {
            return Err(invalid("sort.buckets must be at least 2"));
        }
        if !(self.sort.max_range.is_finite() && self.sort.max_range > 0.0) {
            return Err(invalid("sort.max_range must be positive and finite"));
        }
        if !(0.0..=1.0).contains(&self.player.blend) {
            return Err(invalid("player.blend must be within [0, 1]"));
        }
        if !(self.player.eye_offset.is_finite() && self.player.gravity.is_finite()) {
            return Err(invalid("player values must be finite"));
        }
        if self.upload_batch == 0 {
            return Err(invalid("upload_batch must be positive"));
        }
        if !(self.max_delta_time.is_finite() && self.max_delta_time > 0.0) {
            return Err(invalid("max_delta_time must be positive"));
        }
        if self.channel_capacity == 0 {
            return Err(invalid("channel_capacity must be positive"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> PipelineError {
    PipelineError::InvalidConfig(message.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use splat_sim::SortStrategy;

    #[test]
    fn test_default_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(PipelineConfig::from_toml_str("").unwrap(), PipelineConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = PipelineConfig::from_toml_str(
            r#"
            upload_batch = 20000

            [simulation]
            gravity = 9.5

            [sort]
            strategy = "exact"
            "#,
        )
        .unwrap();

        assert_eq!(config.upload_batch, 20_000);
        assert_eq!(config.simulation.gravity, 9.5);
        assert_eq!(config.simulation.max_speed, SimulationParams::default().max_speed);
        assert_eq!(config.sort.strategy, SortStrategy::Exact);
        assert_eq!(config.max_selected, MAX_SELECTED);
    }

    #[test]
    fn test_rejects_invalid_values() {
        for text in [
            "upload_batch = 0",
            "channel_capacity = 0",
            "max_delta_time = -1.0",
            "[sort]\nbuckets = 1",
            "[player]\nblend = 2.0",
            "[simulation]\nmax_speed = 0.0",
        ] {
            let result = PipelineConfig::from_toml_str(text);
            assert!(matches!(result, Err(PipelineError::InvalidConfig(_))), "{text}");
        }
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(matches!(
            PipelineConfig::from_toml_str("upload_batch = ["),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            PipelineConfig::from_toml_file("/nonexistent/splat.toml"),
            Err(PipelineError::Io(_))
        ));
    }
}
