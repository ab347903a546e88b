//! Tunables for sweeps and the infrastructure they run on.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sweepcast_jobs::JobScheduler;
use sweepcast_world::{CollisionWorld, DEFAULT_HORIZON};

use crate::error::{Result, SweepError};

/// Default distance a ray is pushed past each hit before re-casting.
pub const DEFAULT_MIN_STEP: f32 = 1.0e-4;

/// Sweep parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepSettings {
    /// Distance a ray advances past each hit before the next round (world units).
    pub min_step: f32,
    /// Minimum commands per worker in the nearest-hit cast.
    pub cast_batch_size: usize,
    /// Minimum queries per worker when deriving the next round.
    pub derive_batch_size: usize,
    /// Minimum queries per worker when copying a round into the results.
    pub scatter_batch_size: usize,
    /// Minimum queries per worker when restoring distances.
    pub restore_batch_size: usize,
    /// Worker threads for [`SweepSettings::build_scheduler`]. `None` uses one per core.
    pub worker_threads: Option<usize>,
    /// Cast horizon for [`SweepSettings::build_world`] (world units).
    pub horizon: f32,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            min_step: DEFAULT_MIN_STEP,
            cast_batch_size: 16,
            derive_batch_size: 32,
            scatter_batch_size: 64,
            restore_batch_size: 64,
            worker_threads: None,
            horizon: DEFAULT_HORIZON,
        }
    }
}

impl SweepSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !(self.min_step >= 0.0) {
            return Err(SweepError::NegativeMinStep(self.min_step));
        }
        let batches = [
            ("cast_batch_size", self.cast_batch_size),
            ("derive_batch_size", self.derive_batch_size),
            ("scatter_batch_size", self.scatter_batch_size),
            ("restore_batch_size", self.restore_batch_size),
        ];
        if let Some((name, _)) = batches.iter().find(|(_, size)| *size == 0) {
            return Err(SweepError::InvalidSettings(format!("{name} must be at least 1")));
        }
        if self.worker_threads == Some(0) {
            return Err(SweepError::InvalidSettings(
                "worker_threads must be at least 1 when set".into(),
            ));
        }
        if !(self.horizon > 0.0) {
            return Err(SweepError::InvalidSettings("horizon must be positive".into()));
        }
        Ok(())
    }

    /// Parse and validate settings from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read, parse and validate a TOML settings file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Build a job scheduler with the configured worker count.
    pub fn build_scheduler(&self) -> Result<JobScheduler> {
        Ok(JobScheduler::new(self.worker_threads)?)
    }

    /// Build an empty collision world with the configured horizon.
    pub fn build_world(&self) -> CollisionWorld {
        CollisionWorld::with_horizon(self.horizon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = SweepSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.min_step, DEFAULT_MIN_STEP);
        assert_eq!(settings.cast_batch_size, 16);
        assert_eq!(settings.derive_batch_size, 32);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = SweepSettings::from_toml_str(
            r#"
            min_step = 0.001
            worker_threads = 2
            "#,
        )
        .unwrap();

        assert_eq!(settings.min_step, 0.001);
        assert_eq!(settings.worker_threads, Some(2));
        assert_eq!(settings.scatter_batch_size, 64);
        assert_eq!(settings.horizon, DEFAULT_HORIZON);
    }

    #[test]
    fn test_negative_min_step_rejected() {
        let result = SweepSettings::from_toml_str("min_step = -0.5");
        assert!(matches!(result, Err(SweepError::NegativeMinStep(step)) if step == -0.5));
    }

    #[test]
    fn test_zero_batch_rejected() {
        let settings = SweepSettings {
            derive_batch_size: 0,
            ..Default::default()
        };
        match settings.validate() {
            Err(SweepError::InvalidSettings(message)) => assert!(message.contains("derive_batch_size")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_zero_workers_and_bad_horizon_rejected() {
        let zero_workers = SweepSettings {
            worker_threads: Some(0),
            ..Default::default()
        };
        assert!(zero_workers.validate().is_err());

        let no_horizon = SweepSettings {
            horizon: f32::NAN,
            ..Default::default()
        };
        assert!(no_horizon.validate().is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let result = SweepSettings::from_toml_str("min_step = \"far\"");
        assert!(matches!(result, Err(SweepError::Toml(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = SweepSettings::from_toml_file("/nonexistent/sweepcast.toml");
        assert!(matches!(result, Err(SweepError::Io(_))));
    }

    #[test]
    fn test_builders() {
        let settings = SweepSettings {
            worker_threads: Some(2),
            horizon: 250.0,
            ..Default::default()
        };
        assert_eq!(settings.build_scheduler().unwrap().worker_count(), 2);
        assert_eq!(settings.build_world().horizon(), 250.0);
    }
}
