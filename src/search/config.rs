//! Search configuration.

use std::time::Duration;

use crate::error::{ConfigError, ConfigErrorKind};
use crate::exam::OptimizationConfig;

/// Configuration for [`SearchRunner`](super::SearchRunner).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_timetable::search::SearchConfig;
///
/// let config = SearchConfig::default()
///     .with_time_limit(Duration::from_secs(5))
///     .with_num_workers(4)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Wall-clock budget for the whole search.
    pub time_limit: Duration,

    /// Number of improvement workers. Workers beyond one only run in
    /// parallel with the `parallel` feature.
    pub num_workers: usize,

    /// Random seed for reproducibility. Workers derive their own streams.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(60),
            num_workers: 1,
            seed: None,
        }
    }
}

impl SearchConfig {
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = limit;
        self
    }

    /// Sets the time limit from fractional seconds; non-finite or negative
    /// values give a zero limit, which [`validate`](Self::validate) rejects.
    pub fn with_time_limit_seconds(mut self, seconds: f64) -> Self {
        self.time_limit = Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO);
        self
    }

    pub fn with_num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_limit.is_zero() {
            return Err(ConfigError::new(
                ConfigErrorKind::InvalidTimeLimit,
                "time limit must be positive",
            ));
        }
        if self.num_workers == 0 {
            return Err(ConfigError::new(
                ConfigErrorKind::InvalidWorkerCount,
                "num_workers must be at least 1",
            ));
        }
        Ok(())
    }
}

impl From<&OptimizationConfig> for SearchConfig {
    fn from(config: &OptimizationConfig) -> Self {
        Self::default().with_time_limit_seconds(config.solver_time_limit_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert_eq!(config.time_limit, Duration::from_secs(60));
        assert_eq!(config.num_workers, 1);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_optimization_config() {
        let opt = OptimizationConfig::default().with_time_limit_seconds(2.5);
        let config = SearchConfig::from(&opt);
        assert_eq!(config.time_limit, Duration::from_millis(2500));
    }

    #[test]
    fn test_validate_bad_time_limit() {
        for seconds in [0.0, -3.0, f64::NAN] {
            let config = SearchConfig::default().with_time_limit_seconds(seconds);
            assert_eq!(
                config.validate().unwrap_err().kind,
                ConfigErrorKind::InvalidTimeLimit
            );
        }
    }

    #[test]
    fn test_validate_zero_workers() {
        let config = SearchConfig::default().with_num_workers(0);
        assert_eq!(
            config.validate().unwrap_err().kind,
            ConfigErrorKind::InvalidWorkerCount
        );
    }
}
