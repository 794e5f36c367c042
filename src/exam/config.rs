//! Timetable configuration and derived day geometry.

use super::clock::ClockTime;
use crate::error::{ConfigError, ConfigErrorKind};

/// Hard-constraint parameters (the `constraints` section of a configuration
/// file).
///
/// # Examples
///
/// ```
/// use u_timetable::exam::ConstraintsConfig;
///
/// let config = ConstraintsConfig::new(2, 3, 30)
///     .with_pause(10)
///     .with_day_window("08:00".parse().unwrap(), "12:00".parse().unwrap());
/// let geometry = config.geometry().unwrap();
/// assert_eq!(geometry.day_minutes, 240);
/// assert_eq!(geometry.horizon(), 480);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintsConfig {
    pub num_days: u32,
    pub num_rooms: u32,
    pub exam_duration_minutes: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub pause_between_exams_minutes: u32,
    pub start_of_day: ClockTime,
    pub end_of_day: ClockTime,
}

impl ConstraintsConfig {
    /// Creates a configuration with no pause and an 08:00–16:00 day.
    pub fn new(num_days: u32, num_rooms: u32, exam_duration_minutes: u32) -> Self {
        Self {
            num_days,
            num_rooms,
            exam_duration_minutes,
            pause_between_exams_minutes: 0,
            start_of_day: ClockTime::from_minutes(8 * 60),
            end_of_day: ClockTime::from_minutes(16 * 60),
        }
    }

    pub fn with_pause(mut self, minutes: u32) -> Self {
        self.pause_between_exams_minutes = minutes;
        self
    }

    pub fn with_day_window(mut self, start: ClockTime, end: ClockTime) -> Self {
        self.start_of_day = start;
        self.end_of_day = end;
        self
    }

    /// Validates the configuration and derives the day geometry.
    pub fn geometry(&self) -> Result<DayGeometry, ConfigError> {
        if self.num_days == 0 {
            return Err(ConfigError::new(
                ConfigErrorKind::NonPositiveCount,
                "num_days must be at least 1",
            ));
        }
        if self.num_rooms == 0 {
            return Err(ConfigError::new(
                ConfigErrorKind::NonPositiveCount,
                "num_rooms must be at least 1",
            ));
        }
        if self.exam_duration_minutes == 0 {
            return Err(ConfigError::new(
                ConfigErrorKind::NonPositiveDuration,
                "exam_duration_minutes must be positive",
            ));
        }
        if self.end_of_day <= self.start_of_day {
            return Err(ConfigError::new(
                ConfigErrorKind::InvalidDayWindow,
                format!(
                    "end_of_day {} must be after start_of_day {}",
                    self.end_of_day, self.start_of_day
                ),
            ));
        }

        Ok(DayGeometry {
            num_days: i64::from(self.num_days),
            num_rooms: i64::from(self.num_rooms),
            exam_minutes: i64::from(self.exam_duration_minutes),
            pause_minutes: i64::from(self.pause_between_exams_minutes),
            day_minutes: i64::from(self.end_of_day.minutes() - self.start_of_day.minutes()),
            day_start: self.start_of_day,
        })
    }
}

/// Time layout of the planning horizon, in minutes.
///
/// The horizon is the concatenation of `num_days` day windows of
/// `day_minutes` each; a start time `s` lies on day `s / day_minutes` at
/// offset `s % day_minutes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayGeometry {
    pub num_days: i64,
    pub num_rooms: i64,
    pub exam_minutes: i64,
    pub pause_minutes: i64,
    pub day_minutes: i64,
    pub day_start: ClockTime,
}

impl DayGeometry {
    /// Total horizon length.
    pub fn horizon(&self) -> i64 {
        self.day_minutes * self.num_days
    }

    pub fn day_of(&self, start: i64) -> i64 {
        start.div_euclid(self.day_minutes)
    }

    pub fn offset_of(&self, start: i64) -> i64 {
        start.rem_euclid(self.day_minutes)
    }

    /// Latest offset at which an exam can start and still end in its day.
    pub fn last_offset(&self) -> i64 {
        self.day_minutes - self.exam_minutes
    }

    /// Whether an exam starting at `start` lies entirely inside one day.
    pub fn fits_in_day(&self, start: i64) -> bool {
        start >= 0
            && self.day_of(start) < self.num_days
            && self.offset_of(start) + self.exam_minutes <= self.day_minutes
    }

    /// Exams one room can hold in one day (pause required between them).
    pub fn room_slots_per_day(&self) -> i64 {
        if self.day_minutes < self.exam_minutes {
            0
        } else {
            (self.day_minutes - self.exam_minutes) / (self.exam_minutes + self.pause_minutes) + 1
        }
    }

    /// Exams one professor can attend in one day.
    pub fn professor_slots_per_day(&self) -> i64 {
        self.day_minutes / self.exam_minutes
    }

    /// Clock time of a start within its day.
    pub fn clock_at(&self, start: i64) -> ClockTime {
        let offset = u32::try_from(self.offset_of(start)).unwrap_or(0);
        self.day_start.plus_minutes(offset)
    }
}

/// Soft-cost weights and search budget (the `optimization` section).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizationConfig {
    pub weight_active_days: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub weight_prof_pair_locality: u32,
    pub solver_time_limit_seconds: f64,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            weight_active_days: 1,
            weight_prof_pair_locality: 0,
            solver_time_limit_seconds: 60.0,
        }
    }
}

impl OptimizationConfig {
    pub fn with_weight_active_days(mut self, w: u32) -> Self {
        self.weight_active_days = w;
        self
    }

    pub fn with_weight_pair_locality(mut self, w: u32) -> Self {
        self.weight_prof_pair_locality = w;
        self
    }

    pub fn with_time_limit_seconds(mut self, seconds: f64) -> Self {
        self.solver_time_limit_seconds = seconds;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.solver_time_limit_seconds.is_finite() && self.solver_time_limit_seconds > 0.0) {
            return Err(ConfigError::new(
                ConfigErrorKind::InvalidTimeLimit,
                format!(
                    "solver_time_limit_seconds must be positive, got {}",
                    self.solver_time_limit_seconds
                ),
            ));
        }
        Ok(())
    }
}

/// Complete run configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimetableConfig {
    pub constraints: ConstraintsConfig,
    pub optimization: OptimizationConfig,
}

impl TimetableConfig {
    pub fn new(constraints: ConstraintsConfig, optimization: OptimizationConfig) -> Self {
        Self {
            constraints,
            optimization,
        }
    }

    /// Validates both sections; returns the day geometry.
    pub fn validate(&self) -> Result<DayGeometry, ConfigError> {
        let geometry = self.constraints.geometry()?;
        self.optimization.validate()?;
        Ok(geometry)
    }
}
