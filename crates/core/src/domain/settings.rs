// Queue Settings (singleton)

use super::entry::EntryId;
use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const DEFAULT_MAX_CAPACITY: i64 = 50;
pub const DEFAULT_AVG_SERVICE_TIME_MINUTES: i64 = 20;

pub const MAX_CAPACITY_RANGE: RangeInclusive<i64> = 1..=1000;
pub const AVG_SERVICE_TIME_RANGE: RangeInclusive<i64> = 1..=60;

/// Queue settings. Exactly one instance exists per store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub max_capacity: i64,
    pub avg_service_time_minutes: i64,
    pub currently_serving_id: Option<EntryId>,
    pub total_served_today: i64,
    /// Last time the daily counters were reset (epoch ms)
    pub stats_reset_at: Option<i64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_capacity: DEFAULT_MAX_CAPACITY,
            avg_service_time_minutes: DEFAULT_AVG_SERVICE_TIME_MINUTES,
            currently_serving_id: None,
            total_served_today: 0,
            stats_reset_at: None,
        }
    }
}

impl Settings {
    pub fn is_full(&self, waiting: i64) -> bool {
        waiting >= self.max_capacity
    }
}

/// Partial settings update. Omitted fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default)]
    pub max_capacity: Option<i64>,
    #[serde(default)]
    pub avg_service_time_minutes: Option<i64>,
}

impl SettingsUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(capacity) = self.max_capacity {
            if !MAX_CAPACITY_RANGE.contains(&capacity) {
                return Err(DomainError::ValidationError(format!(
                    "Max capacity {} out of range ({}-{})",
                    capacity,
                    MAX_CAPACITY_RANGE.start(),
                    MAX_CAPACITY_RANGE.end()
                )));
            }
        }
        if let Some(minutes) = self.avg_service_time_minutes {
            if !AVG_SERVICE_TIME_RANGE.contains(&minutes) {
                return Err(DomainError::ValidationError(format!(
                    "Average service time {} out of range ({}-{} minutes)",
                    minutes,
                    AVG_SERVICE_TIME_RANGE.start(),
                    AVG_SERVICE_TIME_RANGE.end()
                )));
            }
        }
        Ok(())
    }

    /// Validate, then merge into `current`
    pub fn apply_to(&self, current: &Settings) -> Result<Settings> {
        self.validate()?;
        Ok(Settings {
            max_capacity: self.max_capacity.unwrap_or(current.max_capacity),
            avg_service_time_minutes: self
                .avg_service_time_minutes
                .unwrap_or(current.avg_service_time_minutes),
            ..current.clone()
        })
    }
}
