// Queue Statistics (read model)

use super::entry::QueueEntry;
use super::settings::Settings;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    pub waiting: i64,
    pub max_capacity: i64,
    pub avg_service_time_minutes: i64,
    pub total_served_today: i64,
    pub currently_serving: Option<QueueEntry>,
    pub is_full: bool,
}

impl QueueStats {
    pub fn new(settings: &Settings, waiting: i64, currently_serving: Option<QueueEntry>) -> Self {
        Self {
            waiting,
            max_capacity: settings.max_capacity,
            avg_service_time_minutes: settings.avg_service_time_minutes,
            total_served_today: settings.total_served_today,
            currently_serving,
            is_full: settings.is_full(waiting),
        }
    }
}

/// Stats plus the ordered waiting list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    #[serde(flatten)]
    pub stats: QueueStats,
    pub waiting_list: Vec<QueueEntry>,
}
