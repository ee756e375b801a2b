//! SDK Request/Response Types
//!
//! Mirrors the JSON-RPC types from the api-rpc crate.

use serde::{Deserialize, Serialize};

/// One queue entry as seen by clients
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Entry {
    pub ticket_number: String,
    pub name: String,
    pub email: Option<String>,
    pub position: i64,
    /// `WAITING` or `SERVED`
    pub status: String,
    pub joined_at: i64,
    pub served_at: Option<i64>,
    pub estimated_wait_minutes: i64,
}

impl Entry {
    pub fn is_waiting(&self) -> bool {
        self.status == "WAITING"
    }
}

/// Queue counters plus the ordered waiting list
#[derive(Debug, Clone, Deserialize)]
pub struct QueueStats {
    pub waiting: i64,
    pub max_capacity: i64,
    pub avg_service_time_minutes: i64,
    pub total_served_today: i64,
    pub is_full: bool,
    pub currently_serving: Option<Entry>,
    pub waiting_list: Vec<Entry>,
    pub uptime_seconds: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct JoinRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl JoinRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinResponse {
    pub ticket_number: String,
    pub position: i64,
    pub estimated_wait_minutes: i64,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct TicketRequest {
    pub ticket_number: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaveResponse {
    pub ticket_number: String,
    pub left: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AdminRequest {
    pub admin_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServeNextResponse {
    pub served: Option<Entry>,
    pub waiting: i64,
    pub total_served_today: i64,
}

/// Partial settings update; omitted fields are left unchanged
#[derive(Debug, Clone, Default, Serialize)]
pub struct SettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_capacity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_service_time: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SettingsResponse {
    pub max_capacity: i64,
    pub avg_service_time_minutes: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MaintenanceRequest {
    pub reset_daily_stats: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_days: Option<i64>,
    pub force_vacuum: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MaintenanceResponse {
    pub daily_stats_reset: bool,
    pub entries_deleted: i64,
    pub vacuum_run: bool,
    pub reclaimed_mb: f64,
    pub db_size_before: i64,
    pub db_size_after: i64,
    pub waiting_count: i64,
    pub served_count: i64,
}
