//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results.

use serde::{Deserialize, Serialize};
use waitlist_core::domain::{QueueEntry, QueueSnapshot, Settings};
use waitlist_core::port::MaintenanceReport;

/// Public view of a queue entry (internal ids stay inside the daemon)
#[derive(Debug, Clone, Serialize)]
pub struct EntryView {
    pub ticket_number: String,
    pub name: String,
    pub email: Option<String>,
    pub position: i64,
    pub status: String,
    pub joined_at: i64,
    pub served_at: Option<i64>,
    pub estimated_wait_minutes: i64,
}

impl From<QueueEntry> for EntryView {
    fn from(entry: QueueEntry) -> Self {
        Self {
            ticket_number: entry.ticket_number,
            name: entry.name,
            email: entry.email,
            position: entry.position,
            status: entry.status.to_string(),
            joined_at: entry.joined_at,
            served_at: entry.served_at,
            estimated_wait_minutes: entry.estimated_wait_minutes,
        }
    }
}

/// queue.stats.v1 - Queue counters plus the ordered waiting list
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub waiting: i64,
    pub max_capacity: i64,
    pub avg_service_time_minutes: i64,
    pub total_served_today: i64,
    pub is_full: bool,
    pub currently_serving: Option<EntryView>,
    pub waiting_list: Vec<EntryView>,
    pub uptime_seconds: i64,
}

impl StatsResponse {
    pub fn from_snapshot(snapshot: QueueSnapshot, uptime_seconds: i64) -> Self {
        let stats = snapshot.stats;
        Self {
            waiting: stats.waiting,
            max_capacity: stats.max_capacity,
            avg_service_time_minutes: stats.avg_service_time_minutes,
            total_served_today: stats.total_served_today,
            is_full: stats.is_full,
            currently_serving: stats.currently_serving.map(EntryView::from),
            waiting_list: snapshot
                .waiting_list
                .into_iter()
                .map(EntryView::from)
                .collect(),
            uptime_seconds,
        }
    }
}

/// queue.join.v1 - Join the queue
#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JoinResponse {
    pub ticket_number: String,
    pub position: i64,
    pub estimated_wait_minutes: i64,
    pub name: String,
    pub email: Option<String>,
}

/// queue.leave.v1 - Leave the queue
#[derive(Debug, Deserialize)]
pub struct LeaveRequest {
    pub ticket_number: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaveResponse {
    pub ticket_number: String,
    pub left: bool,
}

/// queue.ticket.v1 - Look up one ticket
#[derive(Debug, Deserialize)]
pub struct TicketRequest {
    pub ticket_number: String,
}

/// admin.serve_next.v1 - Serve the front of the queue
#[derive(Debug, Deserialize)]
pub struct ServeNextRequest {
    pub admin_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServeNextResponse {
    /// `None` when nobody was waiting
    pub served: Option<EntryView>,
    pub waiting: i64,
    pub total_served_today: i64,
}

/// admin.settings.v1 - Update capacity and/or average service time
#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    pub admin_token: String,
    #[serde(default)]
    pub max_capacity: Option<i64>,
    #[serde(default)]
    pub avg_service_time: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SettingsResponse {
    pub max_capacity: i64,
    pub avg_service_time_minutes: i64,
}

impl From<Settings> for SettingsResponse {
    fn from(settings: Settings) -> Self {
        Self {
            max_capacity: settings.max_capacity,
            avg_service_time_minutes: settings.avg_service_time_minutes,
        }
    }
}

/// admin.maintenance.v1 - Run manual maintenance
#[derive(Debug, Deserialize)]
pub struct MaintenanceRequest {
    pub admin_token: String,
    #[serde(default)]
    pub reset_daily_stats: bool,
    #[serde(default)]
    pub retention_days: Option<i64>,
    #[serde(default)]
    pub force_vacuum: bool,
}

#[derive(Debug, Clone, Serialize)]
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

impl From<MaintenanceReport> for MaintenanceResponse {
    fn from(report: MaintenanceReport) -> Self {
        Self {
            daily_stats_reset: report.daily_stats_reset,
            entries_deleted: report.deleted_entries,
            vacuum_run: report.reclaimed_mb.is_some(),
            reclaimed_mb: report.reclaimed_mb.unwrap_or(0.0),
            db_size_before: report.before.db_size_bytes,
            db_size_after: report.after.db_size_bytes,
            waiting_count: report.after.waiting_count,
            served_count: report.after.served_count,
        }
    }
}
