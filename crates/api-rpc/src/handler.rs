//! RPC Method Handlers
//!
//! Translates JSON-RPC params into QueueService / Maintenance calls.

use crate::error::{throttled, to_rpc_error, unauthorized};
use crate::rate_limiter::RateLimiter;
use crate::types::{
    EntryView, JoinRequest, JoinResponse, LeaveRequest, LeaveResponse, MaintenanceRequest,
    MaintenanceResponse, ServeNextRequest, ServeNextResponse, SettingsResponse, StatsResponse,
    TicketRequest, UpdateSettingsRequest,
};
use jsonrpsee::types::ErrorObjectOwned;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use waitlist_core::application::{self, QueueService};
use waitlist_core::domain::SettingsUpdate;
use waitlist_core::error::AppError;
use waitlist_core::port::{Maintenance, MaintenanceConfig, MAX_RETENTION_DAYS};

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    queue_service: Arc<QueueService>,
    maintenance: Arc<dyn Maintenance>,
    admin_token: String,
    default_retention_days: i64,
    rate_limiter: RateLimiter,
    start_time: Instant,
}

impl RpcHandler {
    pub fn new(
        queue_service: Arc<QueueService>,
        maintenance: Arc<dyn Maintenance>,
        admin_token: String,
        default_retention_days: i64,
        rate_limiter: RateLimiter,
    ) -> Self {
        Self {
            queue_service,
            maintenance,
            admin_token,
            default_retention_days,
            rate_limiter,
            start_time: Instant::now(),
        }
    }

    fn authorize(&self, token: &str) -> Result<(), ErrorObjectOwned> {
        if token != self.admin_token {
            warn!("Admin call rejected: bad token");
            return Err(unauthorized());
        }
        Ok(())
    }

    fn throttle(&self) -> Result<(), ErrorObjectOwned> {
        if !self.rate_limiter.check() {
            warn!("Request throttled");
            return Err(throttled());
        }
        Ok(())
    }

    /// queue.stats.v1
    pub async fn stats(&self) -> Result<StatsResponse, ErrorObjectOwned> {
        let snapshot = self
            .queue_service
            .snapshot()
            .await
            .map_err(to_rpc_error)?;

        Ok(StatsResponse::from_snapshot(
            snapshot,
            self.start_time.elapsed().as_secs() as i64,
        ))
    }

    /// queue.join.v1
    pub async fn join(&self, params: JoinRequest) -> Result<JoinResponse, ErrorObjectOwned> {
        self.throttle()?;

        let resp = self
            .queue_service
            .join(application::JoinRequest {
                name: params.name,
                email: params.email,
            })
            .await
            .map_err(to_rpc_error)?;

        Ok(JoinResponse {
            ticket_number: resp.ticket_number,
            position: resp.position,
            estimated_wait_minutes: resp.estimated_wait_minutes,
            name: resp.name,
            email: resp.email,
        })
    }

    /// queue.leave.v1
    pub async fn leave(&self, params: LeaveRequest) -> Result<LeaveResponse, ErrorObjectOwned> {
        self.throttle()?;

        let removed = self
            .queue_service
            .leave(&params.ticket_number)
            .await
            .map_err(to_rpc_error)?;

        Ok(LeaveResponse {
            ticket_number: removed.ticket_number,
            left: true,
        })
    }

    /// queue.ticket.v1
    pub async fn ticket(&self, params: TicketRequest) -> Result<EntryView, ErrorObjectOwned> {
        self.queue_service
            .get_ticket(&params.ticket_number)
            .await
            .map(EntryView::from)
            .map_err(to_rpc_error)
    }

    /// admin.serve_next.v1
    pub async fn serve_next(
        &self,
        params: ServeNextRequest,
    ) -> Result<ServeNextResponse, ErrorObjectOwned> {
        self.authorize(&params.admin_token)?;

        let outcome = self
            .queue_service
            .serve_next_with_counts()
            .await
            .map_err(to_rpc_error)?;

        Ok(ServeNextResponse {
            served: outcome.served.map(EntryView::from),
            waiting: outcome.waiting,
            total_served_today: outcome.total_served_today,
        })
    }

    /// admin.settings.v1
    pub async fn update_settings(
        &self,
        params: UpdateSettingsRequest,
    ) -> Result<SettingsResponse, ErrorObjectOwned> {
        self.authorize(&params.admin_token)?;

        let update = SettingsUpdate {
            max_capacity: params.max_capacity,
            avg_service_time_minutes: params.avg_service_time,
        };

        self.queue_service
            .update_settings(update)
            .await
            .map(SettingsResponse::from)
            .map_err(to_rpc_error)
    }

    /// admin.maintenance.v1
    pub async fn maintenance(
        &self,
        params: MaintenanceRequest,
    ) -> Result<MaintenanceResponse, ErrorObjectOwned> {
        self.authorize(&params.admin_token)?;

        let retention_days = params.retention_days.unwrap_or(self.default_retention_days);
        if !(0..=MAX_RETENTION_DAYS).contains(&retention_days) {
            return Err(to_rpc_error(AppError::Validation(format!(
                "retention_days must be between 0 and {}, got {}",
                MAX_RETENTION_DAYS, retention_days
            ))));
        }

        let config = MaintenanceConfig {
            served_retention_days: retention_days,
            reset_daily_stats: params.reset_daily_stats,
            force_vacuum: params.force_vacuum,
            ..Default::default()
        };
        let report = self
            .maintenance
            .run_full_maintenance(&config)
            .await
            .map_err(to_rpc_error)?;

        info!(
            entries_deleted = report.deleted_entries,
            vacuum_run = report.reclaimed_mb.is_some(),
            "Manual maintenance completed"
        );

        Ok(MaintenanceResponse::from(report))
    }
}
