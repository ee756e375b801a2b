//! JSON-RPC Server
//!
//! Serves the queue methods over HTTP on the configured host/port.

use crate::handler::RpcHandler;
use crate::rate_limiter::RateLimiter;
use crate::types::{
    JoinRequest, LeaveRequest, MaintenanceRequest, ServeNextRequest, TicketRequest,
    UpdateSettingsRequest,
};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use waitlist_core::application::QueueService;
use waitlist_core::port::Maintenance;

pub const DEFAULT_RPC_HOST: &str = "127.0.0.1";
pub const DEFAULT_RPC_PORT: u16 = 9630;
pub const DEFAULT_ADMIN_TOKEN: &str = "admin123";
pub const DEFAULT_RATE_LIMIT_BURST: u32 = 50;
pub const DEFAULT_RATE_LIMIT_RATE: u32 = 20;
pub const DEFAULT_RETENTION_DAYS: i64 = 7;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
    /// Shared secret for admin.* methods
    pub admin_token: String,
    pub rate_limit_burst: u32,
    pub rate_limit_rate: u32,
    /// Used by admin.maintenance.v1 when the caller omits `retention_days`
    pub retention_days: i64,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
            admin_token: DEFAULT_ADMIN_TOKEN.to_string(),
            rate_limit_burst: DEFAULT_RATE_LIMIT_BURST,
            rate_limit_rate: DEFAULT_RATE_LIMIT_RATE,
            retention_days: DEFAULT_RETENTION_DAYS,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(
        config: RpcServerConfig,
        queue_service: Arc<QueueService>,
        maintenance: Arc<dyn Maintenance>,
    ) -> Self {
        let handler = RpcHandler::new(
            queue_service,
            maintenance,
            config.admin_token.clone(),
            config.retention_days,
            RateLimiter::new(config.rate_limit_burst, config.rate_limit_rate),
        );
        Self {
            config,
            handler: Arc::new(handler),
        }
    }

    /// Start the JSON-RPC server
    ///
    /// Returns the bound address (useful with port 0) and the handle that
    /// keeps the server alive.
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;
        let local_addr = server
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let mut module = RpcModule::new(());

        // Public methods
        let handler = self.handler.clone();
        module
            .register_async_method("queue.stats.v1", move |_params, _, _| {
                let handler = handler.clone();
                async move { handler.stats().await }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("queue.join.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: JoinRequest = params.parse()?;
                    handler.join(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("queue.leave.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: LeaveRequest = params.parse()?;
                    handler.leave(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("queue.ticket.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: TicketRequest = params.parse()?;
                    handler.ticket(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        // Admin methods (shared-secret gated)
        let handler = self.handler.clone();
        module
            .register_async_method("admin.serve_next.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: ServeNextRequest = params.parse()?;
                    handler.serve_next(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("admin.settings.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: UpdateSettingsRequest = params.parse()?;
                    handler.update_settings(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("admin.maintenance.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: MaintenanceRequest = params.parse()?;
                    handler.maintenance(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        info!(addr = %local_addr, "JSON-RPC server started");

        let handle = server.start(module);
        Ok((local_addr, handle))
    }
}
