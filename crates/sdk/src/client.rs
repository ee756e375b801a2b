//! Waitlist Client Implementation

use crate::error::{Result, SdkError};
use crate::types::{
    AdminRequest, Entry, JoinRequest, JoinResponse, LeaveResponse, MaintenanceRequest,
    MaintenanceResponse, QueueStats, ServeNextResponse, SettingsResponse, SettingsUpdate,
    TicketRequest,
};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ObjectParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Waitlist daemon client
///
/// Admin calls (`serve_next`, `update_settings`, `maintenance`) need a
/// client built with [`WaitlistClient::with_admin_token`].
///
/// # Example
///
/// ```no_run
/// use waitlist_sdk::{JoinRequest, WaitlistClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = WaitlistClient::connect("http://127.0.0.1:9630").await?;
/// let ticket = client.join(JoinRequest::new("Ann")).await?;
/// println!("{} is #{}", ticket.ticket_number, ticket.position);
/// # Ok(())
/// # }
/// ```
pub struct WaitlistClient {
    client: HttpClient,
    admin_token: Option<String>,
}

impl WaitlistClient {
    /// Connect to the waitlist daemon
    ///
    /// # Arguments
    ///
    /// * `url` - RPC endpoint URL (e.g., `http://127.0.0.1:9630`)
    pub async fn connect(url: impl AsRef<str>) -> Result<Self> {
        let url = url.as_ref();

        let client = HttpClientBuilder::default()
            .request_timeout(Duration::from_secs(30))
            .build(url)
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;

        Ok(Self {
            client,
            admin_token: None,
        })
    }

    pub fn with_admin_token(mut self, token: impl Into<String>) -> Self {
        self.admin_token = Some(token.into());
        self
    }

    /// Queue counters plus the ordered waiting list
    pub async fn stats(&self) -> Result<QueueStats> {
        Ok(self
            .client
            .request("queue.stats.v1", ObjectParams::new())
            .await?)
    }

    /// Join the queue at the tail
    pub async fn join(&self, request: JoinRequest) -> Result<JoinResponse> {
        self.call("queue.join.v1", &request).await
    }

    /// Leave the queue; fails with code 4005 once the ticket has been served
    pub async fn leave(&self, ticket_number: impl Into<String>) -> Result<LeaveResponse> {
        let request = TicketRequest {
            ticket_number: ticket_number.into(),
        };
        self.call("queue.leave.v1", &request).await
    }

    pub async fn ticket(&self, ticket_number: impl Into<String>) -> Result<Entry> {
        let request = TicketRequest {
            ticket_number: ticket_number.into(),
        };
        self.call("queue.ticket.v1", &request).await
    }

    /// Serve the front of the queue; `served` is `None` when nobody waits
    pub async fn serve_next(&self) -> Result<ServeNextResponse> {
        let request = AdminRequest {
            admin_token: self.admin_token()?,
        };
        self.call("admin.serve_next.v1", &request).await
    }

    pub async fn update_settings(&self, update: SettingsUpdate) -> Result<SettingsResponse> {
        let mut params = to_object_params(&update)?;
        params.insert("admin_token", self.admin_token()?)?;
        Ok(self.client.request("admin.settings.v1", params).await?)
    }

    pub async fn maintenance(&self, request: MaintenanceRequest) -> Result<MaintenanceResponse> {
        let mut params = to_object_params(&request)?;
        params.insert("admin_token", self.admin_token()?)?;
        Ok(self.client.request("admin.maintenance.v1", params).await?)
    }

    fn admin_token(&self) -> Result<String> {
        self.admin_token
            .clone()
            .ok_or_else(|| SdkError::Other("Admin token not configured".to_string()))
    }

    async fn call<P, R>(&self, method: &str, request: &P) -> Result<R>
    where
        P: Serialize,
        R: serde::de::DeserializeOwned,
    {
        let params = to_object_params(request)?;
        Ok(self.client.request(method, params).await?)
    }
}

/// The server takes named params, so a request struct is sent field by field
fn to_object_params<P: Serialize>(request: &P) -> Result<ObjectParams> {
    let Value::Object(fields) = serde_json::to_value(request)? else {
        return Err(SdkError::Other(
            "Request must serialize to a JSON object".to_string(),
        ));
    };

    let mut params = ObjectParams::new();
    for (name, value) in fields {
        params.insert(&name, value)?;
    }
    Ok(params)
}
