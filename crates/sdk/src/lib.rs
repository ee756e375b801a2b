//! Waitlist SDK - Rust Client Library
//!
//! Typed client for the waitlist daemon's JSON-RPC API.
//!
//! # Example
//!
//! ```no_run
//! use waitlist_sdk::{JoinRequest, WaitlistClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = WaitlistClient::connect("http://127.0.0.1:9630")
//!         .await?
//!         .with_admin_token("admin123");
//!
//!     let ticket = client
//!         .join(JoinRequest::new("Ann").with_email("ann@example.com"))
//!         .await?;
//!     println!("Ticket {} at position {}", ticket.ticket_number, ticket.position);
//!
//!     if let Some(served) = client.serve_next().await?.served {
//!         println!("Now serving {}", served.name);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::WaitlistClient;
pub use error::{code, Result, SdkError};
pub use types::{
    Entry, JoinRequest, JoinResponse, LeaveResponse, MaintenanceRequest, MaintenanceResponse,
    QueueStats, ServeNextResponse, SettingsResponse, SettingsUpdate,
};
