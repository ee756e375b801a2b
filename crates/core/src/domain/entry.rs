// Queue Entry Domain Model

use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Entry ID (monotonically assigned by the store)
pub type EntryId = i64;

/// Ticket number handed to the person who joined
pub type TicketNumber = String;

/// Entry Status
///
/// `Waiting -> Served` is the only transition. Leaving deletes the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryStatus {
    Waiting,
    Served,
}

impl EntryStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "WAITING" => Some(EntryStatus::Waiting),
            "SERVED" => Some(EntryStatus::Served),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryStatus::Waiting => write!(f, "WAITING"),
            EntryStatus::Served => write!(f, "SERVED"),
        }
    }
}

/// Queue Entry Entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: EntryId,
    pub name: String,
    pub email: Option<String>,
    pub ticket_number: TicketNumber,

    /// 1-based rank among waiting entries
    pub position: i64,
    pub status: EntryStatus,

    pub joined_at: i64, // epoch ms
    pub served_at: Option<i64>,

    pub estimated_wait_minutes: i64,
}

impl QueueEntry {
    pub fn is_waiting(&self) -> bool {
        self.status == EntryStatus::Waiting
    }

    /// Transition: WAITING -> SERVED
    pub fn serve(&mut self, now: i64) -> Result<()> {
        if self.status != EntryStatus::Waiting {
            return Err(DomainError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: EntryStatus::Served.to_string(),
            });
        }
        self.status = EntryStatus::Served;
        self.served_at = Some(now);
        Ok(())
    }
}

/// Validated input for a new entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub name: String,
    pub email: Option<String>,
}

impl NewEntry {
    /// Trims the name and drops a blank email.
    pub fn new(name: &str, email: Option<&str>) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::ValidationError(
                "Name cannot be empty".to_string(),
            ));
        }

        let email = email
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string);

        Ok(Self {
            name: name.to_string(),
            email,
        })
    }
}
