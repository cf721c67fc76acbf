// src/helpdesk/types.rs
//! Wire shapes for the helpdesk REST API. Kept separate from the domain
//! `Ticket` so API quirks stay at the boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ticket::Ticket;

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<TicketDto>,
    #[serde(default)]
    pub next_page: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TicketDto {
    pub id: u64,
    pub subject: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<TicketDto> for Ticket {
    fn from(dto: TicketDto) -> Self {
        Ticket {
            id: dto.id,
            subject: dto.subject,
            description: dto.description,
            tags: dto.tags,
            status: dto.status,
            priority: dto.priority,
            created_at: dto.created_at,
            updated_at: dto.updated_at,
            full_text: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentsResponse {
    pub comments: Vec<CommentDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentDto {
    #[serde(default)]
    pub body: String,
    /// Internal notes are excluded from analysis text.
    #[serde(default = "default_public")]
    pub public: bool,
}

fn default_public() -> bool {
    true
}

/// `PUT /api/v2/tickets/{id}.json` body: only the tag set is touched.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateTicketPayload<'a> {
    pub ticket: TagUpdate<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagUpdate<'a> {
    pub tags: &'a [String],
}
