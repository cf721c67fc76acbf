// src/helpdesk/client.rs
//! reqwest client for the helpdesk API. Search excludes tickets carrying the
//! processed marker, so a completed run shrinks the next run's input. Detail
//! fetch runs in small fixed-size groups with a pause between groups to stay
//! under the API rate limit.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use super::types::{CommentsResponse, SearchResponse, TagUpdate, TicketDto, UpdateTicketPayload};
use crate::apply::TagWriter;
use crate::pipeline::TicketSource;
use crate::tags::PROCESSED_TAG;
use crate::ticket::{normalize_text, Ticket};

pub const ENV_BASE_URL: &str = "HELPDESK_BASE_URL";
pub const ENV_API_TOKEN: &str = "HELPDESK_API_TOKEN";

const MAX_SEARCH_PAGES: usize = 10;
const DETAIL_GROUP_SIZE: usize = 5;
const DETAIL_GROUP_PAUSE: Duration = Duration::from_millis(500);

pub struct HelpdeskClient {
    base_url: String,
    token: String,
    client: Client,
}

impl HelpdeskClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            client: Client::new(),
        }
    }

    /// Build from `HELPDESK_BASE_URL` / `HELPDESK_API_TOKEN`. Both required.
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var(ENV_BASE_URL).map_err(|_| anyhow!("{ENV_BASE_URL} not set"))?;
        let token = std::env::var(ENV_API_TOKEN).map_err(|_| anyhow!("{ENV_API_TOKEN} not set"))?;
        Ok(Self::new(base_url, token))
    }

    async fn search_page(&self, page: usize) -> Result<SearchResponse> {
        // Open tickets that have not been auto-triaged yet.
        let query = format!("type:ticket status<solved -tags:{PROCESSED_TAG}");
        let url = format!("{}/api/v2/search.json", self.base_url);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("query", query.as_str()), ("page", &page.to_string())])
            .send()
            .await
            .context("helpdesk search request")?
            .error_for_status()
            .context("helpdesk search non-2xx")?;
        resp.json::<SearchResponse>()
            .await
            .context("decoding helpdesk search response")
    }

    /// Subject + description + public comment bodies, normalized.
    async fn fetch_full_text(&self, ticket: &Ticket) -> Result<String> {
        let url = format!(
            "{}/api/v2/tickets/{}/comments.json",
            self.base_url, ticket.id
        );
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .context("helpdesk comments request")?
            .error_for_status()
            .context("helpdesk comments non-2xx")?;
        let comments: CommentsResponse = resp
            .json()
            .await
            .context("decoding helpdesk comments response")?;

        let mut parts = vec![ticket.subject.clone(), ticket.description.clone()];
        for c in comments.comments.iter().filter(|c| c.public) {
            parts.push(c.body.clone());
        }
        Ok(normalize_text(&parts.join("\n")))
    }
}

#[async_trait]
impl TicketSource for HelpdeskClient {
    async fn fetch_new_tickets(&self) -> Result<Vec<Ticket>> {
        // Paginate the search; failure here is fatal to the batch.
        let mut dtos: Vec<TicketDto> = Vec::new();
        for page in 1..=MAX_SEARCH_PAGES {
            let resp = self.search_page(page).await?;
            let done = resp.next_page.is_none() || resp.results.is_empty();
            dtos.extend(resp.results);
            if done {
                break;
            }
        }
        let mut tickets: Vec<Ticket> = dtos.into_iter().map(Ticket::from).collect();
        debug!(count = tickets.len(), "fetched ticket summaries");

        // Detail fetch in small groups with a pause between groups. A failed
        // detail fetch is not fatal; analysis falls back to subject+description.
        for (i, group) in tickets.chunks_mut(DETAIL_GROUP_SIZE).enumerate() {
            if i > 0 {
                tokio::time::sleep(DETAIL_GROUP_PAUSE).await;
            }
            for ticket in group.iter_mut() {
                match self.fetch_full_text(ticket).await {
                    Ok(text) => ticket.full_text = Some(text),
                    Err(e) => {
                        warn!(ticket_id = ticket.id, error = ?e, "detail fetch failed");
                    }
                }
            }
        }
        Ok(tickets)
    }
}

#[async_trait]
impl TagWriter for HelpdeskClient {
    async fn update_tags(&self, ticket_id: u64, tags: &[String]) -> Result<()> {
        let url = format!("{}/api/v2/tickets/{}.json", self.base_url, ticket_id);
        let payload = UpdateTicketPayload {
            ticket: TagUpdate { tags },
        };
        self.client
            .put(&url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .context("helpdesk tag update request")?
            .error_for_status()
            .context("helpdesk tag update non-2xx")?;
        Ok(())
    }
}
