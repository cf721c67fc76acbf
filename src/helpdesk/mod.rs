// src/helpdesk/mod.rs
//! Thin helpdesk REST plumbing: wire DTOs and the reqwest client implementing
//! the `TicketSource` and `TagWriter` collaborator traits. No scoring logic
//! lives here.

pub mod client;
pub mod types;

pub use client::HelpdeskClient;
