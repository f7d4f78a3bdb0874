//! Transactional-email provider access.
//!
//! This module contains the [`ProviderClient`] trait, which is the only way
//! the rest of the crate talks to the provider, and [`MandrillClient`], the
//! HTTP implementation for the Mandrill JSON API.
//!
//! Every operation is a single request awaited to completion. Nothing is
//! retried or cached; callers that need fresh data simply ask again.

mod mandrill;

pub use mandrill::MandrillClient;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};

use crate::error::Result;
use crate::model::{MessageDetail, MessageRecord, ResendPayload};

/// The provider refuses to return more than this many records per search.
pub const MAX_SEARCH_LIMIT: u32 = 1000;

/// Date range and size cap for a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    /// First day included in the search.
    pub date_from: NaiveDate,
    /// Maximum number of records to return.
    pub limit: u32,
}

impl SearchWindow {
    /// Window covering the last `lookback_days` days up to `today`.
    ///
    /// `limit` is clamped to `1..=MAX_SEARCH_LIMIT`.
    pub fn ending(today: NaiveDate, lookback_days: u32, limit: u32) -> Self {
        let date_from = today
            .checked_sub_days(Days::new(u64::from(lookback_days)))
            .unwrap_or(NaiveDate::MIN);
        Self {
            date_from,
            limit: limit.clamp(1, MAX_SEARCH_LIMIT),
        }
    }

    /// Window ending today (local date).
    pub fn last_days(lookback_days: u32, limit: u32) -> Self {
        Self::ending(chrono::Local::now().date_naive(), lookback_days, limit)
    }
}

/// Operations the tool needs from a transactional-email provider.
///
/// Implementations report non-success HTTP statuses and transport problems
/// as errors; a successful call always returns a fully decoded value.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Search sent messages matching `query` inside `window`.
    /// Records come back in provider order.
    async fn search_messages(
        &self,
        query: &str,
        window: &SearchWindow,
    ) -> Result<Vec<MessageRecord>>;

    /// Remove `email` from the provider's deny list.
    /// Returns whether an entry was actually deleted.
    async fn delete_from_deny_list(&self, email: &str) -> Result<bool>;

    /// Fetch the stored content of message `id`.
    async fn fetch_message_info(&self, id: &str) -> Result<MessageDetail>;

    /// Send a stored message again. Returns whether the provider accepted it.
    async fn resend(&self, payload: &ResendPayload) -> Result<bool>;
}
