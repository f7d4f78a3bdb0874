//! Core data model types: message records, message content, and addresses.

pub mod address;
pub mod detail;
pub mod record;

pub use detail::{MessageDetail, ResendPayload};
pub use record::MessageRecord;
