//! `bouncewatch` — delivery status and deny-list remediation for a
//! transactional-email provider.
//!
//! This crate provides the classification engine that turns provider message
//! events into state counts, per-message reasons and funnel metrics, the
//! provider client it is fed by, and the handlers and reports built on top.

pub mod classify;
pub mod config;
pub mod error;
pub mod lookup;
pub mod model;
pub mod provider;
pub mod remediate;
pub mod report;
