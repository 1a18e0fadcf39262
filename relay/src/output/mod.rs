//! Output module for turning inbound events into chat messages and delivering them.
//!
//! This module provides:
//! - [`truncate`] - Size-bounding helpers for text and serialized JSON
//! - [`EventSummary`] - The fixed-layout human-readable summary of an event
//! - [`compose_message`] - Assembly of the [`OutboundMessage`] with its size guard
//! - Webhook delivery with retries and exponential backoff

pub mod payload;
pub mod summary;
pub mod truncate;
mod webhook;

pub use payload::{compose_message, MessageLimits, OutboundMessage};
pub use summary::EventSummary;
pub use webhook::{DeliveryClient, DeliveryResult, WebhookConfig};

#[cfg(test)]
pub(crate) use webhook::tests as webhook_tests;
