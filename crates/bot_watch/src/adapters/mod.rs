// Rust guideline compliant 2026-10-19

//! Adapters (secondary ports) for the bot-watch binary.
//!
//! Each sub-module implements a hexagonal port declared by the `domain` or
//! `classifier` crate, or consumes what the simulation publishes.

pub mod channel_notifier;
pub mod dashboard_reporter;
pub mod file_model_source;
