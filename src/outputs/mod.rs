//! Delivery of the finished digest.
//!
//! # Submodules
//!
//! - [`telegram`]: Sanitizes the digest for Telegram's HTML subset and posts it
//!   to the configured chat

pub mod telegram;
