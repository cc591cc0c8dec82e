//! Request handling and message monitoring for nudge-bot.
//!
//! This module provides:
//! - The HTTP intake that accepts monitoring requests
//! - The per-message monitor loop
//! - The registry of live sessions

pub mod intake;
pub mod monitor;
pub mod session;
