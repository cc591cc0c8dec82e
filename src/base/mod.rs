//! Core components, types, and utilities for the nudge-bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - Reply templates and check-in phrase selection.
//! - Common types and result handling.

pub mod config;
pub mod replies;
pub mod types;
