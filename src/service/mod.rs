//! Service integrations for external APIs and clients.
//!
//! The only external collaborator is the chat platform. The module defines a
//! generic trait and a concrete Slack implementation, which keeps the monitor
//! loop testable against fakes.

pub mod chat;
