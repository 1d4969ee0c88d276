// File: src/platforms/mod.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use murmelbot_common::error::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
    Reconnecting,
    Error(String),
}

/// One inbound chat message as delivered by a transport.
#[derive(Debug, Clone)]
pub struct ChatMessageEvent {
    pub channel: String,
    pub user_id: String,
    pub user_name: String,
    pub display_name: String,
    pub text: String,
    pub is_moderator: bool,
    pub is_subscriber: bool,
    pub timestamp: DateTime<Utc>,
}

#[async_trait]
pub trait PlatformIntegration: Send + Sync {
    async fn connect(&mut self) -> Result<(), Error>;
    async fn disconnect(&mut self) -> Result<(), Error>;
    async fn send_message(&self, channel: &str, message: &str) -> Result<(), Error>;
    async fn get_connection_status(&self) -> Result<ConnectionStatus, Error>;
}

/// A transport that can also join and leave channels. Handlers hold this
/// as their reply path; it is never consulted for gating decisions.
#[async_trait]
pub trait ChatPlatform: PlatformIntegration {
    async fn join_channel(&self, channel: &str) -> Result<(), Error>;
    async fn leave_channel(&self, channel: &str) -> Result<(), Error>;
}

// Re-export submodules
pub mod console;
