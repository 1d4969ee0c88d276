//! Shared doubles and fixtures for the unit and integration tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;

use murmelbot_common::error::Error;
use murmelbot_common::models::permission::Permission;

use crate::dispatch::CommandContext;
use crate::platforms::{ChatMessageEvent, ChatPlatform, ConnectionStatus, PlatformIntegration};

/// A chat transport that records everything instead of sending it.
#[derive(Debug, Default)]
pub struct RecordingChat {
    sent: Mutex<Vec<(String, String)>>,
    joined: Mutex<Vec<String>>,
    left: Mutex<Vec<String>>,
}

impl RecordingChat {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// `(channel, message)` pairs in send order.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().clone()
    }

    pub fn sent_to(&self, channel: &str) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter(|(c, _)| c == channel)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn joined(&self) -> Vec<String> {
        self.joined.lock().clone()
    }

    pub fn left(&self) -> Vec<String> {
        self.left.lock().clone()
    }
}

#[async_trait]
impl PlatformIntegration for RecordingChat {
    async fn connect(&mut self) -> Result<(), Error> {
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), Error> {
        Ok(())
    }

    async fn send_message(&self, channel: &str, message: &str) -> Result<(), Error> {
        self.sent
            .lock()
            .push((channel.to_string(), message.to_string()));
        Ok(())
    }

    async fn get_connection_status(&self) -> Result<ConnectionStatus, Error> {
        Ok(ConnectionStatus::Connected)
    }
}

#[async_trait]
impl ChatPlatform for RecordingChat {
    async fn join_channel(&self, channel: &str) -> Result<(), Error> {
        self.joined.lock().push(channel.to_string());
        Ok(())
    }

    async fn leave_channel(&self, channel: &str) -> Result<(), Error> {
        self.left.lock().push(channel.to_string());
        Ok(())
    }
}

/// Fixed instant used by fixtures so cooldown tests can do arithmetic.
pub fn fixture_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// A plain message event: no badges, sent at [`fixture_time`].
pub fn message_event(channel: &str, user: &str, text: &str) -> ChatMessageEvent {
    ChatMessageEvent {
        channel: channel.to_string(),
        user_id: user.to_lowercase(),
        user_name: user.to_lowercase(),
        display_name: user.to_string(),
        text: text.to_string(),
        is_moderator: false,
        is_subscriber: false,
        timestamp: fixture_time(),
    }
}

/// A ready-made context with `Everyone` permission and all flags clear.
pub fn context_for(channel: &str, user: &str, text: &str) -> CommandContext {
    CommandContext {
        user_id: user.to_lowercase(),
        user_name: user.to_lowercase(),
        display_name: user.to_string(),
        channel: channel.to_string(),
        raw_text: text.to_string(),
        text: text.trim().to_string(),
        permission: Permission::Everyone,
        sleeping: false,
        is_bot: false,
        is_bot_channel: false,
        is_timed_out: false,
        timestamp: fixture_time(),
    }
}
