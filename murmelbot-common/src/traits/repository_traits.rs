use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Error;
use crate::models::user::{ChatUser, PatschResult};
use crate::models::voicemail::Voicemail;

/// Per-channel bot state: sleep suppression, lurk muting and channel
/// membership. The dispatch core only ever reads this; toggling happens
/// through moderator rules.
#[async_trait]
pub trait ChannelStateRepository: Send + Sync {
    async fn is_sleeping(&self, channel: &str) -> Result<bool, Error>;
    async fn set_sleeping(&self, channel: &str, sleeping: bool) -> Result<(), Error>;

    async fn is_lurking(&self, channel: &str) -> Result<bool, Error>;
    async fn set_lurking(&self, channel: &str, lurking: bool) -> Result<(), Error>;

    async fn is_joined(&self, channel: &str) -> Result<bool, Error>;
    async fn set_joined(&self, channel: &str, joined: bool) -> Result<(), Error>;
    async fn joined_channels(&self) -> Result<Vec<String>, Error>;
}

/// User identity and moderation state keyed by the platform sender id.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Upserts the user: name, display name and last-seen are refreshed,
    /// first-seen is set on insert. Returns the stored user.
    async fn bump_user(
        &self,
        user_id: &str,
        name: &str,
        display_name: &str,
        seen_at: DateTime<Utc>,
    ) -> Result<ChatUser, Error>;

    async fn get_by_id(&self, user_id: &str) -> Result<Option<ChatUser>, Error>;

    async fn timeout_user(&self, user_id: &str, until: DateTime<Utc>) -> Result<(), Error>;
    async fn is_timed_out(&self, user_id: &str, now: DateTime<Utc>) -> Result<bool, Error>;

    /// Advances the user's patsch streak and persists the new counters.
    async fn patsch(&self, user_id: &str, now: DateTime<Utc>) -> Result<PatschResult, Error>;
}

/// Stored messages awaiting replay.
#[async_trait]
pub trait VoicemailRepository: Send + Sync {
    async fn put(&self, voicemail: Voicemail) -> Result<(), Error>;

    /// Returns and removes all voicemails addressed to `recipient`,
    /// oldest first.
    async fn pop(&self, recipient: &str) -> Result<Vec<Voicemail>, Error>;
}
