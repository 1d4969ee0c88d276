use chrono::{DateTime, Utc};

use murmelbot_common::models::permission::Permission;

use crate::platforms::ChatMessageEvent;
use crate::settings::BotSettings;

/// Everything a single evaluation pass needs to know about one incoming
/// message. Built fresh per message and treated as immutable afterwards,
/// so the same context always yields the same gate decisions.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub user_id: String,
    /// Login name, lowercase.
    pub user_name: String,
    pub display_name: String,
    pub channel: String,

    pub raw_text: String,
    /// Trimmed text with the Twitch dedup tag stripped; patterns run
    /// against this.
    pub text: String,

    pub permission: Permission,
    /// Snapshot of the channel's sleeping flag, taken once before the
    /// evaluation pass. A wake command only affects later messages.
    pub sleeping: bool,
    pub is_bot: bool,
    pub is_bot_channel: bool,
    pub is_timed_out: bool,

    pub timestamp: DateTime<Utc>,
}

impl CommandContext {
    /// Builds a context from an inbound message event. `sleeping` and
    /// `is_timed_out` come from the state collaborators and are passed in
    /// by the ingestion service.
    pub fn from_event(
        event: &ChatMessageEvent,
        settings: &BotSettings,
        sleeping: bool,
        is_timed_out: bool,
    ) -> Self {
        let text = event.text.replace('\u{e0000}', "");
        let text = text.trim().to_string();

        Self {
            user_id: event.user_id.clone(),
            user_name: event.user_name.to_lowercase(),
            display_name: event.display_name.clone(),
            channel: event.channel.clone(),
            raw_text: event.text.clone(),
            text,
            permission: derive_permission(event, settings.owner_id()),
            sleeping,
            is_bot: settings.is_known_bot(&event.user_name),
            is_bot_channel: event.channel.eq_ignore_ascii_case(settings.bot_name()),
            is_timed_out,
            timestamp: event.timestamp,
        }
    }
}

/// Derives the sender's permission level, evaluated strictly from the
/// highest rung down; the first match wins. A broadcaster who also wears
/// the moderator badge therefore resolves to `Broadcaster`. The `Regular`
/// rung is reserved and never assigned.
pub fn derive_permission(event: &ChatMessageEvent, owner_id: &str) -> Permission {
    if event.user_id == owner_id {
        Permission::Owner
    } else if event.user_name.eq_ignore_ascii_case(&event.channel) {
        Permission::Broadcaster
    } else if event.is_moderator {
        Permission::Moderator
    } else if event.is_subscriber {
        Permission::Subscriber
    } else {
        Permission::Everyone
    }
}
