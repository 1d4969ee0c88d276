use std::sync::Arc;

use tracing::{debug, info};

use murmelbot_common::error::Error;
use murmelbot_common::models::voicemail::Voicemail;
use murmelbot_common::traits::repository_traits::{
    ChannelStateRepository, UserRepository, VoicemailRepository,
};

use crate::dispatch::{CommandContext, DispatchOutcome, Dispatcher};
use crate::platforms::{ChatMessageEvent, ChatPlatform, PlatformIntegration};
use crate::settings::BotSettings;
use crate::utils::swear_filter::SwearFilter;
use crate::utils::text::{pluralize, truncate};

/// Chat messages never exceed this, so replayed voicemails are batched
/// into lines below it.
const MAX_LINE_CHARS: usize = 400;

/// Ingests inbound chat messages: bookkeeping, the pre-dispatch drops
/// (own messages, lurked channels, filtered words), context construction,
/// dispatch, and voicemail replay afterwards.
pub struct MessageService {
    dispatcher: Arc<Dispatcher>,
    chat: Arc<dyn ChatPlatform>,
    channels: Arc<dyn ChannelStateRepository>,
    users: Arc<dyn UserRepository>,
    voicemails: Arc<dyn VoicemailRepository>,
    filter: SwearFilter,
    settings: Arc<BotSettings>,
}

impl MessageService {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        chat: Arc<dyn ChatPlatform>,
        channels: Arc<dyn ChannelStateRepository>,
        users: Arc<dyn UserRepository>,
        voicemails: Arc<dyn VoicemailRepository>,
        filter: SwearFilter,
        settings: Arc<BotSettings>,
    ) -> Self {
        debug!("MessageService::new() called");
        Self {
            dispatcher,
            chat,
            channels,
            users,
            voicemails,
            filter,
            settings,
        }
    }

    /// Processes one inbound message:
    ///  1. Ignores the bot's own messages.
    ///  2. Upserts the sender (name, display name, last-seen).
    ///  3. Drops the message if the channel is lurk-muted.
    ///  4. Snapshots the sleeping flag for this evaluation pass.
    ///  5. Drops the message if the word filter matches.
    ///  6. Builds the context and lets the dispatcher evaluate it.
    ///  7. Replays the sender's voicemails if the channel is awake and
    ///     the sender is not timed out.
    pub async fn process_incoming_message(
        &self,
        event: &ChatMessageEvent,
    ) -> Result<DispatchOutcome, Error> {
        if event.user_name.eq_ignore_ascii_case(self.settings.bot_name()) {
            return Ok(DispatchOutcome::Unhandled);
        }

        let user = self
            .users
            .bump_user(
                &event.user_id,
                &event.user_name.to_lowercase(),
                &event.display_name,
                event.timestamp,
            )
            .await?;

        if self.channels.is_lurking(&event.channel).await? {
            return Ok(DispatchOutcome::Unhandled);
        }

        let sleeping = self.channels.is_sleeping(&event.channel).await?;

        let found = self.filter.matches(&event.text);
        if !found.is_empty() {
            info!(
                channel = %event.channel,
                user = %event.user_name,
                words = ?found,
                "dropping message with forbidden words"
            );
            return Ok(DispatchOutcome::Unhandled);
        }

        let is_timed_out = user.is_timed_out(event.timestamp);
        let ctx = CommandContext::from_event(event, &self.settings, sleeping, is_timed_out);

        let outcome = self.dispatcher.evaluate(&ctx).await;

        if !sleeping && !is_timed_out {
            self.deliver_voicemails(&ctx.user_name, &ctx.channel).await?;
        }

        Ok(outcome)
    }

    async fn deliver_voicemails(&self, user_name: &str, channel: &str) -> Result<(), Error> {
        let mail = self.voicemails.pop(user_name).await?;
        if mail.is_empty() {
            return Ok(());
        }

        info!(count = mail.len(), user = %user_name, "replaying voicemails");
        for line in batch_voicemails(user_name, &mail) {
            self.chat.send_message(channel, &line).await?;
        }
        Ok(())
    }
}

/// Renders voicemails into chat lines: an addressed header, then the
/// mails in order joined with " — ", starting a new line whenever the
/// next mail would push past the length cap. An oversized single mail is
/// truncated rather than split.
pub(crate) fn batch_voicemails(recipient: &str, voicemails: &[Voicemail]) -> Vec<String> {
    if voicemails.is_empty() {
        return Vec::new();
    }

    let mut lines = Vec::new();
    let mut current = format!(
        "@{recipient}, {} for you: ",
        pluralize(voicemails.len(), "message")
    );
    let mut line_has_mail = false;

    for voicemail in voicemails {
        let rendered = truncate(&voicemail.to_string(), MAX_LINE_CHARS);
        let rendered_len = rendered.chars().count();

        if !line_has_mail {
            let room = MAX_LINE_CHARS.saturating_sub(current.chars().count());
            current.push_str(&truncate(&rendered, room));
            line_has_mail = true;
            continue;
        }

        if current.chars().count() + 3 + rendered_len > MAX_LINE_CHARS {
            lines.push(std::mem::take(&mut current));
            current = rendered;
        } else {
            current.push_str(" — ");
            current.push_str(&rendered);
        }
    }
    lines.push(current);

    lines
}
