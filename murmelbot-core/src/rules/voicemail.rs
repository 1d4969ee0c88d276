use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use murmelbot_common::error::Error;
use murmelbot_common::models::voicemail::Voicemail;
use murmelbot_common::traits::repository_traits::VoicemailRepository;

use super::prefixed;
use crate::dispatch::{CommandEvent, Disposition, Rule, RuleHandler};
use crate::settings::BotSettings;
use crate::utils::text::join_natural;

const SEPARATOR: &str = " && ";
const MAX_MESSAGE_CHARS: usize = 400;

pub fn voicemail(settings: &BotSettings) -> Result<Rule, Error> {
    Rule::builder("voicemail")
        .pattern(prefixed(settings, r"tell ((\w+)( && (\w+))*) (.*)"))
        .user_cooldown(Duration::from_secs(30))
        .build(Arc::new(VoicemailHandler))
}

struct VoicemailHandler;

#[async_trait]
impl RuleHandler for VoicemailHandler {
    async fn run(&self, event: &mut CommandEvent) -> Result<Disposition, Error> {
        let message = event.group(5).to_string();
        let recipients: Vec<String> = event
            .group(1)
            .split(SEPARATOR)
            .map(str::to_lowercase)
            .filter(|name| name != event.settings.bot_name())
            .filter(|name| *name != event.ctx.user_name)
            .collect();

        if recipients.is_empty() {
            event
                .say("I will not send a message to those recipients")
                .await?;
            return Err(Error::Handler("no valid voicemail recipient".into()));
        }

        if message.chars().count() >= MAX_MESSAGE_CHARS {
            event.say("I'm sorry but your message is too long").await?;
            return Err(Error::Handler("voicemail message too long".into()));
        }

        info!(
            recipients = ?recipients,
            voicemail = %message,
            creator = %event.ctx.user_name,
            "leaving a voicemail"
        );

        for recipient in &recipients {
            event
                .voicemails
                .put(Voicemail {
                    created: event.ctx.timestamp,
                    channel: event.ctx.channel.clone(),
                    creator: event.ctx.user_name.clone(),
                    recipient: recipient.clone(),
                    message: message.clone(),
                })
                .await?;
        }

        event
            .say(&format!(
                "I'll forward this message to {} when they type in chat.",
                join_natural(&recipients)
            ))
            .await?;
        Ok(Disposition::Handled)
    }
}
