use std::sync::Arc;

use async_trait::async_trait;

use murmelbot_common::error::Error;
use murmelbot_common::traits::repository_traits::{
    ChannelStateRepository, UserRepository, VoicemailRepository,
};

use super::context::CommandContext;
use super::rule::RuleDirectory;
use crate::platforms::{ChatPlatform, PlatformIntegration};
use crate::settings::BotSettings;

/// Outcome of one handler invocation. `Handled` stops the evaluation
/// loop and arms the rule's cooldowns; `Skip` is an explicit deferral to
/// later rules, recording nothing. Failures travel as `Err` and also stop
/// the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Handled,
    Skip,
}

/// Business logic bound to a rule.
#[async_trait]
pub trait RuleHandler: Send + Sync {
    async fn run(&self, event: &mut CommandEvent) -> Result<Disposition, Error>;
}

/// Handed to a handler once its rule matched: the message context, the
/// captured groups of the winning pattern, and the collaborators the
/// handler may produce side effects through.
pub struct CommandEvent {
    pub ctx: CommandContext,
    /// Whole match at index 0; unmatched groups are empty strings.
    pub captures: Vec<String>,

    pub chat: Arc<dyn ChatPlatform>,
    pub channels: Arc<dyn ChannelStateRepository>,
    pub users: Arc<dyn UserRepository>,
    pub voicemails: Arc<dyn VoicemailRepository>,
    pub rules: Arc<RuleDirectory>,
    pub settings: Arc<BotSettings>,
}

impl CommandEvent {
    /// Sends `message` to the channel the triggering message came from.
    pub async fn say(&self, message: &str) -> Result<(), Error> {
        self.chat.send_message(&self.ctx.channel, message).await
    }

    /// Returns capture group `index`, or the empty string when the group
    /// did not participate in the match.
    pub fn group(&self, index: usize) -> &str {
        self.captures.get(index).map(String::as_str).unwrap_or("")
    }
}
