//! The rule dispatcher: decides, for every incoming chat message, which
//! single registered rule handles it, subject to permission, cooldown and
//! sleep suppression policy.

pub mod context;
pub mod cooldown;
pub mod event;
pub mod rule;

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, info};

use murmelbot_common::error::Error;
use murmelbot_common::traits::repository_traits::{
    ChannelStateRepository, UserRepository, VoicemailRepository,
};

pub use context::CommandContext;
pub use cooldown::{CooldownScope, CooldownTracker};
pub use event::{CommandEvent, Disposition, RuleHandler};
pub use rule::{GateRejection, Rule, RuleBuilder, RuleDirectory, RuleFlags};

use crate::platforms::ChatPlatform;
use crate::settings::BotSettings;

/// How one message fared against the full rule list.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// A rule's handler ran to completion; its name is carried for logs.
    Handled { rule: String },
    /// No rule reached `Handled`. Not an error condition.
    Unhandled,
    /// A handler failed; evaluation stopped at that rule.
    Failed { rule: String, error: Error },
}

impl DispatchOutcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, DispatchOutcome::Handled { .. })
    }
}

/// Owns the ordered rule list (append-only, fixed at startup) and the
/// collaborators handlers reach chat and state through. Evaluation may
/// run concurrently for different channels; the rule list itself is
/// read-only and each rule's cooldown tracker synchronizes internally.
pub struct Dispatcher {
    rules: Vec<Rule>,
    directory: Arc<RuleDirectory>,

    chat: Arc<dyn ChatPlatform>,
    channels: Arc<dyn ChannelStateRepository>,
    users: Arc<dyn UserRepository>,
    voicemails: Arc<dyn VoicemailRepository>,
    settings: Arc<BotSettings>,
}

impl Dispatcher {
    /// Validates the rule list (unique, non-empty names; patterns are
    /// validated at build time) and wires up the rule directory. A bad
    /// rule set is fatal at boot.
    pub fn new(
        rules: Vec<Rule>,
        chat: Arc<dyn ChatPlatform>,
        channels: Arc<dyn ChannelStateRepository>,
        users: Arc<dyn UserRepository>,
        voicemails: Arc<dyn VoicemailRepository>,
        settings: Arc<BotSettings>,
    ) -> Result<Self, Error> {
        let mut seen = HashSet::new();
        let mut directory = RuleDirectory::default();
        for rule in &rules {
            if !seen.insert(rule.name().to_string()) {
                return Err(Error::Config(format!(
                    "duplicate rule name '{}'",
                    rule.name()
                )));
            }
            directory.insert(rule.name(), rule.flags().clone());
        }

        Ok(Self {
            rules,
            directory: Arc::new(directory),
            chat,
            channels,
            users,
            voicemails,
            settings,
        })
    }

    pub fn directory(&self) -> Arc<RuleDirectory> {
        self.directory.clone()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Evaluates the rules in registration order and invokes at most one
    /// handler to completion. Gate rejections and pattern misses move on
    /// to the next rule; an explicit `Skip` from a handler does too, but
    /// without arming cooldowns. Cooldown timestamps are recorded only
    /// after a handler reports `Handled`.
    pub async fn evaluate(&self, ctx: &CommandContext) -> DispatchOutcome {
        for rule in &self.rules {
            if let Some(rejection) = rule.gate(ctx) {
                debug!(
                    rule = rule.name(),
                    channel = %ctx.channel,
                    invoker = %ctx.user_name,
                    "gate rejection: {rejection}"
                );
                continue;
            }

            let Some(captures) = rule.find_match(&ctx.text) else {
                continue;
            };

            debug!(
                rule = rule.name(),
                channel = %ctx.channel,
                invoker = %ctx.user_name,
                message = %ctx.text,
                "found matching rule"
            );

            let mut event = CommandEvent {
                ctx: ctx.clone(),
                captures,
                chat: self.chat.clone(),
                channels: self.channels.clone(),
                users: self.users.clone(),
                voicemails: self.voicemails.clone(),
                rules: self.directory.clone(),
                settings: self.settings.clone(),
            };

            match rule.handler().run(&mut event).await {
                Ok(Disposition::Handled) => {
                    rule.cooldown()
                        .record(&ctx.channel, &ctx.user_name, ctx.timestamp);
                    info!(
                        rule = rule.name(),
                        channel = %ctx.channel,
                        invoker = %ctx.user_name,
                        "rule handled message"
                    );
                    return DispatchOutcome::Handled {
                        rule: rule.name().to_string(),
                    };
                }
                Ok(Disposition::Skip) => {
                    debug!(rule = rule.name(), "rule skipped");
                    continue;
                }
                Err(error) => {
                    error!(
                        rule = rule.name(),
                        channel = %ctx.channel,
                        invoker = %ctx.user_name,
                        "rule handler failed: {error}"
                    );
                    return DispatchOutcome::Failed {
                        rule: rule.name().to_string(),
                        error,
                    };
                }
            }
        }

        DispatchOutcome::Unhandled
    }
}
