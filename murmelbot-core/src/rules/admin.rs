//! Channel management and the owner-only debug rule. The debug rule is
//! the only mutator of rule flags after startup.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use murmelbot_common::error::Error;
use murmelbot_common::models::permission::Permission;
use murmelbot_common::traits::repository_traits::ChannelStateRepository;

use super::{bot_alias, prefixed};
use crate::dispatch::{CommandEvent, Disposition, Rule, RuleHandler};
use crate::platforms::ChatPlatform;
use crate::settings::BotSettings;

pub fn join(settings: &BotSettings) -> Result<Rule, Error> {
    Rule::builder("join")
        .pattern(prefixed(settings, r"join (my channel|\w+)$"))
        .build(Arc::new(JoinHandler))
}

pub fn leave(settings: &BotSettings) -> Result<Rule, Error> {
    Rule::builder("leave")
        .pattern(format!(
            "(?i)^{} leave this channel pls$",
            bot_alias(settings)
        ))
        .permission(Permission::Moderator)
        .sleep_override()
        .build(Arc::new(LeaveHandler))
}

pub fn leave_remote(settings: &BotSettings) -> Result<Rule, Error> {
    Rule::builder("leave remote")
        .pattern(prefixed(settings, r"leave (\w+)$"))
        .build(Arc::new(LeaveRemoteHandler))
}

pub fn lurk(settings: &BotSettings) -> Result<Rule, Error> {
    Rule::builder("lurk")
        .pattern(prefixed(settings, r"lurk in (\w+)$"))
        .permission(Permission::Moderator)
        .build(Arc::new(LurkHandler))
}

pub fn debug(settings: &BotSettings) -> Result<Rule, Error> {
    Rule::builder("debug")
        .pattern(prefixed(settings, r"debug (\S+)(?: (\S+))?(?: (\S+))?"))
        .permission(Permission::Owner)
        .build(Arc::new(DebugHandler))
}

struct JoinHandler;

#[async_trait]
impl RuleHandler for JoinHandler {
    async fn run(&self, event: &mut CommandEvent) -> Result<Disposition, Error> {
        if !event.ctx.is_bot_channel {
            return Ok(Disposition::Skip);
        }

        let requested = event.group(1).to_lowercase();
        let target = if requested == "my channel" {
            event.ctx.user_name.clone()
        } else if event.ctx.permission >= Permission::Owner {
            requested
        } else {
            // Joining arbitrary channels is the owner's call; everyone
            // else gets no reaction.
            return Ok(Disposition::Handled);
        };

        if event.channels.is_joined(&target).await? {
            event.say("I'm already in that channel.").await?;
            return Ok(Disposition::Handled);
        }

        info!(channel = %target, "joining new channel");
        event.chat.join_channel(&target).await?;
        event.channels.set_joined(&target, true).await?;
        event
            .say(&format!(
                "I joined {target}. Type `{}leave {target}` and I'll leave.",
                event.settings.prefix()
            ))
            .await?;
        Ok(Disposition::Handled)
    }
}

struct LeaveHandler;

#[async_trait]
impl RuleHandler for LeaveHandler {
    async fn run(&self, event: &mut CommandEvent) -> Result<Disposition, Error> {
        let channel = event.ctx.channel.clone();
        info!(%channel, "leaving channel");
        event.say("ppPoof").await?;
        event.chat.leave_channel(&channel).await?;
        event.channels.set_joined(&channel, false).await?;
        Ok(Disposition::Handled)
    }
}

struct LeaveRemoteHandler;

#[async_trait]
impl RuleHandler for LeaveRemoteHandler {
    async fn run(&self, event: &mut CommandEvent) -> Result<Disposition, Error> {
        if !event.ctx.is_bot_channel {
            return Ok(Disposition::Skip);
        }

        let target = event.group(1).to_lowercase();
        if event.ctx.permission >= Permission::Owner || event.ctx.user_name == target {
            info!(channel = %target, "leaving channel");
            event.chat.leave_channel(&target).await?;
            event.channels.set_joined(&target, false).await?;
            event.say(&format!("I left {target}.")).await?;
        }
        Ok(Disposition::Handled)
    }
}

struct LurkHandler;

#[async_trait]
impl RuleHandler for LurkHandler {
    async fn run(&self, event: &mut CommandEvent) -> Result<Disposition, Error> {
        if !event.ctx.is_bot_channel {
            return Ok(Disposition::Handled);
        }

        let target = event.group(1).to_lowercase();
        info!(channel = %target, "lurking in new channel");
        event.chat.join_channel(&target).await?;
        event.channels.set_lurking(&target, true).await?;
        event.channels.set_joined(&target, true).await?;
        event.say(&format!("I'm lurking in {target} now.")).await?;
        Ok(Disposition::Handled)
    }
}

struct DebugHandler;

#[async_trait]
impl RuleHandler for DebugHandler {
    async fn run(&self, event: &mut CommandEvent) -> Result<Disposition, Error> {
        let action = event.group(1).to_lowercase();
        match action.as_str() {
            "enable" => {
                event.settings.set_debug(true);
                info!("enabled debugging");
                event.say("Enabled debugging").await?;
            }
            "disable" => {
                event.settings.set_debug(false);
                info!("disabled debugging");
                event.say("Disabled debugging").await?;
            }
            "enable-rule" | "disable-rule" => {
                let name = event.group(2).to_string();
                if name.is_empty() {
                    event.say(&format!("Usage: {action} <rule> [#channel]")).await?;
                    return Ok(Disposition::Handled);
                }
                let disable = action == "disable-rule";
                let channel = event.group(3).trim_start_matches('#').to_lowercase();

                let found = if channel.is_empty() {
                    event.rules.set_enabled(&name, !disable)
                } else {
                    event.rules.set_disabled_in(&name, &channel, disable)
                };

                if !found {
                    event.say(&format!("I don't know a rule named '{name}'.")).await?;
                    return Ok(Disposition::Handled);
                }

                let verb = if disable { "Disabled" } else { "Enabled" };
                info!(rule = %name, %channel, "{} rule", verb.to_lowercase());
                if channel.is_empty() {
                    event.say(&format!("{verb} rule '{name}'.")).await?;
                } else {
                    event.say(&format!("{verb} rule '{name}' in #{channel}.")).await?;
                }
            }
            other => {
                warn!(action = other, "unknown debug action");
            }
        }
        Ok(Disposition::Handled)
    }
}
