//! Sleep state rules. A sleeping channel suppresses every rule without
//! `sleep_override`, which is why `wake` must carry the override.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use murmelbot_common::error::Error;
use murmelbot_common::models::permission::Permission;
use murmelbot_common::traits::repository_traits::ChannelStateRepository;

use super::prefixed;
use crate::dispatch::{CommandEvent, Disposition, Rule, RuleHandler};
use crate::settings::BotSettings;

pub fn sleep(settings: &BotSettings) -> Result<Rule, Error> {
    Rule::builder("sleep")
        .pattern(prefixed(settings, "(shut up|go sleep)"))
        .pattern(prefixed(settings, "sei ruhig"))
        .permission(Permission::Moderator)
        .build(Arc::new(SleepHandler))
}

pub fn wake(settings: &BotSettings) -> Result<Rule, Error> {
    Rule::builder("wake")
        .pattern(prefixed(settings, "(wake up|wach auf)"))
        .permission(Permission::Moderator)
        .sleep_override()
        .build(Arc::new(WakeHandler))
}

struct SleepHandler;

#[async_trait]
impl RuleHandler for SleepHandler {
    async fn run(&self, event: &mut CommandEvent) -> Result<Disposition, Error> {
        info!(channel = %event.ctx.channel, "going to sleep");
        event.channels.set_sleeping(&event.ctx.channel, true).await?;
        Ok(Disposition::Handled)
    }
}

struct WakeHandler;

#[async_trait]
impl RuleHandler for WakeHandler {
    async fn run(&self, event: &mut CommandEvent) -> Result<Disposition, Error> {
        info!(channel = %event.ctx.channel, "waking up");
        event.channels.set_sleeping(&event.ctx.channel, false).await?;
        Ok(Disposition::Handled)
    }
}
