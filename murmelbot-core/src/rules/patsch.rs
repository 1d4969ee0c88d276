//! Fish-patting: a once-a-day streak counter confined to one channel.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use murmelbot_common::error::Error;
use murmelbot_common::models::user::PatschResult;
use murmelbot_common::traits::repository_traits::UserRepository;

use super::prefixed;
use crate::dispatch::{CommandEvent, Disposition, Rule, RuleHandler};
use crate::settings::BotSettings;

pub fn patscheck(settings: &BotSettings) -> Result<Rule, Error> {
    Rule::builder("patscheck")
        .pattern(prefixed(settings, r"hihsg\?"))
        .build(Arc::new(PatscheckHandler))
}

pub fn patsch(_settings: &BotSettings) -> Result<Rule, Error> {
    Rule::builder("patsch")
        .pattern("fischPatsch|fishPat")
        .build(Arc::new(PatschHandler))
}

struct PatscheckHandler;

#[async_trait]
impl RuleHandler for PatscheckHandler {
    async fn run(&self, event: &mut CommandEvent) -> Result<Disposition, Error> {
        let user = event
            .users
            .get_by_id(&event.ctx.user_id)
            .await?
            .ok_or_else(|| Error::State(format!("unknown user id '{}'", event.ctx.user_id)))?;

        info!(user = %user.name, "checking patscher");

        if user.patsch_count == 0 {
            event
                .say("You've never patted the fish before. You should do that now.")
                .await?;
            return Ok(Disposition::Handled);
        }

        let lead = if user.has_patsched_today(event.ctx.timestamp) {
            "You already patted today."
        } else {
            "You have not yet patted today."
        };
        let streak = if user.patsch_streak == 0 {
            "You don't have a streak ongoing.".to_string()
        } else {
            format!("Your current streak is {}.", user.patsch_streak)
        };

        event
            .say(&format!(
                "{lead} {streak} In total you patted {} times.",
                user.patsch_count
            ))
            .await?;
        Ok(Disposition::Handled)
    }
}

struct PatschHandler;

#[async_trait]
impl RuleHandler for PatschHandler {
    async fn run(&self, event: &mut CommandEvent) -> Result<Disposition, Error> {
        let in_patsch_channel = event.ctx.channel == event.settings.patsch_channel();
        let in_debug_playground = event.settings.debug_enabled() && event.ctx.is_bot_channel;
        if !in_patsch_channel && !in_debug_playground {
            return Ok(Disposition::Skip);
        }

        let hits =
            event.ctx.text.matches("fischPatsch").count() + event.ctx.text.matches("fishPat").count();
        if hits > 1 {
            event
                .say(&format!(
                    "/timeout {} 1 Wenn du so viel patschst wird das ne Flunder.",
                    event.ctx.user_name
                ))
                .await?;
            return Ok(Disposition::Handled);
        }

        match event.users.patsch(&event.ctx.user_id, event.ctx.timestamp).await? {
            PatschResult::AlreadyPatsched => {
                event.say("Du hast heute schon gepatscht.").await?;
            }
            PatschResult::Counted => {
                info!(user = %event.ctx.user_name, "patsch!");
            }
            PatschResult::StreakBroken => {
                info!(user = %event.ctx.user_name, "patsch after a break, streak reset");
            }
        }
        Ok(Disposition::Handled)
    }
}
