//! Conversational reactions: greetings and chat in-jokes.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use murmelbot_common::error::Error;

use crate::dispatch::{CommandEvent, Disposition, Rule, RuleHandler};
use crate::settings::BotSettings;

pub fn hello(settings: &BotSettings) -> Result<Rule, Error> {
    Rule::builder("hello")
        .pattern(format!(
            "(?i)(hey|hi|h[ea]llo) @?{}",
            regex::escape(settings.bot_name())
        ))
        .build(Arc::new(HelloHandler))
}

pub fn stirnbot(_settings: &BotSettings) -> Result<Rule, Error> {
    Rule::builder("stirnbot greeting")
        .pattern("^I'm here FeelsGoodMan$")
        .react_to_bots()
        .build(Arc::new(StirnbotHandler))
}

pub fn scambot(_settings: &BotSettings) -> Result<Rule, Error> {
    Rule::builder("scambot")
        .pattern(r"(?i)\bscambot\b")
        .build(Arc::new(ScambotHandler))
}

struct HelloHandler;

#[async_trait]
impl RuleHandler for HelloHandler {
    async fn run(&self, event: &mut CommandEvent) -> Result<Disposition, Error> {
        info!(user = %event.ctx.display_name, "greeting");
        event
            .say(&format!("Hello {}👋", event.ctx.display_name))
            .await?;
        Ok(Disposition::Handled)
    }
}

struct StirnbotHandler;

#[async_trait]
impl RuleHandler for StirnbotHandler {
    async fn run(&self, event: &mut CommandEvent) -> Result<Disposition, Error> {
        // Generic check-in phrase; only one specific bot gets the salute,
        // everyone else falls through to later rules.
        if event.ctx.user_name != "stirnbot" {
            return Ok(Disposition::Skip);
        }
        info!("greeting StirnBot");
        event.say("StirnBot MrDestructoid /").await?;
        Ok(Disposition::Handled)
    }
}

struct ScambotHandler;

#[async_trait]
impl RuleHandler for ScambotHandler {
    async fn run(&self, event: &mut CommandEvent) -> Result<Disposition, Error> {
        info!("not a scambot");
        event.say("FeelsNotsureMan").await?;
        Ok(Disposition::Handled)
    }
}
