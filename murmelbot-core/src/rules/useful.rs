use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use sha2::{Digest, Sha256};
use tracing::info;

use murmelbot_common::error::Error;
use murmelbot_common::models::permission::Permission;

use super::prefixed;
use crate::dispatch::{CommandEvent, Disposition, Rule, RuleHandler};
use crate::settings::BotSettings;

pub fn vanish(_settings: &BotSettings) -> Result<Rule, Error> {
    Rule::builder("vanish")
        .pattern(r"^!vanish")
        .permission(Permission::Moderator)
        .build(Arc::new(VanishHandler))
}

pub fn circumflex(_settings: &BotSettings) -> Result<Rule, Error> {
    Rule::builder("circumflex")
        .pattern(r"^\^")
        .channel_cooldown(Duration::from_secs(10))
        .user_cooldown(Duration::from_secs(30))
        .react_to_bots()
        .build(Arc::new(CircumflexHandler))
}

pub fn ping(settings: &BotSettings) -> Result<Rule, Error> {
    Rule::builder("ping")
        .pattern(prefixed(settings, "ping"))
        .build(Arc::new(PingHandler))
}

pub fn rate(settings: &BotSettings) -> Result<Rule, Error> {
    Rule::builder("rate")
        .pattern(prefixed(settings, "rate (.*)$"))
        .build(Arc::new(RateHandler))
}

pub fn time(_settings: &BotSettings) -> Result<Rule, Error> {
    Rule::builder("time")
        .pattern(r"(?i)what time is it\?")
        .build(Arc::new(TimeHandler))
}

struct VanishHandler;

#[async_trait]
impl RuleHandler for VanishHandler {
    async fn run(&self, event: &mut CommandEvent) -> Result<Disposition, Error> {
        info!(user = %event.ctx.user_name, "explaining !vanish");
        event
            .say(&format!("Try /unmod {} first weSmart", event.ctx.user_name))
            .await?;
        Ok(Disposition::Handled)
    }
}

struct CircumflexHandler;

#[async_trait]
impl RuleHandler for CircumflexHandler {
    async fn run(&self, event: &mut CommandEvent) -> Result<Disposition, Error> {
        // Defer bot-sent carets to later rules instead of echoing back
        // and forth between bots.
        if event.ctx.is_bot {
            return Ok(Disposition::Skip);
        }
        event.say("^").await?;
        Ok(Disposition::Handled)
    }
}

struct PingHandler;

#[async_trait]
impl RuleHandler for PingHandler {
    async fn run(&self, event: &mut CommandEvent) -> Result<Disposition, Error> {
        event.say("pong").await?;
        Ok(Disposition::Handled)
    }
}

struct RateHandler;

/// Deterministic 0.0–10.0 rating derived from a digest of the key, so
/// repeated questions get the same verdict.
fn rate_key(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    let rating = (u64::from_be_bytes(head) % 101) as f64 / 10.0;
    format!("{rating:.1}")
}

#[async_trait]
impl RuleHandler for RateHandler {
    async fn run(&self, event: &mut CommandEvent) -> Result<Disposition, Error> {
        let key = event.group(1).to_string();
        let rating = rate_key(&key);
        info!(%key, %rating, "rating something");
        event.say(&format!("I rate {key} {rating}/10")).await?;
        Ok(Disposition::Handled)
    }
}

struct TimeHandler;

#[async_trait]
impl RuleHandler for TimeHandler {
    async fn run(&self, event: &mut CommandEvent) -> Result<Disposition, Error> {
        info!("checking the time");
        event
            .say(&format!(
                "The current time is: {}",
                Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
            ))
            .await?;
        Ok(Disposition::Handled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_is_deterministic_and_bounded() {
        assert_eq!(rate_key("tea"), rate_key("tea"));
        for key in ["tea", "coffee", "mate", ""] {
            let rating: f64 = rate_key(key).parse().unwrap();
            assert!((0.0..=10.0).contains(&rating), "{key} rated {rating}");
        }
    }
}
