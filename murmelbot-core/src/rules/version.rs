use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use murmelbot_common::error::Error;

use super::{bot_alias, prefixed};
use crate::dispatch::{CommandEvent, Disposition, Rule, RuleHandler};
use crate::settings::BotSettings;

pub fn version(settings: &BotSettings) -> Result<Rule, Error> {
    Rule::builder("version")
        .pattern(format!(r"(?i)^{}\?", bot_alias(settings)))
        .pattern(prefixed(settings, "version"))
        .build(Arc::new(VersionHandler))
}

struct VersionHandler;

#[async_trait]
impl RuleHandler for VersionHandler {
    async fn run(&self, event: &mut CommandEvent) -> Result<Disposition, Error> {
        info!("sending version");
        event
            .say(&format!(
                "I'm a chat bot written in Rust. Current version is {}.",
                event.settings.version()
            ))
            .await?;
        Ok(Disposition::Handled)
    }
}
