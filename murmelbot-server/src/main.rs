use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use murmelbot_common::models::rule::RuleOverride;
use murmelbot_common::traits::repository_traits::ChannelStateRepository;
use murmelbot_core::dispatch::{Dispatcher, Rule};
use murmelbot_core::platforms::console::ConsolePlatform;
use murmelbot_core::platforms::{ChatPlatform, PlatformIntegration};
use murmelbot_core::repositories::{
    MemoryChannelStateRepository, MemoryUserRepository, MemoryVoicemailRepository,
};
use murmelbot_core::rules::builtin_rules;
use murmelbot_core::services::MessageService;
use murmelbot_core::settings::BotSettings;
use murmelbot_core::utils::SwearFilter;
use murmelbot_core::Error;

mod config;
use config::Config;

#[derive(Parser, Debug)]
#[command(name = "murmelbot")]
#[command(author, version, about = "murmelbot - rule-dispatching chat bot")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable debugging. Sets the log level to debug.
    #[arg(long)]
    debug: bool,
}

/// Applies `[rules.<name>]` config overrides to the freshly built rule
/// list. Naming an unknown rule is a configuration error.
fn apply_rule_overrides(
    rules: &[Rule],
    overrides: &HashMap<String, RuleOverride>,
) -> Result<(), Error> {
    for (name, rule_override) in overrides {
        let rule = rules
            .iter()
            .find(|r| r.name() == name)
            .ok_or_else(|| Error::Config(format!("override for unknown rule '{name}'")))?;
        if let Some(enabled) = rule_override.enabled {
            rule.flags().set_enabled(enabled);
        }
        for channel in &rule_override.disabled_channels {
            rule.flags().set_disabled_in(channel, true);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.debug { "debug" } else { "info" }));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::load(&args.config)?;
    info!(config = %args.config.display(), "starting murmelbot {}", env!("CARGO_PKG_VERSION"));

    let settings = Arc::new(BotSettings::new(
        config.bot.username.as_str(),
        config.bot.owner_id.as_str(),
        config.bot.prefix.as_str(),
        config.bot.patsch_channel.as_str(),
        config.bot.known_bots.clone(),
        env!("CARGO_PKG_VERSION"),
        args.debug,
    ));

    let channels = Arc::new(MemoryChannelStateRepository::new());
    let users = Arc::new(MemoryUserRepository::new());
    let voicemails = Arc::new(MemoryVoicemailRepository::new());

    let mut platform = ConsolePlatform::new();
    platform.connect().await?;
    let mut rx = platform
        .take_receiver()
        .context("console platform has no message receiver")?;
    let chat: Arc<dyn ChatPlatform> = Arc::new(platform);

    let rules = builtin_rules(&settings)?;
    apply_rule_overrides(&rules, &config.rules)?;
    info!(count = rules.len(), "registered rules");

    let dispatcher = Arc::new(Dispatcher::new(
        rules,
        chat.clone(),
        channels.clone(),
        users.clone(),
        voicemails.clone(),
        settings.clone(),
    )?);

    let service = MessageService::new(
        dispatcher,
        chat.clone(),
        channels.clone(),
        users,
        voicemails,
        SwearFilter::new(&config.filter.swears)?,
        settings.clone(),
    );

    // The bot always sits in its own channel; that is where admin
    // commands land.
    chat.join_channel(settings.bot_name()).await?;
    channels.set_joined(settings.bot_name(), true).await?;
    for channel in &config.bot.channels {
        chat.join_channel(channel).await?;
        channels.set_joined(channel, true).await?;
    }

    info!("connected, reading messages");
    loop {
        tokio::select! {
            maybe_event = rx.recv() => match maybe_event {
                Some(event) => {
                    if let Err(e) = service.process_incoming_message(&event).await {
                        error!("could not process message: {e}");
                    }
                }
                None => {
                    info!("message stream closed");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("received interrupt, shutting down");
                break;
            }
        }
    }

    Ok(())
}
