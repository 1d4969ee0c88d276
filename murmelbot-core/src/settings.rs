use std::sync::atomic::{AtomicBool, Ordering};

/// Immutable bot identity plus the one runtime-togglable flag (debug).
/// Constructed once at startup from configuration and shared behind an
/// `Arc` with the dispatcher, the rules and the ingestion service.
#[derive(Debug)]
pub struct BotSettings {
    bot_name: String,
    owner_id: String,
    prefix: String,
    patsch_channel: String,
    known_bots: Vec<String>,
    version: String,
    debug: AtomicBool,
}

impl BotSettings {
    pub fn new(
        bot_name: impl Into<String>,
        owner_id: impl Into<String>,
        prefix: impl Into<String>,
        patsch_channel: impl Into<String>,
        known_bots: Vec<String>,
        version: impl Into<String>,
        debug: bool,
    ) -> Self {
        let bot_name: String = bot_name.into();
        let patsch_channel: String = patsch_channel.into();
        Self {
            bot_name: bot_name.to_lowercase(),
            owner_id: owner_id.into(),
            prefix: prefix.into(),
            patsch_channel: patsch_channel.to_lowercase(),
            known_bots: known_bots.into_iter().map(|n| n.to_lowercase()).collect(),
            version: version.into(),
            debug: AtomicBool::new(debug),
        }
    }

    pub fn bot_name(&self) -> &str {
        &self.bot_name
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn patsch_channel(&self) -> &str {
        &self.patsch_channel
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn is_known_bot(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.known_bots.iter().any(|bot| *bot == name)
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    pub fn set_debug(&self, enabled: bool) {
        self.debug.store(enabled, Ordering::Relaxed);
    }

    /// Fixed identity used by the unit and integration tests.
    pub fn for_tests() -> Self {
        Self::new(
            "murmelbot",
            "100",
            "~",
            "fishpond",
            vec![
                "nightbot".to_string(),
                "fossabot".to_string(),
                "streamelements".to_string(),
            ],
            "0.0.0-test",
            false,
        )
    }
}
