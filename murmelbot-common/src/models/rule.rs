use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Per-rule cooldown durations. A zero duration disables that scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cooldowns {
    pub user: Duration,
    pub channel: Duration,
    pub global: Duration,
}

impl Cooldowns {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_none(&self) -> bool {
        self.user.is_zero() && self.channel.is_zero() && self.global.is_zero()
    }
}

/// Configuration-side override for a built-in rule, keyed by rule name
/// in the `[rules.<name>]` table of the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleOverride {
    /// Disables the rule everywhere when set to `false`.
    pub enabled: Option<bool>,
    /// Channels in which the rule is suppressed even though it stays
    /// globally enabled.
    #[serde(default)]
    pub disabled_channels: HashSet<String>,
}
