use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use murmelbot_common::models::rule::Cooldowns;

/// Which cooldown scope rejected an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownScope {
    User,
    Channel,
    Global,
}

impl fmt::Display for CooldownScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CooldownScope::User => f.write_str("user"),
            CooldownScope::Channel => f.write_str("channel"),
            CooldownScope::Global => f.write_str("global"),
        }
    }
}

#[derive(Debug, Default)]
struct Tracked {
    by_user: HashMap<String, DateTime<Utc>>,
    by_channel: HashMap<String, DateTime<Utc>>,
    global: Option<DateTime<Utc>>,
}

/// Last-fired timestamps for one rule, keyed per user, per channel and
/// globally. Evaluation may run concurrently for different channels, so
/// the maps sit behind one mutex. Timestamps are written only after the
/// rule actually handled a message; whether the rule is cooling down is
/// always computed against the evaluation clock.
#[derive(Debug, Default)]
pub struct CooldownTracker {
    tracked: Mutex<Tracked>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the scope that is still cooling down, or `None` when the
    /// rule may fire.
    pub fn cooling_down(
        &self,
        cooldowns: &Cooldowns,
        channel: &str,
        user: &str,
        now: DateTime<Utc>,
    ) -> Option<CooldownScope> {
        if cooldowns.is_none() {
            return None;
        }

        let tracked = self.tracked.lock();
        if let Some(&last) = tracked.by_user.get(user) {
            if within(last, now, cooldowns.user) {
                return Some(CooldownScope::User);
            }
        }
        if let Some(&last) = tracked.by_channel.get(channel) {
            if within(last, now, cooldowns.channel) {
                return Some(CooldownScope::Channel);
            }
        }
        if let Some(last) = tracked.global {
            if within(last, now, cooldowns.global) {
                return Some(CooldownScope::Global);
            }
        }
        None
    }

    /// Records a successful firing in all three scopes at once.
    pub fn record(&self, channel: &str, user: &str, now: DateTime<Utc>) {
        let mut tracked = self.tracked.lock();
        tracked.by_user.insert(user.to_string(), now);
        tracked.by_channel.insert(channel.to_string(), now);
        tracked.global = Some(now);
    }
}

fn within(last: DateTime<Utc>, now: DateTime<Utc>, window: Duration) -> bool {
    if window.is_zero() {
        return false;
    }
    match (now - last).to_std() {
        Ok(elapsed) => elapsed < window,
        // `last` lies in the future relative to `now`; treat as cooling.
        Err(_) => true,
    }
}
