use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use regex::Regex;

use murmelbot_common::error::Error;
use murmelbot_common::models::permission::Permission;
use murmelbot_common::models::rule::Cooldowns;

use super::context::CommandContext;
use super::cooldown::{CooldownScope, CooldownTracker};
use super::event::RuleHandler;

/// Why a rule was not eligible for a message. Distinct from a handler
/// returning `Skip`: a gate rejection means the rule never ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    Disabled,
    Sleeping,
    TimedOut,
    BotSender,
    CoolingDown(CooldownScope),
    Permission,
}

impl fmt::Display for GateRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateRejection::Disabled => f.write_str("rule is disabled"),
            GateRejection::Sleeping => f.write_str("channel is sleeping"),
            GateRejection::TimedOut => f.write_str("sender is timed out"),
            GateRejection::BotSender => f.write_str("rule ignores bot senders"),
            GateRejection::CoolingDown(scope) => write!(f, "{scope} cooldown active"),
            GateRejection::Permission => f.write_str("not enough permissions"),
        }
    }
}

/// Runtime-togglable per-rule state. Shared between the rule itself and
/// the rule directory so the admin handler can flip it while the
/// dispatcher keeps reading it.
#[derive(Debug)]
pub struct RuleFlags {
    enabled: AtomicBool,
    disabled_channels: RwLock<HashSet<String>>,
}

impl RuleFlags {
    fn new(enabled: bool, disabled_channels: HashSet<String>) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            disabled_channels: RwLock::new(disabled_channels),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_disabled_in(&self, channel: &str) -> bool {
        self.disabled_channels.read().contains(channel)
    }

    pub fn set_disabled_in(&self, channel: &str, disabled: bool) {
        let mut channels = self.disabled_channels.write();
        if disabled {
            channels.insert(channel.to_string());
        } else {
            channels.remove(channel);
        }
    }
}

/// Name → flags lookup for every registered rule. Handed to the admin
/// handler; the only way rule state changes after startup.
#[derive(Debug, Default)]
pub struct RuleDirectory {
    flags: HashMap<String, Arc<RuleFlags>>,
}

impl RuleDirectory {
    pub(crate) fn insert(&mut self, name: &str, flags: Arc<RuleFlags>) {
        self.flags.insert(name.to_string(), flags);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<RuleFlags>> {
        self.flags.get(name)
    }

    /// Flips a rule's global enabled flag. Returns false if the name is
    /// unknown.
    pub fn set_enabled(&self, name: &str, enabled: bool) -> bool {
        match self.flags.get(name) {
            Some(flags) => {
                flags.set_enabled(enabled);
                true
            }
            None => false,
        }
    }

    /// Suppresses or restores a rule in a single channel.
    pub fn set_disabled_in(&self, name: &str, channel: &str, disabled: bool) -> bool {
        match self.flags.get(name) {
            Some(flags) => {
                flags.set_disabled_in(channel, disabled);
                true
            }
            None => false,
        }
    }
}

/// One registered command: match patterns, gating policy and the handler
/// that runs when the rule fires. Immutable after construction except for
/// the shared [`RuleFlags`].
pub struct Rule {
    name: String,
    patterns: Vec<Regex>,
    required_permission: Permission,
    cooldowns: Cooldowns,
    sleep_override: bool,
    react_to_bots: bool,
    flags: Arc<RuleFlags>,
    cooldown: CooldownTracker,
    handler: Arc<dyn RuleHandler>,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("patterns", &self.patterns.len())
            .field("required_permission", &self.required_permission)
            .finish()
    }
}

impl Rule {
    pub fn builder(name: impl Into<String>) -> RuleBuilder {
        RuleBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn required_permission(&self) -> Permission {
        self.required_permission
    }

    pub fn flags(&self) -> &Arc<RuleFlags> {
        &self.flags
    }

    pub(crate) fn handler(&self) -> &Arc<dyn RuleHandler> {
        &self.handler
    }

    pub(crate) fn cooldown(&self) -> &CooldownTracker {
        &self.cooldown
    }

    /// Runs the gate chain in its contractual order: enabled → sleep →
    /// timeout → bot policy → cooldown → permission. `None` means the
    /// rule may try to match.
    pub fn gate(&self, ctx: &CommandContext) -> Option<GateRejection> {
        if !self.flags.is_enabled() || self.flags.is_disabled_in(&ctx.channel) {
            return Some(GateRejection::Disabled);
        }
        if ctx.sleeping && !self.sleep_override {
            return Some(GateRejection::Sleeping);
        }
        if ctx.is_timed_out && ctx.permission < Permission::Owner {
            return Some(GateRejection::TimedOut);
        }
        if ctx.is_bot && !self.react_to_bots {
            return Some(GateRejection::BotSender);
        }
        if let Some(scope) =
            self.cooldown
                .cooling_down(&self.cooldowns, &ctx.channel, &ctx.user_name, ctx.timestamp)
        {
            return Some(GateRejection::CoolingDown(scope));
        }
        if ctx.permission < self.required_permission {
            return Some(GateRejection::Permission);
        }
        None
    }

    /// Tries the patterns in declared order; the first hit wins. Returns
    /// the captured groups as owned strings, with the whole match at
    /// index 0 and empty strings for groups that did not participate.
    pub fn find_match(&self, text: &str) -> Option<Vec<String>> {
        for pattern in &self.patterns {
            if let Some(caps) = pattern.captures(text) {
                let groups = (0..caps.len())
                    .map(|i| caps.get(i).map(|m| m.as_str().to_string()).unwrap_or_default())
                    .collect();
                return Some(groups);
            }
        }
        None
    }
}

/// Builds a [`Rule`], compiling and validating its patterns. Validation
/// failures are configuration errors and abort startup.
pub struct RuleBuilder {
    name: String,
    patterns: Vec<String>,
    required_permission: Permission,
    cooldowns: Cooldowns,
    sleep_override: bool,
    react_to_bots: bool,
    enabled: bool,
    disabled_channels: HashSet<String>,
}

impl RuleBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            patterns: Vec::new(),
            required_permission: Permission::Everyone,
            cooldowns: Cooldowns::none(),
            sleep_override: false,
            react_to_bots: false,
            enabled: true,
            disabled_channels: HashSet::new(),
        }
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    pub fn permission(mut self, permission: Permission) -> Self {
        self.required_permission = permission;
        self
    }

    pub fn user_cooldown(mut self, duration: Duration) -> Self {
        self.cooldowns.user = duration;
        self
    }

    pub fn channel_cooldown(mut self, duration: Duration) -> Self {
        self.cooldowns.channel = duration;
        self
    }

    pub fn global_cooldown(mut self, duration: Duration) -> Self {
        self.cooldowns.global = duration;
        self
    }

    pub fn sleep_override(mut self) -> Self {
        self.sleep_override = true;
        self
    }

    pub fn react_to_bots(mut self) -> Self {
        self.react_to_bots = true;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn disabled_in(mut self, channel: impl Into<String>) -> Self {
        self.disabled_channels.insert(channel.into());
        self
    }

    pub fn build(self, handler: Arc<dyn RuleHandler>) -> Result<Rule, Error> {
        if self.name.trim().is_empty() {
            return Err(Error::Config("rule name must not be empty".into()));
        }
        if self.patterns.is_empty() {
            return Err(Error::Config(format!(
                "rule '{}' declares no patterns",
                self.name
            )));
        }

        let mut patterns = Vec::with_capacity(self.patterns.len());
        for source in &self.patterns {
            let re = Regex::new(source).map_err(|e| {
                Error::Config(format!("rule '{}': bad pattern '{source}': {e}", self.name))
            })?;
            patterns.push(re);
        }

        Ok(Rule {
            name: self.name,
            patterns,
            required_permission: self.required_permission,
            cooldowns: self.cooldowns,
            sleep_override: self.sleep_override,
            react_to_bots: self.react_to_bots,
            flags: Arc::new(RuleFlags::new(self.enabled, self.disabled_channels)),
            cooldown: CooldownTracker::new(),
            handler,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::event::{CommandEvent, Disposition};
    use crate::test_utils::context_for;
    use async_trait::async_trait;

    struct NoopHandler;

    #[async_trait]
    impl RuleHandler for NoopHandler {
        async fn run(&self, _event: &mut CommandEvent) -> Result<Disposition, Error> {
            Ok(Disposition::Handled)
        }
    }

    fn rule(builder: RuleBuilder) -> Rule {
        builder.build(Arc::new(NoopHandler)).unwrap()
    }

    #[test]
    fn empty_name_is_a_configuration_error() {
        let err = Rule::builder("  ").pattern("^x").build(Arc::new(NoopHandler));
        assert!(matches!(err, Err(Error::Config(_))));
    }

    #[test]
    fn missing_patterns_are_a_configuration_error() {
        let err = Rule::builder("ping").build(Arc::new(NoopHandler));
        assert!(matches!(err, Err(Error::Config(_))));
    }

    #[test]
    fn bad_pattern_is_a_configuration_error() {
        let err = Rule::builder("ping").pattern("^(").build(Arc::new(NoopHandler));
        assert!(matches!(err, Err(Error::Config(_))));
    }

    #[test]
    fn first_matching_pattern_wins_and_exposes_groups() {
        let r = rule(
            Rule::builder("greet")
                .pattern(r"^hello (\w+)$")
                .pattern(r"^(hi|hey) (\w+)$"),
        );
        let groups = r.find_match("hi ada").unwrap();
        assert_eq!(groups, vec!["hi ada", "hi", "ada"]);
        assert!(r.find_match("goodbye").is_none());
    }

    #[test]
    fn unmatched_groups_come_back_empty() {
        let r = rule(Rule::builder("opt").pattern(r"^go( fast)?$"));
        let groups = r.find_match("go").unwrap();
        assert_eq!(groups, vec!["go", ""]);
    }

    #[test]
    fn gate_order_disabled_first() {
        let r = rule(Rule::builder("x").pattern("^x").enabled(false));
        let mut ctx = context_for("chan", "ada", "x");
        ctx.sleeping = true;
        assert_eq!(r.gate(&ctx), Some(GateRejection::Disabled));
    }

    #[test]
    fn gate_respects_channel_suppression() {
        let r = rule(Rule::builder("x").pattern("^x").disabled_in("chan"));
        let ctx = context_for("chan", "ada", "x");
        assert_eq!(r.gate(&ctx), Some(GateRejection::Disabled));
        let ctx = context_for("other", "ada", "x");
        assert_eq!(r.gate(&ctx), None);
    }

    #[test]
    fn sleep_gate_honors_override() {
        let plain = rule(Rule::builder("x").pattern("^x"));
        let wake = rule(Rule::builder("x").pattern("^x").sleep_override());
        let mut ctx = context_for("chan", "ada", "x");
        ctx.sleeping = true;
        assert_eq!(plain.gate(&ctx), Some(GateRejection::Sleeping));
        assert_eq!(wake.gate(&ctx), None);
    }

    #[test]
    fn timeout_gate_exempts_owner() {
        let r = rule(Rule::builder("x").pattern("^x"));
        let mut ctx = context_for("chan", "ada", "x");
        ctx.is_timed_out = true;
        assert_eq!(r.gate(&ctx), Some(GateRejection::TimedOut));
        ctx.permission = Permission::Owner;
        assert_eq!(r.gate(&ctx), None);
    }

    #[test]
    fn bot_senders_are_gated_unless_opted_in() {
        let plain = rule(Rule::builder("x").pattern("^x"));
        let reacting = rule(Rule::builder("x").pattern("^x").react_to_bots());
        let mut ctx = context_for("chan", "nightbot", "x");
        ctx.is_bot = true;
        assert_eq!(plain.gate(&ctx), Some(GateRejection::BotSender));
        assert_eq!(reacting.gate(&ctx), None);
    }

    #[test]
    fn permission_gate_compares_at_least() {
        let r = rule(Rule::builder("x").pattern("^x").permission(Permission::Moderator));
        let mut ctx = context_for("chan", "ada", "x");
        ctx.permission = Permission::Subscriber;
        assert_eq!(r.gate(&ctx), Some(GateRejection::Permission));
        ctx.permission = Permission::Moderator;
        assert_eq!(r.gate(&ctx), None);
    }

    #[test]
    fn gating_is_idempotent_without_a_firing() {
        let r = rule(
            Rule::builder("x")
                .pattern("^x")
                .user_cooldown(Duration::from_secs(30)),
        );
        let ctx = context_for("chan", "ada", "x");
        assert_eq!(r.gate(&ctx), None);
        assert_eq!(r.gate(&ctx), None);
    }

    #[test]
    fn directory_toggles_shared_flags() {
        let r = rule(Rule::builder("x").pattern("^x"));
        let mut directory = RuleDirectory::default();
        directory.insert(r.name(), r.flags().clone());

        assert!(directory.set_enabled("x", false));
        assert!(!r.flags().is_enabled());
        assert!(directory.set_disabled_in("x", "chan", true));
        assert!(r.flags().is_disabled_in("chan"));
        assert!(!directory.set_enabled("unknown", false));
    }
}
