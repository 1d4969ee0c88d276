//! The built-in rule roster. Each submodule builds the rules for one
//! command family; [`builtin_rules`] assembles them in registration
//! order, which is also their evaluation order.

pub mod admin;
pub mod patsch;
pub mod reactions;
pub mod state;
pub mod useful;
pub mod version;
pub mod voicemail;

use murmelbot_common::error::Error;

use crate::dispatch::Rule;
use crate::settings::BotSettings;

/// Pattern prefix helper: case-insensitive, anchored, with the
/// configured command prefix escaped.
pub(crate) fn prefixed(settings: &BotSettings, tail: &str) -> String {
    format!("(?i)^{}{}", regex::escape(settings.prefix()), tail)
}

/// Matches an optional-@ mention of the bot, with an optional comma.
pub(crate) fn bot_alias(settings: &BotSettings) -> String {
    format!("@?{},?", regex::escape(settings.bot_name()))
}

/// All built-in rules in registration order. Earlier rules win ties;
/// state and admin rules sit ahead of the community commands.
pub fn builtin_rules(settings: &BotSettings) -> Result<Vec<Rule>, Error> {
    Ok(vec![
        state::sleep(settings)?,
        state::wake(settings)?,
        admin::join(settings)?,
        admin::leave(settings)?,
        admin::leave_remote(settings)?,
        admin::lurk(settings)?,
        admin::debug(settings)?,
        version::version(settings)?,
        voicemail::voicemail(settings)?,
        patsch::patscheck(settings)?,
        patsch::patsch(settings)?,
        useful::vanish(settings)?,
        useful::circumflex(settings)?,
        useful::ping(settings)?,
        useful::rate(settings)?,
        useful::time(settings)?,
        reactions::hello(settings)?,
        reactions::stirnbot(settings)?,
        reactions::scambot(settings)?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn roster_builds_with_unique_names() {
        let settings = BotSettings::for_tests();
        let rules = builtin_rules(&settings).unwrap();
        assert!(!rules.is_empty());

        let mut names = HashSet::new();
        for rule in &rules {
            assert!(!rule.name().is_empty());
            assert!(names.insert(rule.name().to_string()), "duplicate: {}", rule.name());
        }
    }
}
