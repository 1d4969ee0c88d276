use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A chat user as tracked by the bot: identity, last-seen bookkeeping,
/// moderation timeout and the fish-patting streak counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatUser {
    /// Platform sender id (stable across name changes).
    pub user_id: String,
    pub name: String,
    pub display_name: String,

    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,

    pub timeout: Option<DateTime<Utc>>,
    pub banned: bool,

    pub last_patsched: Option<DateTime<Utc>>,
    pub patsch_streak: i32,
    pub patsch_count: i32,
}

/// Outcome of advancing the patsch streak state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatschResult {
    /// First patsch of the day; streak kept or extended.
    Counted,
    /// Already patsched today; streak resets.
    AlreadyPatsched,
    /// More than 48 h since the last patsch; streak resets.
    StreakBroken,
}

impl ChatUser {
    pub fn new(user_id: &str, name: &str, display_name: &str, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            name: name.to_string(),
            display_name: display_name.to_string(),
            first_seen: now,
            last_seen: now,
            timeout: None,
            banned: false,
            last_patsched: None,
            patsch_streak: 0,
            patsch_count: 0,
        }
    }

    /// Reports whether the user is currently timed out.
    pub fn is_timed_out(&self, now: DateTime<Utc>) -> bool {
        match self.timeout {
            Some(until) => until > now,
            None => false,
        }
    }

    /// Reports whether the last patsch was within 48 hours of `now`.
    pub fn has_patsched_lately(&self, now: DateTime<Utc>) -> bool {
        match self.last_patsched {
            Some(last) => now - last < Duration::hours(48),
            None => false,
        }
    }

    /// Reports whether the last patsch falls on the same calendar day as `now`.
    pub fn has_patsched_today(&self, now: DateTime<Utc>) -> bool {
        match self.last_patsched {
            Some(last) => last.date_naive() == now.date_naive(),
            None => false,
        }
    }

    /// Advances the streak state machine and records the patsch.
    /// The count always increases; the streak only survives a patsch on a
    /// new day within 48 h of the previous one.
    pub fn patsch(&mut self, now: DateTime<Utc>) -> PatschResult {
        let result = if self.has_patsched_lately(now) {
            if self.has_patsched_today(now) {
                self.patsch_streak = 0;
                PatschResult::AlreadyPatsched
            } else {
                self.patsch_streak += 1;
                PatschResult::Counted
            }
        } else {
            self.patsch_streak = 0;
            if self.last_patsched.is_none() {
                // very first patsch starts a streak rather than breaking one
                self.patsch_streak = 1;
                PatschResult::Counted
            } else {
                PatschResult::StreakBroken
            }
        };

        self.last_patsched = Some(now);
        self.patsch_count += 1;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn timeout_expires() {
        let mut user = ChatUser::new("1", "ada", "Ada", at(1, 12));
        user.timeout = Some(at(1, 13));
        assert!(user.is_timed_out(at(1, 12)));
        assert!(!user.is_timed_out(at(1, 14)));
    }

    #[test]
    fn first_patsch_starts_a_streak() {
        let mut user = ChatUser::new("1", "ada", "Ada", at(1, 12));
        assert_eq!(user.patsch(at(1, 12)), PatschResult::Counted);
        assert_eq!(user.patsch_streak, 1);
        assert_eq!(user.patsch_count, 1);
    }

    #[test]
    fn next_day_patsch_extends_streak() {
        let mut user = ChatUser::new("1", "ada", "Ada", at(1, 12));
        user.patsch(at(1, 12));
        assert_eq!(user.patsch(at(2, 10)), PatschResult::Counted);
        assert_eq!(user.patsch_streak, 2);
    }

    #[test]
    fn same_day_patsch_resets_streak() {
        let mut user = ChatUser::new("1", "ada", "Ada", at(1, 12));
        user.patsch(at(1, 12));
        assert_eq!(user.patsch(at(1, 18)), PatschResult::AlreadyPatsched);
        assert_eq!(user.patsch_streak, 0);
        assert_eq!(user.patsch_count, 2);
    }

    #[test]
    fn long_gap_breaks_streak() {
        let mut user = ChatUser::new("1", "ada", "Ada", at(1, 12));
        user.patsch(at(1, 12));
        user.patsch(at(2, 10));
        assert_eq!(user.patsch(at(5, 10)), PatschResult::StreakBroken);
        assert_eq!(user.patsch_streak, 0);
        assert_eq!(user.patsch_count, 3);
    }
}
