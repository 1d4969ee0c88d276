use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message left for another user, replayed the next time they chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voicemail {
    pub created: DateTime<Utc>,
    pub channel: String,
    pub creator: String,
    pub recipient: String,
    pub message: String,
}

impl fmt::Display for Voicemail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {}",
            self.created.format("%b %e %H:%M:%S"),
            self.creator,
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn display_carries_timestamp_creator_and_text() {
        let v = Voicemail {
            created: Utc.with_ymd_and_hms(2024, 3, 7, 14, 30, 5).unwrap(),
            channel: "somechannel".into(),
            creator: "ada".into(),
            recipient: "grace".into(),
            message: "hello".into(),
        };
        assert_eq!(v.to_string(), "Mar  7 14:30:05 ada: hello");
    }
}
