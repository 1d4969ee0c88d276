use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Permission level of a message sender, totally ordered from `Everyone`
/// up to `Owner`. Gating compares with `>=`: a sender may invoke a rule
/// if their level is at least the rule's required level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Everyone,
    Subscriber,
    /// Reserved rung: no derivation path assigns it yet.
    Regular,
    Moderator,
    Broadcaster,
    Owner,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Everyone => "everyone",
            Permission::Subscriber => "subscriber",
            Permission::Regular => "regular",
            Permission::Moderator => "moderator",
            Permission::Broadcaster => "broadcaster",
            Permission::Owner => "owner",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = Error;

    /// Parses a configuration string. Unknown names are rejected rather
    /// than falling back to `Everyone`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "everyone" => Ok(Permission::Everyone),
            "subscriber" => Ok(Permission::Subscriber),
            "regular" => Ok(Permission::Regular),
            "moderator" => Ok(Permission::Moderator),
            "broadcaster" => Ok(Permission::Broadcaster),
            "owner" => Ok(Permission::Owner),
            other => Err(Error::Config(format!("unknown permission level '{other}'"))),
        }
    }
}
