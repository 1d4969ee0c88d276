use serde::{Deserialize, Serialize};

/// Per-channel bot state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    /// Whether the bot should be connected to this channel.
    pub joined: bool,
    /// Sleeping channels suppress every rule without `sleep_override`.
    pub sleeping: bool,
    /// Lurking channels are read-only: messages are dropped before dispatch.
    pub lurking: bool,
}

impl Channel {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            joined: false,
            sleeping: false,
            lurking: false,
        }
    }
}
