// File: murmelbot-common/src/models/mod.rs
pub mod channel;
pub mod permission;
pub mod rule;
pub mod user;
pub mod voicemail;

pub use channel::Channel;
pub use permission::Permission;
pub use rule::{Cooldowns, RuleOverride};
pub use user::{ChatUser, PatschResult};
pub use voicemail::Voicemail;
