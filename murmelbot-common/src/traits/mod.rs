// File: murmelbot-common/src/traits/mod.rs
pub mod repository_traits;

pub use repository_traits::{ChannelStateRepository, UserRepository, VoicemailRepository};
