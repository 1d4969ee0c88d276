//! In-memory, dashmap-backed implementations of the state collaborator
//! traits. The dispatch core only depends on the traits; these backends
//! carry the running bot and the test suites.

pub mod channel_state;
pub mod user;
pub mod voicemail;

pub use channel_state::MemoryChannelStateRepository;
pub use user::MemoryUserRepository;
pub use voicemail::MemoryVoicemailRepository;
