use async_trait::async_trait;
use dashmap::DashMap;

use murmelbot_common::error::Error;
use murmelbot_common::models::channel::Channel;
use murmelbot_common::traits::repository_traits::ChannelStateRepository;

/// Channel state held in process memory. Unknown channels read as
/// not joined, awake and not lurking.
#[derive(Debug, Default)]
pub struct MemoryChannelStateRepository {
    channels: DashMap<String, Channel>,
}

impl MemoryChannelStateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn update<F: FnOnce(&mut Channel)>(&self, channel: &str, apply: F) {
        let mut entry = self
            .channels
            .entry(channel.to_string())
            .or_insert_with(|| Channel::new(channel));
        apply(entry.value_mut());
    }
}

#[async_trait]
impl ChannelStateRepository for MemoryChannelStateRepository {
    async fn is_sleeping(&self, channel: &str) -> Result<bool, Error> {
        Ok(self.channels.get(channel).map(|c| c.sleeping).unwrap_or(false))
    }

    async fn set_sleeping(&self, channel: &str, sleeping: bool) -> Result<(), Error> {
        self.update(channel, |c| c.sleeping = sleeping);
        Ok(())
    }

    async fn is_lurking(&self, channel: &str) -> Result<bool, Error> {
        Ok(self.channels.get(channel).map(|c| c.lurking).unwrap_or(false))
    }

    async fn set_lurking(&self, channel: &str, lurking: bool) -> Result<(), Error> {
        self.update(channel, |c| c.lurking = lurking);
        Ok(())
    }

    async fn is_joined(&self, channel: &str) -> Result<bool, Error> {
        Ok(self.channels.get(channel).map(|c| c.joined).unwrap_or(false))
    }

    async fn set_joined(&self, channel: &str, joined: bool) -> Result<(), Error> {
        self.update(channel, |c| c.joined = joined);
        Ok(())
    }

    async fn joined_channels(&self) -> Result<Vec<String>, Error> {
        let mut joined: Vec<String> = self
            .channels
            .iter()
            .filter(|entry| entry.value().joined)
            .map(|entry| entry.key().clone())
            .collect();
        joined.sort();
        Ok(joined)
    }
}
