use async_trait::async_trait;
use dashmap::DashMap;

use murmelbot_common::error::Error;
use murmelbot_common::models::voicemail::Voicemail;
use murmelbot_common::traits::repository_traits::VoicemailRepository;

/// Voicemail storage held in process memory, keyed by recipient.
#[derive(Debug, Default)]
pub struct MemoryVoicemailRepository {
    mailboxes: DashMap<String, Vec<Voicemail>>,
}

impl MemoryVoicemailRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VoicemailRepository for MemoryVoicemailRepository {
    async fn put(&self, voicemail: Voicemail) -> Result<(), Error> {
        self.mailboxes
            .entry(voicemail.recipient.to_lowercase())
            .or_default()
            .push(voicemail);
        Ok(())
    }

    async fn pop(&self, recipient: &str) -> Result<Vec<Voicemail>, Error> {
        Ok(self
            .mailboxes
            .remove(&recipient.to_lowercase())
            .map(|(_, mail)| mail)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn mail(recipient: &str, message: &str) -> Voicemail {
        Voicemail {
            created: Utc::now(),
            channel: "chan".into(),
            creator: "ada".into(),
            recipient: recipient.into(),
            message: message.into(),
        }
    }

    #[tokio::test]
    async fn pop_drains_in_insertion_order() -> Result<(), Error> {
        let repo = MemoryVoicemailRepository::new();
        repo.put(mail("grace", "first")).await?;
        repo.put(mail("Grace", "second")).await?;

        let mails = repo.pop("grace").await?;
        assert_eq!(mails.len(), 2);
        assert_eq!(mails[0].message, "first");
        assert_eq!(mails[1].message, "second");

        assert!(repo.pop("grace").await?.is_empty());
        Ok(())
    }
}
