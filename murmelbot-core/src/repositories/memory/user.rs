use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use murmelbot_common::error::Error;
use murmelbot_common::models::user::{ChatUser, PatschResult};
use murmelbot_common::traits::repository_traits::UserRepository;

/// User records held in process memory, keyed by the platform sender id.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: DashMap<String, ChatUser>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn bump_user(
        &self,
        user_id: &str,
        name: &str,
        display_name: &str,
        seen_at: DateTime<Utc>,
    ) -> Result<ChatUser, Error> {
        let mut entry = self
            .users
            .entry(user_id.to_string())
            .or_insert_with(|| ChatUser::new(user_id, name, display_name, seen_at));
        let user = entry.value_mut();
        user.name = name.to_string();
        user.display_name = display_name.to_string();
        user.last_seen = seen_at;
        Ok(user.clone())
    }

    async fn get_by_id(&self, user_id: &str) -> Result<Option<ChatUser>, Error> {
        Ok(self.users.get(user_id).map(|u| u.value().clone()))
    }

    async fn timeout_user(&self, user_id: &str, until: DateTime<Utc>) -> Result<(), Error> {
        match self.users.get_mut(user_id) {
            Some(mut user) => {
                user.timeout = Some(until);
                Ok(())
            }
            None => Err(Error::State(format!("unknown user id '{user_id}'"))),
        }
    }

    async fn is_timed_out(&self, user_id: &str, now: DateTime<Utc>) -> Result<bool, Error> {
        Ok(self
            .users
            .get(user_id)
            .map(|u| u.is_timed_out(now))
            .unwrap_or(false))
    }

    async fn patsch(&self, user_id: &str, now: DateTime<Utc>) -> Result<PatschResult, Error> {
        match self.users.get_mut(user_id) {
            Some(mut user) => Ok(user.patsch(now)),
            None => Err(Error::State(format!("unknown user id '{user_id}'"))),
        }
    }
}
