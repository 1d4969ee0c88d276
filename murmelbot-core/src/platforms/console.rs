//! src/platforms/console.rs
//!
//! Line-based development transport. Reads messages from stdin in the
//! form `<channel> <sender>[:mod][:sub] <text...>` and prints outbound
//! messages to stdout. Implements the same traits the real chat
//! transport would, so the rest of the bot cannot tell the difference.

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use murmelbot_common::error::Error;

use super::{ChatMessageEvent, ChatPlatform, ConnectionStatus, PlatformIntegration};

pub struct ConsolePlatform {
    connection_status: ConnectionStatus,
    read_loop_handle: Option<JoinHandle<()>>,
    rx: Option<mpsc::Receiver<ChatMessageEvent>>,
}

impl ConsolePlatform {
    pub fn new() -> Self {
        Self {
            connection_status: ConnectionStatus::Disconnected,
            read_loop_handle: None,
            rx: None,
        }
    }

    /// Hands out the inbound message stream. Call once, after
    /// `connect()`; the caller owns the receive loop from then on.
    pub fn take_receiver(&mut self) -> Option<mpsc::Receiver<ChatMessageEvent>> {
        self.rx.take()
    }

    fn parse_line(line: &str) -> Option<ChatMessageEvent> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let mut parts = line.splitn(3, ' ');
        let channel = parts.next()?.trim_start_matches('#').to_lowercase();
        let sender = parts.next()?;
        let text = parts.next().unwrap_or("").to_string();

        let mut badges = sender.split(':');
        let name = badges.next()?.to_string();
        if name.is_empty() {
            return None;
        }
        let mut is_moderator = false;
        let mut is_subscriber = false;
        for badge in badges {
            match badge {
                "mod" => is_moderator = true,
                "sub" => is_subscriber = true,
                other => {
                    warn!(badge = other, "ignoring unknown badge");
                }
            }
        }

        Some(ChatMessageEvent {
            channel,
            // The console has no real account ids; the login doubles as one.
            user_id: name.to_lowercase(),
            user_name: name.to_lowercase(),
            display_name: name,
            text,
            is_moderator,
            is_subscriber,
            timestamp: Utc::now(),
        })
    }
}

impl Default for ConsolePlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlatformIntegration for ConsolePlatform {
    async fn connect(&mut self) -> Result<(), Error> {
        if self.read_loop_handle.is_some() {
            return Ok(());
        }

        let (tx, rx) = mpsc::channel::<ChatMessageEvent>(1000);
        self.rx = Some(rx);

        let handle = tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if let Some(event) = ConsolePlatform::parse_line(&line) {
                            if tx.send(event).await.is_err() {
                                break;
                            }
                        } else if !line.trim().is_empty() {
                            warn!(%line, "could not parse console message");
                        }
                    }
                    Ok(None) => {
                        debug!("console input closed");
                        break;
                    }
                    Err(e) => {
                        warn!("console read error: {e}");
                        break;
                    }
                }
            }
        });

        self.read_loop_handle = Some(handle);
        self.connection_status = ConnectionStatus::Connected;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), Error> {
        if let Some(handle) = self.read_loop_handle.take() {
            handle.abort();
        }
        self.rx = None;
        self.connection_status = ConnectionStatus::Disconnected;
        Ok(())
    }

    async fn send_message(&self, channel: &str, message: &str) -> Result<(), Error> {
        println!("[#{channel}] {message}");
        Ok(())
    }

    async fn get_connection_status(&self) -> Result<ConnectionStatus, Error> {
        Ok(self.connection_status.clone())
    }
}

#[async_trait]
impl ChatPlatform for ConsolePlatform {
    async fn join_channel(&self, channel: &str) -> Result<(), Error> {
        println!("* joined #{channel}");
        Ok(())
    }

    async fn leave_channel(&self, channel: &str) -> Result<(), Error> {
        println!("* left #{channel}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_channel_sender_and_text() {
        let event = ConsolePlatform::parse_line("#somechannel ada ~ping").unwrap();
        assert_eq!(event.channel, "somechannel");
        assert_eq!(event.user_name, "ada");
        assert_eq!(event.text, "~ping");
        assert!(!event.is_moderator);
    }

    #[test]
    fn parses_badges() {
        let event = ConsolePlatform::parse_line("chan Ada:mod:sub hello there").unwrap();
        assert_eq!(event.user_name, "ada");
        assert_eq!(event.display_name, "Ada");
        assert!(event.is_moderator);
        assert!(event.is_subscriber);
        assert_eq!(event.text, "hello there");
    }

    #[test]
    fn rejects_blank_lines() {
        assert!(ConsolePlatform::parse_line("   ").is_none());
        assert!(ConsolePlatform::parse_line("chan").is_none());
    }
}
