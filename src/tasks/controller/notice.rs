//! Transient notice messages. One slot: posting replaces whatever is
//! showing and restarts the expiry window, so a superseded message's timer
//! can never clear its successor.

use std::time::{Duration, Instant};

#[derive(Debug)]
struct Notice {
    text: String,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct NoticeBoard {
    current: Option<Notice>,
    ttl: Duration,
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self { current: None, ttl }
    }

    pub fn post(&mut self, text: String, now: Instant) {
        self.current = Some(Notice {
            text,
            expires_at: now + self.ttl,
        });
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_ref().map(|notice| notice.text.as_str())
    }

    pub fn expiry(&self) -> Option<Instant> {
        self.current.as_ref().map(|notice| notice.expires_at)
    }

    /// Clears a message whose window has elapsed and returns its text.
    pub fn on_deadline(&mut self, now: Instant) -> Option<String> {
        if self.current.as_ref()?.expires_at > now {
            return None;
        }
        self.current.take().map(|notice| notice.text)
    }
}
