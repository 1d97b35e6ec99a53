//! Notification sinks for combat events
//!
//! The session reports status-effect ticks and NPC attacks here as they
//! happen, in addition to the text returned from each turn.

use tracing::info;

/// Where a notification came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifyContext<'a> {
    /// Participant whose turn produced the message
    pub actor_id: &'a str,
    pub round: u32,
}

/// Receives combat notifications
pub trait Notifier {
    fn notify(&mut self, ctx: NotifyContext<'_>, message: &str);
}

/// Emits each notification as a tracing event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&mut self, ctx: NotifyContext<'_>, message: &str) {
        if message.is_empty() {
            return;
        }
        info!(actor = ctx.actor_id, round = ctx.round, "Game Event: {}", message);
    }
}

/// Keeps every notification in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingNotifier {
    pub messages: Vec<String>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the recorded messages, leaving the recorder empty
    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, _ctx: NotifyContext<'_>, message: &str) {
        self.messages.push(message.to_string());
    }
}
