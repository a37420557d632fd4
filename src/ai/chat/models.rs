//! The models for assembling a single relayed chat turn.
use crate::openai::{Message, Role};

/// How many prior turns are forwarded upstream.
pub const HISTORY_WINDOW: usize = 10;

/// The most recent `size` items, oldest first.
pub fn recent_window<T>(items: &[T], size: usize) -> &[T] {
    &items[items.len().saturating_sub(size)..]
}

/// The exact list of messages sent upstream for one turn: the persona
/// prompt first, then prior history, then the new user message.
#[derive(Debug, Default)]
pub struct Transcript(Vec<Message>);

impl Transcript {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Build the upstream transcript for a turn. System turns in
    /// `history` are dropped so the persona is the only system message.
    pub fn for_turn(persona: &str, history: &[Message], message: Option<&str>) -> Self {
        let prior: Vec<&Message> = history.iter().filter(|m| !m.is_system()).collect();
        let prior = recent_window(&prior, HISTORY_WINDOW);

        let mut transcript = Self::new();
        transcript.push(Message::new(Role::System, persona));
        for m in prior {
            transcript.push((*m).clone());
        }
        transcript.push(Message {
            role: Role::User,
            content: message.map(String::from),
        });
        transcript
    }

    pub fn messages(&self) -> &[Message] {
        &self.0
    }

    pub fn push(&mut self, msg: Message) {
        self.0.push(msg)
    }
}
