//! Append-only conversation transcript.
//!
//! ```rust
//! use mchat::Transcript;
//! use mprovider::{Message, TurnKind};
//!
//! let mut transcript = Transcript::new();
//! transcript.push(Message::user_text("What changed in 2.0?"));
//! transcript.push(Message::assistant_text("The config format."));
//!
//! assert_eq!(transcript.len(), 2);
//! assert_eq!(transcript.last().map(|turn| turn.kind()), Some(TurnKind::Assistant));
//! ```

use mprovider::Message;

/// Ordered turns sent verbatim as the message list of every model call.
///
/// Turns can only be appended; existing turns are never edited or removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    turns: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Message) {
        self.turns.push(turn);
    }

    pub fn messages(&self) -> &[Message] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Message> {
        self.turns.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.turns
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
