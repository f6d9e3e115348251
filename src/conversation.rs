//! Conversation history for a persona session
//!
//! Turns are immutable once created and only ever appended; the whole
//! conversation is cleared when the persona changes. Nothing here is
//! persisted across process restarts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Prefix used when rendering this role into a prompt part
    #[must_use]
    pub const fn prompt_prefix(self) -> &'static str {
        match self {
            Self::User => "Human",
            Self::Assistant => "Assistant",
        }
    }
}

/// One message in a conversation
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a turn stamped with the current time
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Ordered, append-only sequence of turns owned by one persona session
///
/// A well-formed conversation alternates User/Assistant starting with User.
/// The pipeline appends a User turn before the reply is confirmed, so a
/// failed turn can leave a trailing User turn with no Assistant match; that
/// partial history is kept deliberately.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// Create an empty conversation
    #[must_use]
    pub const fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Append a turn
    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.turns.push(Turn::new(role, content));
    }

    /// Append a user turn
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Role::User, content);
    }

    /// Append an assistant turn
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Role::Assistant, content);
    }

    /// All turns in order
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of turns
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the conversation has no turns
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Drop all history (persona switch or session end)
    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_preserves_order_and_roles() {
        let mut conv = Conversation::new();
        conv.push_user("hello");
        conv.push_assistant("hi there");
        conv.push_user("how are you?");

        let roles: Vec<Role> = conv.turns().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
        assert_eq!(conv.turns()[1].content, "hi there");
    }

    #[test]
    fn clear_empties_history() {
        let mut conv = Conversation::new();
        conv.push_user("hello");
        assert!(!conv.is_empty());

        conv.clear();
        assert!(conv.is_empty());
        assert_eq!(conv.len(), 0);
    }

    #[test]
    fn turns_are_timestamped() {
        let before = Utc::now();
        let turn = Turn::new(Role::User, "hi");
        assert!(turn.timestamp >= before);
        assert!(turn.timestamp <= Utc::now());
    }
}
