//! Conversation and message definitions.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::UserId;

/// Identifier of a conversation.
///
/// Derived from the sorted participant pair, so a pair of users can never
/// own two conversations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Returns the conversation id for a pair of users, in either order.
    pub fn for_pair(a: UserId, b: UserId) -> Self {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        Self(format!("{lo}_{hi}"))
    }

    /// Returns the two participants encoded in the id.
    pub fn participants(&self) -> Option<[UserId; 2]> {
        let (lo, hi) = self.0.split_once('_')?;
        Some([lo.parse().ok()?, hi.parse().ok()?])
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error returned when parsing a malformed conversation id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidConversationId(pub String);

impl fmt::Display for InvalidConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid conversation id: {}", self.0)
    }
}

impl std::error::Error for InvalidConversationId {}

impl FromStr for ConversationId {
    type Err = InvalidConversationId;

    /// Accepts any UUID spelling and normalizes to the form produced by
    /// [`ConversationId::for_pair`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self(s.to_string()).participants() {
            Some([lo, hi]) if lo < hi => Ok(Self::for_pair(lo, hi)),
            _ => Err(InvalidConversationId(s.to_string())),
        }
    }
}

/// A persistent channel of messages between two users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Identifier derived from the participants.
    pub id: ConversationId,
    /// Both participants, sorted.
    pub participants: [UserId; 2],
    /// Text of the most recent message.
    pub last_message: Option<String>,
    /// Time of the most recent message.
    pub last_message_at: Option<DateTime<Utc>>,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Creates an empty conversation between two users.
    pub fn between(a: UserId, b: UserId) -> Self {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        Self {
            id: ConversationId::for_pair(lo, hi),
            participants: [lo, hi],
            last_message: None,
            last_message_at: None,
            created_at: Utc::now(),
        }
    }

    /// Returns true if `user_id` takes part in the conversation.
    pub fn has_participant(&self, user_id: UserId) -> bool {
        self.participants.contains(&user_id)
    }

    /// Returns the participant that is not `user_id`.
    pub fn other_participant(&self, user_id: UserId) -> Option<UserId> {
        match self.participants {
            [a, b] if a == user_id => Some(b),
            [a, b] if b == user_id => Some(a),
            _ => None,
        }
    }

    /// Updates the last-message cache from `message`.
    pub fn record(&mut self, message: &Message) {
        self.last_message = Some(message.text.clone());
        self.last_message_at = Some(message.sent_at);
    }
}

/// A single message inside a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning conversation.
    pub conversation_id: ConversationId,
    /// Author.
    pub sender_id: UserId,
    /// Message body.
    pub text: String,
    /// When the message was sent.
    pub sent_at: DateTime<Utc>,
}

impl Message {
    /// Creates a message sent now.
    pub fn new(
        conversation_id: ConversationId,
        sender_id: UserId,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            conversation_id,
            sender_id,
            text: text.into(),
            sent_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_id_is_order_independent() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        assert_eq!(ConversationId::for_pair(a, b), ConversationId::for_pair(b, a));
        assert_eq!(Conversation::between(a, b).id, Conversation::between(b, a).id);
    }

    #[test]
    fn test_conversation_id_round_trips_participants() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let id = ConversationId::for_pair(a, b);

        let parsed: ConversationId = id.to_string().parse().unwrap();
        let [lo, hi] = parsed.participants().unwrap();
        assert_eq!(lo, a.min(b));
        assert_eq!(hi, a.max(b));
    }

    #[test]
    fn test_conversation_id_parses_to_canonical_form() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let id = ConversationId::for_pair(a, b);

        let upper: ConversationId = id.as_str().to_uppercase().parse().unwrap();
        let simple: ConversationId = id.as_str().replace('-', "").parse().unwrap();
        assert_eq!(upper, id);
        assert_eq!(simple, id);
    }

    #[test]
    fn test_conversation_id_rejects_garbage() {
        assert!("not-an-id".parse::<ConversationId>().is_err());

        let a = Uuid::new_v4();
        assert!(format!("{a}_{a}").parse::<ConversationId>().is_err());
    }

    #[test]
    fn test_other_participant() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let conversation = Conversation::between(a, b);

        assert_eq!(conversation.other_participant(a), Some(b));
        assert_eq!(conversation.other_participant(b), Some(a));
        assert_eq!(conversation.other_participant(Uuid::new_v4()), None);
    }

    #[test]
    fn test_record_updates_cache() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut conversation = Conversation::between(a, b);
        let message = Message::new(conversation.id.clone(), a, "hello");

        conversation.record(&message);
        assert_eq!(conversation.last_message.as_deref(), Some("hello"));
        assert_eq!(conversation.last_message_at, Some(message.sent_at));
    }
}
