//! Append-only message log for one conversation.

use parley_types::chat::Turn;
use parley_types::llm::{CompletionRequest, Message};

/// Ordered record of every turn in a session.
///
/// Insertion order is conversation order. Turns are never reordered,
/// deduplicated, edited, or removed. Appending is crate-private: only the
/// session orchestrator decides when a turn enters the log.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    turns: Vec<Turn>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Project every turn into `{role, content}` pairs, in order.
    pub fn messages(&self) -> Vec<Message> {
        self.turns.iter().map(Turn::to_message).collect()
    }

    /// Build the request envelope for the whole conversation.
    pub fn to_request(&self, model: &str, max_tokens: u32) -> CompletionRequest {
        CompletionRequest {
            model: model.to_string(),
            messages: self.messages(),
            max_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_types::chat::{ImageAttachment, MessageRole};

    fn sample_log() -> MessageLog {
        let mut log = MessageLog::new();
        log.append(Turn::user("first", None));
        log.append(Turn::assistant("one"));
        log.append(Turn::user(
            "look at this",
            Some(ImageAttachment {
                data: "data:image/png;base64,AAAA".to_string(),
                mime_type: "image/png".to_string(),
                name: None,
            }),
        ));
        log
    }

    #[test]
    fn test_new_log_is_empty() {
        let log = MessageLog::new();
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
        assert!(log.last().is_none());
        assert!(log.messages().is_empty());
    }

    #[test]
    fn test_append_preserves_order() {
        let log = sample_log();
        assert_eq!(log.len(), 3);
        let roles: Vec<_> = log.turns().iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![MessageRole::User, MessageRole::Assistant, MessageRole::User]
        );
        assert_eq!(log.last().unwrap().text(), "look at this");
    }

    #[test]
    fn test_request_contains_every_turn_without_images() {
        let log = sample_log();
        let request = log.to_request("gpt-4o-mini", 500);
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.max_tokens, 500);
        let contents: Vec<_> = request.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "one", "look at this"]);

        let wire = serde_json::to_string(&request).unwrap();
        assert!(!wire.contains("data:image"));
    }

    #[test]
    fn test_projection_is_idempotent() {
        let log = sample_log();
        assert_eq!(log.to_request("m", 1), log.to_request("m", 1));
    }

    #[test]
    fn test_duplicate_turns_are_kept() {
        let mut log = MessageLog::new();
        log.append(Turn::assistant("same"));
        log.append(Turn::assistant("same"));
        assert_eq!(log.len(), 2);
    }
}
