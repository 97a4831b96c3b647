//! The session orchestrator.
//!
//! `ChatSession` is the single authority over one conversation's
//! [`MessageLog`]: it validates a question, appends the user turn, sends the
//! whole log to the provider, and appends the assistant turn only when the
//! exchange succeeds. Every outcome is rendered into a [`UiEvent`].

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::field::Empty;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use parley_types::chat::{ImageAttachment, Turn};
use parley_types::error::ChatError;
use parley_types::event::UiEvent;
use parley_types::llm::Usage;

use crate::llm::source::ProviderSource;

use super::log::MessageLog;

/// Orchestrates one panel's conversation.
///
/// Takes `&mut self` for every question, so a single session can never run
/// two exchanges at once. Use [`super::handle::SessionHandle`] to share a
/// session between tasks.
pub struct ChatSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    log: MessageLog,
    source: Arc<dyn ProviderSource>,
    usage: Usage,
}

impl ChatSession {
    /// Start a session with an empty log.
    pub fn new(source: Arc<dyn ProviderSource>) -> Self {
        Self::with_id(Uuid::now_v7(), source)
    }

    pub fn with_id(id: Uuid, source: Arc<dyn ProviderSource>) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            log: MessageLog::new(),
            source,
            usage: Usage::default(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    /// Token usage accumulated over every successful exchange.
    pub fn usage(&self) -> Usage {
        self.usage
    }

    /// Answer a question from the panel.
    ///
    /// Never fails: every error is logged and returned as [`UiEvent::Error`].
    pub async fn handle_user_question(
        &mut self,
        text: String,
        image: Option<ImageAttachment>,
    ) -> UiEvent {
        match self.ask(text, image).await {
            Ok(content) => UiEvent::Response(content),
            Err(err) => {
                debug!(session_id = %self.id, error = %err, "Emitting error event");
                UiEvent::Error(err.to_string())
            }
        }
    }

    /// Run one exchange and return the assistant text.
    ///
    /// Log effects:
    /// - missing credential or empty question: nothing appended
    /// - provider failure: the user turn only
    /// - success: the user turn, then the assistant turn
    pub async fn ask(
        &mut self,
        text: String,
        image: Option<ImageAttachment>,
    ) -> Result<String, ChatError> {
        let resolved = match self.source.resolve() {
            Ok(resolved) => resolved,
            Err(err) => {
                warn!(session_id = %self.id, error = %err, "Dropping question: provider not configured");
                return Err(err);
            }
        };

        let image = image.filter(ImageAttachment::is_present);
        if text.trim().is_empty() && image.is_none() {
            warn!(session_id = %self.id, "Dropping question: no text and no image");
            return Err(ChatError::InvalidInput(
                "enter a question or attach an image".to_string(),
            ));
        }

        let has_image = image.is_some();
        self.log.append(Turn::user(text, image));
        debug!(
            session_id = %self.id,
            turn_count = self.log.len(),
            has_image,
            "User turn appended"
        );

        let request = self.log.to_request(&resolved.model, resolved.max_tokens);

        let span = info_span!(
            "gen_ai.complete",
            gen_ai.system = resolved.provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            session_id = %self.id,
            messages = request.messages.len(),
            gen_ai.usage.input_tokens = Empty,
            gen_ai.usage.output_tokens = Empty,
        );

        let started = Instant::now();
        let result = resolved
            .provider
            .complete(&request)
            .instrument(span.clone())
            .await;
        let response_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match result {
            Ok(response) => {
                span.record("gen_ai.usage.input_tokens", response.usage.input_tokens);
                span.record("gen_ai.usage.output_tokens", response.usage.output_tokens);
                self.usage.input_tokens = self
                    .usage
                    .input_tokens
                    .saturating_add(response.usage.input_tokens);
                self.usage.output_tokens = self
                    .usage
                    .output_tokens
                    .saturating_add(response.usage.output_tokens);
                self.log.append(Turn::assistant(response.content.clone()));
                info!(
                    session_id = %self.id,
                    turn_count = self.log.len(),
                    response_ms,
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    "Assistant turn appended"
                );
                Ok(response.content)
            }
            Err(err) => {
                warn!(
                    session_id = %self.id,
                    status_code = ?err.status_code(),
                    response_ms,
                    error = %err,
                    "Completion failed; user turn kept without a reply"
                );
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::test_support::{MockSource, ok_reply};
    use parley_types::chat::MessageRole;
    use parley_types::llm::LlmError;

    fn session(source: &MockSource) -> ChatSession {
        ChatSession::new(Arc::new(source.clone()))
    }

    #[tokio::test]
    async fn test_success_appends_user_then_assistant() {
        let source = MockSource::with_replies(vec![ok_reply("42")]);
        let mut chat = session(&source);

        let event = chat
            .handle_user_question("What is 6*7?".to_string(), None)
            .await;

        assert_eq!(event, UiEvent::Response("42".to_string()));
        assert_eq!(chat.log().len(), 2);
        let turns = chat.log().turns();
        assert_eq!(turns[0].role, MessageRole::User);
        assert_eq!(turns[0].text(), "What is 6*7?");
        assert!(turns[0].timestamp.is_some());
        assert_eq!(turns[1].role, MessageRole::Assistant);
        assert_eq!(turns[1].text(), "42");
        assert!(turns[1].timestamp.is_none());
    }

    #[tokio::test]
    async fn test_api_failure_keeps_only_user_turn() {
        let source = MockSource::with_replies(vec![Err(LlmError::Api {
            status_code: Some(401),
            message: "invalid key".to_string(),
        })]);
        let mut chat = session(&source);

        let event = chat.handle_user_question("hi".to_string(), None).await;

        assert_eq!(event, UiEvent::Error("API error: invalid key".to_string()));
        assert_eq!(chat.log().len(), 1);
        assert_eq!(chat.log().last().unwrap().role, MessageRole::User);
    }

    #[tokio::test]
    async fn test_empty_response_appends_no_assistant_turn() {
        let source = MockSource::with_replies(vec![Err(LlmError::EmptyResponse)]);
        let mut chat = session(&source);

        let event = chat.handle_user_question("hi".to_string(), None).await;

        assert_eq!(event, UiEvent::Error("No response from API".to_string()));
        assert_eq!(chat.log().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_credential_drops_question() {
        let source = MockSource::unconfigured();
        let mut chat = session(&source);

        let event = chat.handle_user_question("hi".to_string(), None).await;

        assert!(event.is_error());
        assert!(event.content().unwrap().contains("API key is not configured"));
        assert_eq!(chat.log().len(), 0);
        assert!(source.requests().is_empty());
    }

    #[tokio::test]
    async fn test_blank_question_is_rejected() {
        let source = MockSource::with_replies(vec![ok_reply("unused")]);
        let mut chat = session(&source);

        let err = chat.ask("   ".to_string(), None).await.unwrap_err();

        assert!(matches!(err, ChatError::InvalidInput(_)));
        assert!(chat.log().is_empty());
        assert!(source.requests().is_empty());
    }

    #[tokio::test]
    async fn test_image_only_question_is_sent_with_empty_content() {
        let source = MockSource::with_replies(vec![ok_reply("a cat")]);
        let mut chat = session(&source);
        let image = ImageAttachment {
            data: "data:image/png;base64,AAAA".to_string(),
            mime_type: "image/png".to_string(),
            name: Some("cat.png".to_string()),
        };

        let event = chat.handle_user_question(String::new(), Some(image.clone())).await;

        assert_eq!(event, UiEvent::Response("a cat".to_string()));
        assert_eq!(chat.log().turns()[0].image.as_ref(), Some(&image));
        let requests = source.requests();
        assert_eq!(requests[0].messages[0].content, "");
    }

    #[tokio::test]
    async fn test_request_carries_full_history_in_order() {
        let source = MockSource::with_replies(vec![ok_reply("a1"), ok_reply("a2"), ok_reply("a3")]);
        let mut chat = session(&source);

        for q in ["q1", "q2", "q3"] {
            chat.handle_user_question(q.to_string(), None).await;
        }

        let requests = source.requests();
        assert_eq!(requests.len(), 3);
        let last: Vec<_> = requests[2]
            .messages
            .iter()
            .map(|m| (m.role, m.content.as_str()))
            .collect();
        assert_eq!(
            last,
            vec![
                (MessageRole::User, "q1"),
                (MessageRole::Assistant, "a1"),
                (MessageRole::User, "q2"),
                (MessageRole::Assistant, "a2"),
                (MessageRole::User, "q3"),
            ]
        );
        assert_eq!(requests[2].model, "mock-model");
        assert_eq!(requests[2].max_tokens, 64);
    }

    #[tokio::test]
    async fn test_retry_after_failure_includes_dangling_user_turn() {
        let source = MockSource::with_replies(vec![
            Err(LlmError::Api {
                status_code: None,
                message: "connection refused".to_string(),
            }),
            ok_reply("finally"),
        ]);
        let mut chat = session(&source);

        chat.handle_user_question("first try".to_string(), None).await;
        let event = chat.handle_user_question("second try".to_string(), None).await;

        assert_eq!(event, UiEvent::Response("finally".to_string()));
        assert_eq!(chat.log().len(), 3);
        let second = &source.requests()[1];
        assert_eq!(second.messages.len(), 2);
        assert_eq!(second.messages[0].content, "first try");
        assert_eq!(second.messages[1].content, "second try");
    }

    #[tokio::test]
    async fn test_log_grows_monotonically_over_many_exchanges() {
        let replies = (0..12).map(|i| ok_reply(&format!("answer {i}"))).collect();
        let source = MockSource::with_replies(replies);
        let mut chat = session(&source);

        let mut previous: Vec<Turn> = Vec::new();
        for i in 0..12 {
            let event = chat.handle_user_question(format!("question {i}"), None).await;
            assert_eq!(event, UiEvent::Response(format!("answer {i}")));
            assert_eq!(chat.log().len(), (i + 1) * 2);
            assert_eq!(&chat.log().turns()[..previous.len()], previous.as_slice());
            previous = chat.log().turns().to_vec();
        }
    }

    #[tokio::test]
    async fn test_usage_accumulates() {
        let source = MockSource::with_replies(vec![ok_reply("a"), ok_reply("b")]);
        let mut chat = session(&source);

        chat.handle_user_question("x".to_string(), None).await;
        chat.handle_user_question("y".to_string(), None).await;

        assert_eq!(chat.usage().input_tokens, 20);
        assert_eq!(chat.usage().output_tokens, 10);
    }

    mod span_fields {
        use std::fmt;
        use std::sync::{Arc, Mutex};

        use tracing::field::{Field, Visit};
        use tracing::Subscriber;
        use tracing::span::{Attributes, Id, Record};
        use tracing_subscriber::layer::{Context, Layer};

        pub(super) type Fields = Arc<Mutex<Vec<(String, String)>>>;

        /// Collects every span field value, at creation and on `record`.
        pub(super) struct SpanFields(pub(super) Fields);

        struct Collect<'a>(&'a Mutex<Vec<(String, String)>>);

        impl Visit for Collect<'_> {
            fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
                self.0
                    .lock()
                    .unwrap()
                    .push((field.name().to_string(), format!("{value:?}")));
            }
        }

        impl<S: Subscriber> Layer<S> for SpanFields {
            fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
                attrs.record(&mut Collect(&self.0));
            }

            fn on_record(&self, _id: &Id, values: &Record<'_>, _ctx: Context<'_, S>) {
                values.record(&mut Collect(&self.0));
            }
        }
    }

    #[tokio::test]
    async fn test_completion_span_records_gen_ai_usage() {
        use tracing_subscriber::layer::SubscriberExt;

        let fields = span_fields::Fields::default();
        let subscriber =
            tracing_subscriber::registry().with(span_fields::SpanFields(fields.clone()));
        let _guard = tracing::subscriber::set_default(subscriber);

        let source = MockSource::with_replies(vec![ok_reply("42")]);
        let mut chat = session(&source);
        chat.ask("What is 6*7?".to_string(), None).await.unwrap();

        let fields = fields.lock().unwrap();
        let value = |name: &str| {
            fields
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value.clone())
        };
        assert_eq!(value("gen_ai.request.model").as_deref(), Some("mock-model"));
        assert_eq!(value("gen_ai.usage.input_tokens").as_deref(), Some("10"));
        assert_eq!(value("gen_ai.usage.output_tokens").as_deref(), Some("5"));
    }
}
