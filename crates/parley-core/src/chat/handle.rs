//! Shareable handle enforcing one in-flight question per session.
//!
//! The panel may fire a second question before the first one is answered.
//! Two exchanges racing on the same log would interleave turns, so the
//! handle serialises them behind an async mutex and applies the configured
//! [`BusyPolicy`] to the late arrival.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

use parley_types::chat::{ImageAttachment, SessionInfo, Turn};
use parley_types::config::BusyPolicy;
use parley_types::error::ChatError;
use parley_types::event::{UiCommand, UiEvent};
use parley_types::llm::Usage;

use super::session::ChatSession;

/// Copy of the session state taken after every question, readable while
/// the next question is in flight.
#[derive(Debug, Clone, Default)]
struct Snapshot {
    turns: Vec<Turn>,
    usage: Usage,
}

/// Cloneable, thread-safe handle to one [`ChatSession`].
#[derive(Clone)]
pub struct SessionHandle {
    id: Uuid,
    created_at: DateTime<Utc>,
    policy: BusyPolicy,
    session: Arc<Mutex<ChatSession>>,
    snapshot: Arc<RwLock<Snapshot>>,
    in_flight: Arc<AtomicBool>,
}

/// Marks a question as in flight until dropped, including on unwind.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SessionHandle {
    pub fn new(session: ChatSession, policy: BusyPolicy) -> Self {
        let snapshot = Snapshot {
            turns: session.log().turns().to_vec(),
            usage: session.usage(),
        };
        Self {
            id: session.id(),
            created_at: session.created_at(),
            policy,
            session: Arc::new(Mutex::new(session)),
            snapshot: Arc::new(RwLock::new(snapshot)),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn policy(&self) -> BusyPolicy {
        self.policy
    }

    /// Whether a question is currently being answered.
    ///
    /// Reads a flag only; never contends with [`SessionHandle::ask`] for the
    /// session lock.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Dispatch a panel command.
    pub async fn handle_command(&self, command: UiCommand) -> UiEvent {
        match command {
            UiCommand::AskQuestion { text, image } => self.ask(text, image).await,
            UiCommand::Ping => UiEvent::Pong,
        }
    }

    /// Answer a question, honouring the busy policy.
    ///
    /// Panics inside the exchange are caught here and reported as an error
    /// event; the session stays usable.
    pub async fn ask(&self, text: String, image: Option<ImageAttachment>) -> UiEvent {
        let mut session = match self.policy {
            BusyPolicy::Queue => self.session.lock().await,
            BusyPolicy::Reject => match self.session.try_lock() {
                Ok(guard) => guard,
                Err(_) => {
                    info!(session_id = %self.id, "Rejecting question: session busy");
                    return UiEvent::Error(ChatError::Busy.to_string());
                }
            },
        };
        let in_flight = InFlight::enter(&self.in_flight);

        let outcome = AssertUnwindSafe(session.handle_user_question(text, image))
            .catch_unwind()
            .await;

        let event = match outcome {
            Ok(event) => event,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(session_id = %self.id, panic = %message, "Question handler panicked");
                UiEvent::Error(ChatError::Internal(message).to_string())
            }
        };

        self.refresh_snapshot(&session);
        drop(session);
        drop(in_flight);
        event
    }

    /// Turns as of the last completed question.
    pub fn turns(&self) -> Vec<Turn> {
        match self.snapshot.read() {
            Ok(snapshot) => snapshot.turns.clone(),
            Err(poisoned) => poisoned.into_inner().turns.clone(),
        }
    }

    pub fn info(&self) -> SessionInfo {
        let (turn_count, usage) = match self.snapshot.read() {
            Ok(snapshot) => (snapshot.turns.len(), snapshot.usage),
            Err(poisoned) => {
                let snapshot = poisoned.into_inner();
                (snapshot.turns.len(), snapshot.usage)
            }
        };
        SessionInfo {
            id: self.id,
            created_at: self.created_at,
            turn_count,
            total_input_tokens: usage.input_tokens,
            total_output_tokens: usage.output_tokens,
            busy: self.is_busy(),
        }
    }

    fn refresh_snapshot(&self, session: &ChatSession) {
        let fresh = Snapshot {
            turns: session.log().turns().to_vec(),
            usage: session.usage(),
        };
        match self.snapshot.write() {
            Ok(mut snapshot) => *snapshot = fresh,
            Err(poisoned) => *poisoned.into_inner() = fresh,
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected internal failure".to_string()
    }
}
