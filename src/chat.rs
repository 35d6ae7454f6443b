//! Chat conversation: transcript, single-flight submission, staged
//! thinking indicator.
//!
//! A conversation is either idle or awaiting a response. Submitting
//! moves it to awaiting for the duration of the stage delays; a second
//! submission in that window is rejected without touching the
//! transcript. There is no cancellation or retry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::assistant::{Assistant, ThinkingStage};
use crate::models::enums::MessageRole;
use crate::models::{ChatMessage, UserProfile};

// ═══════════════════════════════════════════
// Types
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    Idle,
    AwaitingResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Empty or whitespace-only input.
    EmptyMessage,
    /// A previous submission is still being answered.
    ResponsePending,
}

#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Replied {
        user: ChatMessage,
        replies: Vec<ChatMessage>,
    },
    Rejected(RejectReason),
}

/// Snapshot for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationView {
    pub title: String,
    pub state: ConversationState,
    pub stage: Option<ThinkingStage>,
    pub stage_label: Option<String>,
    pub messages: Vec<ChatMessage>,
}

// ═══════════════════════════════════════════
// Conversation
// ═══════════════════════════════════════════

/// Session-scoped, append-only transcript. Nothing here is persisted;
/// a new conversation starts from the welcome message.
pub struct Conversation {
    transcript: Mutex<Vec<ChatMessage>>,
    awaiting: AtomicBool,
    stage: watch::Sender<Option<ThinkingStage>>,
}

impl Conversation {
    pub fn new(welcome: ChatMessage) -> Self {
        let (stage, _) = watch::channel(None);
        Self {
            transcript: Mutex::new(vec![welcome]),
            awaiting: AtomicBool::new(false),
            stage,
        }
    }

    fn lock_transcript(&self) -> MutexGuard<'_, Vec<ChatMessage>> {
        // Appends are single pushes; a poisoned lock still holds a valid Vec.
        self.transcript
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock_transcript().clone()
    }

    pub fn len(&self) -> usize {
        self.lock_transcript().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_transcript().is_empty()
    }

    pub fn state(&self) -> ConversationState {
        if self.awaiting.load(Ordering::Acquire) {
            ConversationState::AwaitingResponse
        } else {
            ConversationState::Idle
        }
    }

    pub fn current_stage(&self) -> Option<ThinkingStage> {
        *self.stage.borrow()
    }

    /// Follow the thinking indicator as it advances.
    pub fn watch_stage(&self) -> watch::Receiver<Option<ThinkingStage>> {
        self.stage.subscribe()
    }

    pub fn view(&self) -> ConversationView {
        let messages = self.messages();
        let title = messages
            .iter()
            .find(|m| m.role == MessageRole::User)
            .map(|m| generate_title(&m.content))
            .unwrap_or_else(|| generate_title(""));
        let stage = self.current_stage();
        ConversationView {
            title,
            state: self.state(),
            stage,
            stage_label: stage.map(|s| s.label().to_string()),
            messages,
        }
    }

    /// Submit one user message and wait for the assistant's reply.
    pub async fn submit(
        &self,
        assistant: &Assistant,
        text: &str,
        profile: Option<&UserProfile>,
    ) -> SubmitOutcome {
        if text.trim().is_empty() {
            return SubmitOutcome::Rejected(RejectReason::EmptyMessage);
        }
        if self
            .awaiting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Submission rejected: response pending");
            return SubmitOutcome::Rejected(RejectReason::ResponsePending);
        }
        let _pending = PendingGuard(self);

        let user = ChatMessage::user(text);
        self.lock_transcript().push(user.clone());

        let delays = &assistant.config().stage_delays;
        for stage in ThinkingStage::SEQUENCE {
            self.stage.send_replace(Some(stage));
            // Zero-delay stages still get one scheduling point so
            // watchers observe them.
            tokio::task::yield_now().await;
            let delay = delays.delay_for(stage);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        let replies = assistant.reply(text, profile);
        self.lock_transcript().extend(replies.iter().cloned());
        tracing::info!(replies = replies.len(), "Assistant replied");

        SubmitOutcome::Replied { user, replies }
    }
}

/// Returns the conversation to idle when the submission ends.
struct PendingGuard<'a>(&'a Conversation);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.stage.send_replace(None);
        self.0.awaiting.store(false, Ordering::Release);
    }
}

// ═══════════════════════════════════════════
// Title generation
// ═══════════════════════════════════════════

/// Generate a conversation title from the first user message.
/// Truncates at 50 characters with "..." if longer, handling UTF-8 correctly.
pub fn generate_title(first_message: &str) -> String {
    let trimmed = first_message.trim();
    if trimmed.is_empty() {
        return "New conversation".to_string();
    }

    match trimmed.char_indices().nth(50) {
        Some((boundary, _)) => format!("{}...", &trimmed[..boundary]),
        None => trimmed.to_string(),
    }
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
