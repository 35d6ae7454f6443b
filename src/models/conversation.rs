use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::enums::{Emotion, MessageCategory, MessageRole, RiskLevel, Severity};

/// Structured result of scanning one free-text message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Positive-word hits minus negative-word hits.
    pub sentiment: i32,
    /// Symptom phrases found in the message, in knowledge-base order.
    /// Not de-duplicated.
    pub matched_keywords: Vec<String>,
    pub severity: Severity,
    /// Synthetic score in [0.3, 0.9] driven by the match count.
    pub confidence: f32,
    /// One "Symptom associated with {condition}" line per hit.
    pub medical_context: Vec<String>,
}

impl Default for AnalysisResult {
    fn default() -> Self {
        Self {
            sentiment: 0,
            matched_keywords: Vec::new(),
            severity: Severity::Low,
            confidence: 0.3,
            medical_context: Vec::new(),
        }
    }
}

/// Presentation metadata attached to an assistant turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiFeatures {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<Emotion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_specialists: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment_approach: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub follow_up_questions: Vec<String>,
}

/// One entry of the chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<MessageCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_features: Option<AiFeatures>,
    pub timestamp: NaiveDateTime,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content.into(), None)
    }

    pub fn assistant(content: impl Into<String>, category: MessageCategory) -> Self {
        Self::new(MessageRole::Assistant, content.into(), Some(category))
    }

    fn new(role: MessageRole, content: String, category: Option<MessageCategory>) -> Self {
        Self {
            id: next_message_id(),
            role,
            content,
            category,
            analysis: None,
            ai_features: None,
            timestamp: Local::now().naive_local(),
        }
    }

    pub fn with_analysis(mut self, analysis: AnalysisResult) -> Self {
        self.analysis = Some(analysis);
        self
    }

    pub fn with_features(mut self, features: AiFeatures) -> Self {
        self.ai_features = Some(features);
        self
    }
}

static LAST_MESSAGE_ID: AtomicI64 = AtomicI64::new(0);

/// Time-based message id, strictly increasing within the process even
/// when two messages are created in the same millisecond.
pub fn next_message_id() -> String {
    let now = Local::now().timestamp_millis();
    let mut last = LAST_MESSAGE_ID.load(Ordering::Relaxed);
    loop {
        let candidate = now.max(last + 1);
        match LAST_MESSAGE_ID.compare_exchange_weak(
            last,
            candidate,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return candidate.to_string(),
            Err(actual) => last = actual,
        }
    }
}
