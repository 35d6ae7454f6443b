//! Rule-based wellness assistant.
//!
//! - `knowledge`: the static condition table
//! - `analyzer`: sentiment / keyword / severity scan of a message
//! - `responder`: priority-ordered reply rules and templates
//! - `stages`: the staged "thinking" indicator and its delay table

pub mod analyzer;
pub mod knowledge;
pub mod responder;
pub mod stages;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::enums::{Emotion, MessageCategory};
use crate::models::{AiFeatures, AnalysisResult, ChatMessage, UserProfile};

pub use knowledge::{Condition, KnowledgeBase, KnowledgeEntry};
pub use responder::ResponseRule;
pub use stages::{StageDelays, ThinkingStage};

/// Reply used when no rule matches, unless overridden.
pub const DEFAULT_FALLBACK_MESSAGE: &str = "I'm here to help with your wellbeing. Could you tell me a little more about how you're feeling, any symptoms you've noticed, or whether you'd like exercise guidance?";

const WELCOME_MESSAGE: &str = "Hello! I'm your LifeSync health assistant. I can look at the symptoms you describe, share evidence-based wellness recommendations, and suggest next steps. How are you feeling today?";

const WELCOME_FOLLOW_UPS: [&str; 3] = [
    "Would you like to discuss any specific health concerns?",
    "Shall we start with a quick health assessment?",
    "Would you prefer general wellness advice?",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantConfig {
    pub stage_delays: StageDelays,
    /// `None` keeps the blank assistant turn when nothing matches.
    pub fallback_message: Option<String>,
    /// Profiles strictly older than this get the senior exercise plan.
    pub senior_age_threshold: u32,
}

impl AssistantConfig {
    /// Same replies, no artificial delays.
    pub fn instant() -> Self {
        Self {
            stage_delays: StageDelays::none(),
            ..Self::default()
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            stage_delays: StageDelays::default(),
            fallback_message: Some(DEFAULT_FALLBACK_MESSAGE.to_string()),
            senior_age_threshold: 60,
        }
    }
}

/// Knowledge base plus reply policy, shared by every conversation.
#[derive(Debug, Clone)]
pub struct Assistant {
    kb: Arc<KnowledgeBase>,
    config: AssistantConfig,
}

impl Assistant {
    pub fn new(kb: Arc<KnowledgeBase>, config: AssistantConfig) -> Self {
        Self { kb, config }
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn analyze(&self, message: &str) -> AnalysisResult {
        analyzer::analyze(&self.kb, message)
    }

    /// Analyze and answer one user message.
    pub fn reply(&self, message: &str, profile: Option<&UserProfile>) -> Vec<ChatMessage> {
        let analysis = self.analyze(message);
        responder::generate(&self.kb, &self.config, message, &analysis, profile)
    }

    /// Opening turn of every new conversation.
    pub fn welcome_message(&self) -> ChatMessage {
        ChatMessage::assistant(WELCOME_MESSAGE, MessageCategory::General).with_features(
            AiFeatures {
                emotion: Some(Emotion::Neutral),
                confidence: Some(0.95),
                follow_up_questions: WELCOME_FOLLOW_UPS.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            },
        )
    }
}

impl Default for Assistant {
    fn default() -> Self {
        Self::new(Arc::new(KnowledgeBase::builtin()), AssistantConfig::default())
    }
}
