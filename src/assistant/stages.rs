//! Staged "thinking" indicator shown while a reply is prepared.
//!
//! The delays are presentation only; nothing is computed during them.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThinkingStage {
    Processing,
    Analyzing,
    Consulting,
    Generating,
}

impl ThinkingStage {
    /// Display order.
    pub const SEQUENCE: [ThinkingStage; 4] = [
        Self::Processing,
        Self::Analyzing,
        Self::Consulting,
        Self::Generating,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Processing => "Processing your message...",
            Self::Analyzing => "Analyzing patterns...",
            Self::Consulting => "Consulting medical knowledge...",
            Self::Generating => "Generating recommendations...",
        }
    }
}

/// How long each stage stays on screen, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDelays {
    pub processing_ms: u64,
    pub analyzing_ms: u64,
    pub consulting_ms: u64,
    pub generating_ms: u64,
}

impl StageDelays {
    pub fn none() -> Self {
        Self {
            processing_ms: 0,
            analyzing_ms: 0,
            consulting_ms: 0,
            generating_ms: 0,
        }
    }

    pub fn delay_for(&self, stage: ThinkingStage) -> Duration {
        Duration::from_millis(match stage {
            ThinkingStage::Processing => self.processing_ms,
            ThinkingStage::Analyzing => self.analyzing_ms,
            ThinkingStage::Consulting => self.consulting_ms,
            ThinkingStage::Generating => self.generating_ms,
        })
    }

    pub fn total(&self) -> Duration {
        ThinkingStage::SEQUENCE
            .iter()
            .map(|s| self.delay_for(*s))
            .sum()
    }
}

impl Default for StageDelays {
    fn default() -> Self {
        Self {
            processing_ms: 0,
            analyzing_ms: 800,
            consulting_ms: 600,
            generating_ms: 400,
        }
    }
}
