//! Per-collection record schemas for the document store.
//!
//! Each input type is validated before it reaches a repository; the
//! `*Record` types are what comes back out, stamped with the owning user
//! and a store-assigned timestamp.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::conversation::ChatMessage;
use super::enums::ActivityLevel;
use super::ValidationError;

/// Default daily water goal, in glasses.
pub const DEFAULT_WATER_GOAL: u32 = 8;

// ═══════════════════════════════════════════
// Health metrics
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthMetrics {
    #[serde(default)]
    pub heart_rate: Option<u32>,
    #[serde(default)]
    pub sleep_hours: Option<f32>,
    #[serde(default)]
    pub steps: Option<u32>,
    /// Self-reported, 1 (calm) to 10 (overwhelmed).
    #[serde(default)]
    pub stress_level: Option<u8>,
    #[serde(default)]
    pub activity_level: Option<ActivityLevel>,
}

impl HealthMetrics {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(hr) = self.heart_rate {
            if !(20..=250).contains(&hr) {
                return Err(ValidationError::new("heart_rate", format!("{hr} bpm is implausible")));
            }
        }
        if let Some(hours) = self.sleep_hours {
            if !(0.0..=24.0).contains(&hours) {
                return Err(ValidationError::new("sleep_hours", "must be between 0 and 24"));
            }
        }
        if let Some(stress) = self.stress_level {
            if !(1..=10).contains(&stress) {
                return Err(ValidationError::new("stress_level", "must be between 1 and 10"));
            }
        }
        if self == &Self::default() {
            return Err(ValidationError::new("metrics", "at least one value is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub id: String,
    pub user_id: String,
    #[serde(flatten)]
    pub metrics: HealthMetrics,
    pub timestamp: NaiveDateTime,
}

// ═══════════════════════════════════════════
// Mood
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub mood: String,
    /// 1 (very low) to 10 (excellent).
    pub score: u8,
    #[serde(default)]
    pub note: Option<String>,
}

impl MoodEntry {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.mood.trim().is_empty() {
            return Err(ValidationError::new("mood", "must not be empty"));
        }
        if !(1..=10).contains(&self.score) {
            return Err(ValidationError::new("score", "must be between 1 and 10"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodRecord {
    pub id: String,
    pub user_id: String,
    #[serde(flatten)]
    pub entry: MoodEntry,
    pub timestamp: NaiveDateTime,
}

// ═══════════════════════════════════════════
// Water intake
// ═══════════════════════════════════════════

/// Partial update: a missing `goal` keeps the stored one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterIntake {
    pub date: NaiveDate,
    pub glasses: u32,
    #[serde(default)]
    pub goal: Option<u32>,
}

impl WaterIntake {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.glasses > 50 {
            return Err(ValidationError::new("glasses", "more than 50 glasses in a day"));
        }
        if self.goal == Some(0) {
            return Err(ValidationError::new("goal", "must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterIntakeRecord {
    pub user_id: String,
    pub date: NaiveDate,
    pub glasses: u32,
    pub goal: u32,
    pub timestamp: NaiveDateTime,
}

impl WaterIntakeRecord {
    pub fn goal_reached(&self) -> bool {
        self.glasses >= self.goal
    }
}

// ═══════════════════════════════════════════
// Medications
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationItem {
    pub name: String,
    #[serde(default)]
    pub dose: Option<String>,
    /// Scheduled times of day, "HH:MM".
    #[serde(default)]
    pub times: Vec<String>,
    #[serde(default)]
    pub taken: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MedicationSchedule {
    pub items: Vec<MedicationItem>,
}

impl MedicationSchedule {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for item in &self.items {
            if item.name.trim().is_empty() {
                return Err(ValidationError::new("medication.name", "must not be empty"));
            }
            if let Some(bad) = item
                .times
                .iter()
                .find(|t| chrono::NaiveTime::parse_from_str(t, "%H:%M").is_err())
            {
                return Err(ValidationError::new(
                    "medication.times",
                    format!("'{bad}' is not HH:MM"),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationRecord {
    pub user_id: String,
    pub items: Vec<MedicationItem>,
    pub timestamp: NaiveDateTime,
}

// ═══════════════════════════════════════════
// Chat history
// ═══════════════════════════════════════════

/// A transcript entry as persisted for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredChatMessage {
    pub user_id: String,
    #[serde(flatten)]
    pub message: ChatMessage,
}
