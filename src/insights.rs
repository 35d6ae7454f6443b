//! Dashboard insights derived from the two most recent metrics readings.
//!
//! Each insight compares the latest reading against the one before it
//! for a trend, and picks analysis/recommendation text from fixed bands.

use serde::{Deserialize, Serialize};

use crate::models::enums::ActivityLevel;
use crate::models::HealthMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthInsight {
    pub metric: String,
    pub value: String,
    pub trend: Trend,
    pub analysis: String,
    pub recommendation: String,
}

/// Changes within these bands count as no change.
const HEART_RATE_TOLERANCE: f64 = 2.0;
const SLEEP_TOLERANCE: f64 = 0.25;

fn trend_between(latest: f64, previous: Option<f64>, tolerance: f64) -> Trend {
    match previous {
        Some(prev) if latest - prev > tolerance => Trend::Up,
        Some(prev) if prev - latest > tolerance => Trend::Down,
        _ => Trend::Neutral,
    }
}

fn insight(metric: &str, value: String, trend: Trend, analysis: &str, recommendation: &str) -> HealthInsight {
    HealthInsight {
        metric: metric.to_string(),
        value,
        trend,
        analysis: analysis.to_string(),
        recommendation: recommendation.to_string(),
    }
}

/// Insights for every metric present in `latest`, in display order.
pub fn derive_insights(latest: &HealthMetrics, previous: Option<&HealthMetrics>) -> Vec<HealthInsight> {
    [
        heart_rate_insight(latest, previous),
        sleep_insight(latest, previous),
        activity_insight(latest, previous),
        stress_insight(latest, previous),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn heart_rate_insight(latest: &HealthMetrics, previous: Option<&HealthMetrics>) -> Option<HealthInsight> {
    let bpm = latest.heart_rate?;
    let trend = trend_between(
        bpm as f64,
        previous.and_then(|p| p.heart_rate).map(f64::from),
        HEART_RATE_TOLERANCE,
    );
    let (analysis, recommendation) = match bpm {
        0..=59 => (
            "Your resting heart rate is below the typical range.",
            "If you feel dizzy or tired, mention this reading to your doctor.",
        ),
        60..=100 => (
            "Your heart rate shows a healthy pattern with optimal recovery periods.",
            "Consider incorporating more low-intensity activities for better heart rate variability.",
        ),
        _ => (
            "Your heart rate is elevated compared with the typical resting range.",
            "Rest, hydrate and try slow breathing; seek care if it stays high.",
        ),
    };
    Some(insight("Heart Rate", format!("{bpm} BPM"), trend, analysis, recommendation))
}

fn sleep_insight(latest: &HealthMetrics, previous: Option<&HealthMetrics>) -> Option<HealthInsight> {
    let hours = f64::from(latest.sleep_hours?);
    let trend = trend_between(
        hours,
        previous.and_then(|p| p.sleep_hours).map(f64::from),
        SLEEP_TOLERANCE,
    );
    let (analysis, recommendation) = if hours < 7.0 {
        (
            "You are sleeping less than the recommended 7 to 9 hours.",
            "Aim for an earlier, consistent bedtime and limit caffeine after noon.",
        )
    } else if hours <= 9.0 {
        (
            "Your sleep duration is within the recommended range, but quality could be improved.",
            "Try maintaining a consistent sleep schedule and reducing screen time before bed.",
        )
    } else {
        (
            "You are sleeping more than the recommended range.",
            "Keep a regular wake time; persistent oversleeping is worth discussing with a doctor.",
        )
    };
    Some(insight("Sleep Quality", format!("{hours:.1} hrs"), trend, analysis, recommendation))
}

/// Explicit level wins; otherwise estimate from step count.
fn activity_level(metrics: &HealthMetrics) -> Option<ActivityLevel> {
    metrics.activity_level.or_else(|| {
        metrics.steps.map(|steps| match steps {
            0..=4_999 => ActivityLevel::Low,
            5_000..=9_999 => ActivityLevel::Moderate,
            _ => ActivityLevel::High,
        })
    })
}

fn activity_rank(level: ActivityLevel) -> f64 {
    match level {
        ActivityLevel::Low => 0.0,
        ActivityLevel::Moderate => 1.0,
        ActivityLevel::High => 2.0,
    }
}

fn activity_insight(latest: &HealthMetrics, previous: Option<&HealthMetrics>) -> Option<HealthInsight> {
    let level = activity_level(latest)?;
    let trend = trend_between(
        activity_rank(level),
        previous.and_then(activity_level).map(activity_rank),
        0.0,
    );
    let (value, analysis, recommendation) = match level {
        ActivityLevel::Low => (
            "Low",
            "Your activity has been limited recently.",
            "Start with short daily walks and build up gradually.",
        ),
        ActivityLevel::Moderate => (
            "Moderate",
            "You're staying reasonably active.",
            "Add one or two brisk sessions a week to reach 150 minutes of moderate activity.",
        ),
        ActivityLevel::High => (
            "High",
            "You've maintained an active lifestyle this week with consistent exercise.",
            "Great progress! Mix in some strength training to complement your cardio routine.",
        ),
    };
    Some(insight("Activity Level", value.to_string(), trend, analysis, recommendation))
}

fn stress_insight(latest: &HealthMetrics, previous: Option<&HealthMetrics>) -> Option<HealthInsight> {
    let level = latest.stress_level?;
    let trend = trend_between(
        f64::from(level),
        previous.and_then(|p| p.stress_level).map(f64::from),
        0.0,
    );
    let (value, analysis, recommendation) = match level {
        0..=3 => (
            "Low",
            "Your stress levels are low.",
            "Continue your mindfulness practices and regular exercise routine.",
        ),
        4..=6 => (
            "Moderate",
            "You're carrying a moderate amount of stress.",
            "Schedule short breaks and try a daily breathing or relaxation exercise.",
        ),
        _ => (
            "High",
            "Your stress levels are high.",
            "Prioritize rest, reach out to someone you trust and consider talking to a counselor.",
        ),
    };
    Some(insight("Stress Level", value.to_string(), trend, analysis, recommendation))
}
