//! Keyword analysis of a single chat message.
//!
//! Sentiment and severity are token-exact lookups over the
//! whitespace-split lowercase message; tokens keep any punctuation, so
//! "sad." does not count as "sad". Symptom phrases are matched as
//! substrings of the whole message instead.

use crate::models::enums::Severity;
use crate::models::AnalysisResult;

use super::knowledge::KnowledgeBase;

const POSITIVE_WORDS: &[&str] = &[
    "good", "better", "great", "happy", "confident", "improving", "hopeful",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "worse", "terrible", "sad", "anxious", "stressed", "depressed", "worried", "afraid",
];

/// Severity vocabulary in precedence order: the first tier with a token
/// hit wins.
const SEVERITY_WORDS: [(Severity, &[&str]); 3] = [
    (
        Severity::High,
        &["severe", "extreme", "very", "constantly", "always", "unbearable"],
    ),
    (Severity::Medium, &["moderate", "sometimes", "often", "frequent"]),
    (Severity::Low, &["mild", "occasionally", "slightly", "rare"]),
];

const BASE_CONFIDENCE: f32 = 0.3;
const CONFIDENCE_PER_MATCH: f32 = 0.2;
const MAX_CONFIDENCE: f32 = 0.9;

/// Analyze one message against the knowledge base. Total over all
/// inputs: empty text yields the all-default result.
pub fn analyze(kb: &KnowledgeBase, message: &str) -> AnalysisResult {
    let lowered = message.to_lowercase();
    let tokens: Vec<&str> = lowered.split_whitespace().collect();

    let mut matched_keywords = Vec::new();
    let mut medical_context = Vec::new();
    for (condition, entry) in kb.all_conditions() {
        for symptom in entry.symptoms {
            if lowered.contains(&symptom.to_lowercase()) {
                matched_keywords.push((*symptom).to_string());
                medical_context.push(format!("Symptom associated with {}", condition.as_str()));
            }
        }
    }

    let confidence = confidence_for(matched_keywords.len());

    AnalysisResult {
        sentiment: sentiment_score(&tokens),
        matched_keywords,
        severity: severity_tier(&tokens),
        confidence,
        medical_context,
    }
}

/// +1 per positive token, -1 per negative token. Not length-normalized.
pub fn sentiment_score(tokens: &[&str]) -> i32 {
    tokens
        .iter()
        .map(|t| {
            let positive = POSITIVE_WORDS.contains(t) as i32;
            let negative = NEGATIVE_WORDS.contains(t) as i32;
            positive - negative
        })
        .sum()
}

/// High beats medium beats low, regardless of keyword matches.
pub fn severity_tier(tokens: &[&str]) -> Severity {
    SEVERITY_WORDS
        .iter()
        .find(|(_, words)| tokens.iter().any(|t| words.contains(t)))
        .map(|(tier, _)| *tier)
        .unwrap_or(Severity::Low)
}

/// `min(0.2 × matches + 0.3, 0.9)`.
pub fn confidence_for(match_count: usize) -> f32 {
    (CONFIDENCE_PER_MATCH * match_count as f32 + BASE_CONFIDENCE).min(MAX_CONFIDENCE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kb() -> KnowledgeBase {
        KnowledgeBase::builtin()
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn known_symptom_is_matched_with_context() {
        let result = analyze(&kb(), "I've had restlessness all week");
        assert!(result.matched_keywords.contains(&"restlessness".to_string()));
        assert!(result
            .medical_context
            .contains(&"Symptom associated with anxiety".to_string()));
    }

    #[test]
    fn confidence_formula_over_match_counts() {
        assert!(close(confidence_for(0), 0.3));
        assert!(close(confidence_for(1), 0.5));
        assert!(close(confidence_for(2), 0.7));
        assert!(close(confidence_for(3), 0.9));
        assert!(close(confidence_for(10), 0.9));
    }

    #[test]
    fn confidence_tracks_actual_matches() {
        let result = analyze(&kb(), "restlessness, fatigue and irritability");
        assert_eq!(result.matched_keywords.len(), 3);
        assert!(close(result.confidence, 0.9));
    }

    #[test]
    fn high_severity_wins_over_low() {
        let result = analyze(&kb(), "it is mild but sometimes severe");
        assert_eq!(result.severity, Severity::High);
    }

    #[test]
    fn medium_severity_detected() {
        let result = analyze(&kb(), "it happens often");
        assert_eq!(result.severity, Severity::Medium);
    }

    #[test]
    fn severity_defaults_low() {
        assert_eq!(analyze(&kb(), "just checking in").severity, Severity::Low);
    }

    #[test]
    fn sentiment_counts_hits() {
        assert_eq!(analyze(&kb(), "I feel good and happy").sentiment, 2);
        assert_eq!(analyze(&kb(), "I feel bad and sad").sentiment, -2);
        assert_eq!(analyze(&kb(), "good but sad").sentiment, 0);
    }

    #[test]
    fn empty_message_is_all_default() {
        let result = analyze(&kb(), "");
        assert_eq!(result, AnalysisResult::default());
    }

    #[test]
    fn trailing_punctuation_defeats_token_match() {
        assert_eq!(analyze(&kb(), "I am sad.").sentiment, 0);
    }

    #[test]
    fn overlapping_phrases_are_not_deduplicated() {
        // "muscle tension" (anxiety) also contains "tension" (stress)
        let result = analyze(&kb(), "muscle tension");
        assert_eq!(result.matched_keywords, vec!["muscle tension", "tension"]);
        assert_eq!(
            result.medical_context,
            vec![
                "Symptom associated with anxiety",
                "Symptom associated with stress"
            ]
        );
    }

    #[test]
    fn symptom_match_is_case_insensitive() {
        let result = analyze(&kb(), "Rapid Heartbeat at night");
        assert_eq!(result.matched_keywords, vec!["rapid heartbeat"]);
    }
}
