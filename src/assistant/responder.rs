//! Reply selection and rendering.
//!
//! Rules are tried in priority order and the first one that applies
//! produces the whole reply:
//!
//! 1. symptom match (first matching condition in table order)
//! 2. exercise intent ("exercise" / "workout")
//! 3. negative sentiment
//! 4. fallback

use crate::models::enums::{Emotion, MessageCategory, RiskLevel};
use crate::models::{AiFeatures, AnalysisResult, ChatMessage, UserProfile};

use super::knowledge::{Condition, KnowledgeBase, KnowledgeEntry};
use super::AssistantConfig;

const EXERCISE_TRIGGERS: &[&str] = &["exercise", "workout"];

const SYMPTOM_FOLLOW_UPS: [&str; 3] = [
    "Would you like more information about any of these recommendations?",
    "Shall we discuss specific treatment approaches in detail?",
    "Would you like help finding specialists in your area?",
];

const EXERCISE_FOLLOW_UPS: [&str; 3] = [
    "Would you like a day-by-day exercise schedule?",
    "Shall we focus on any specific fitness goals?",
    "Would you like to learn about proper exercise techniques?",
];

const SUPPORT_FOLLOW_UPS: [&str; 3] = [
    "Would you like to try a guided breathing exercise?",
    "Shall we explore coping strategies together?",
    "Would you like information about professional support services?",
];

const SUPPORT_SPECIALISTS: [&str; 3] = ["Therapist", "Counselor", "Clinical Psychologist"];

const SENIOR_EXERCISE_PLAN: &str = "\
• Moderate intensity activities: 150-300 minutes weekly
• Balance and fall-prevention exercises: 3 times weekly
• Muscle-strengthening: 2-3 sessions weekly
• Flexibility training: Daily gentle stretching";

const GENERAL_EXERCISE_PLAN: &str = "\
• Cardio: 150 minutes moderate or 75 minutes vigorous activity weekly
• Strength training: 2-3 sessions targeting major muscle groups
• Flexibility work: 10-15 minutes daily
• High-Intensity Interval Training: 1-2 sessions weekly";

const SUPPORT_MESSAGE: &str = "\
I notice you might be experiencing some emotional challenges. Here's a comprehensive support approach:

• Immediate Support:
  - Deep breathing exercise (4-7-8 technique)
  - Grounding techniques
  - Mindfulness meditation

• Short-term Actions:
  - Connect with support system
  - Maintain routine and sleep schedule
  - Engage in physical activity

• Professional Support:
  - Consider speaking with a mental health professional
  - Crisis helpline available 24/7
  - Support groups in your area

Would you like me to provide more specific resources or guide you through a calming exercise?";

const NEXT_ACTIONS_MENU: &str = "\
Would you like to:
1. Explore treatment options in detail
2. Get a personalized management plan
3. Learn about coping strategies
4. Connect with healthcare providers";

/// Which rule produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseRule {
    SymptomMatch(Condition),
    ExerciseIntent,
    NegativeSentiment,
    Fallback,
}

/// Pick the highest-priority rule that applies to `message`.
pub fn select_rule(kb: &KnowledgeBase, message: &str, analysis: &AnalysisResult) -> ResponseRule {
    if let Some((condition, _)) = kb.first_match(message) {
        return ResponseRule::SymptomMatch(condition);
    }
    let lowered = message.to_lowercase();
    if EXERCISE_TRIGGERS.iter().any(|t| lowered.contains(t)) {
        return ResponseRule::ExerciseIntent;
    }
    if analysis.sentiment < 0 {
        return ResponseRule::NegativeSentiment;
    }
    ResponseRule::Fallback
}

/// Produce the assistant turn(s) for one user message: two messages for
/// a symptom match, one otherwise.
pub fn generate(
    kb: &KnowledgeBase,
    config: &AssistantConfig,
    message: &str,
    analysis: &AnalysisResult,
    profile: Option<&UserProfile>,
) -> Vec<ChatMessage> {
    let rule = select_rule(kb, message, analysis);
    tracing::debug!(?rule, sentiment = analysis.sentiment, "Selected response rule");

    match rule {
        ResponseRule::SymptomMatch(condition) => {
            symptom_reply(condition, kb.by_condition(condition), analysis)
        }
        ResponseRule::ExerciseIntent => vec![exercise_reply(config, analysis, profile)],
        ResponseRule::NegativeSentiment => vec![support_reply(analysis)],
        ResponseRule::Fallback => vec![fallback_reply(config, analysis)],
    }
}

fn bulleted(items: &[&str]) -> String {
    items
        .iter()
        .map(|item| format!("• {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn symptom_reply(
    condition: Condition,
    entry: &KnowledgeEntry,
    analysis: &AnalysisResult,
) -> Vec<ChatMessage> {
    let severity = analysis.severity;
    let content = format!(
        "Based on my comprehensive analysis, I've identified symptoms associated with {}.\n\n{}\n\n{}\n\nRecommended actions:\n{}\n\nSuggested specialists to consult:\n{}",
        condition.as_str(),
        entry.guideline_text,
        entry.severity_guidance.for_severity(severity),
        bulleted(entry.recommendations),
        bulleted(entry.specialists),
    );

    let primary = ChatMessage::assistant(content, MessageCategory::Symptoms)
        .with_analysis(analysis.clone())
        .with_features(AiFeatures {
            emotion: Some(Emotion::from_sentiment(analysis.sentiment)),
            risk_level: Some(severity.risk_level()),
            confidence: Some(analysis.confidence),
            suggested_specialists: to_strings(entry.specialists),
            treatment_approach: Some(entry.treatment_approaches.join(", ")),
            follow_up_questions: to_strings(&SYMPTOM_FOLLOW_UPS),
        });

    let first_approach = entry.treatment_approaches.first().copied().unwrap_or_default();
    let detail = format!(
        "Detailed Analysis:\n• Confidence Score: {:.1}%\n• Risk Level: {}\n• Recommended Approach: {}\n\n{}",
        analysis.confidence * 100.0,
        severity.as_str(),
        first_approach,
        NEXT_ACTIONS_MENU,
    );

    vec![primary, ChatMessage::assistant(detail, MessageCategory::Analysis)]
}

fn exercise_reply(
    config: &AssistantConfig,
    analysis: &AnalysisResult,
    profile: Option<&UserProfile>,
) -> ChatMessage {
    let senior = profile.is_some_and(|p| p.age > config.senior_age_threshold);
    let plan = if senior {
        SENIOR_EXERCISE_PLAN
    } else {
        GENERAL_EXERCISE_PLAN
    };
    let content = format!(
        "Based on WHO guidelines and your profile, here's a personalized exercise recommendation:\n\n{plan}\n\nWould you like a detailed exercise plan tailored to your specific needs and goals?"
    );

    ChatMessage::assistant(content, MessageCategory::Exercise)
        .with_analysis(analysis.clone())
        .with_features(AiFeatures {
            confidence: Some(0.95),
            follow_up_questions: to_strings(&EXERCISE_FOLLOW_UPS),
            ..Default::default()
        })
}

fn support_reply(analysis: &AnalysisResult) -> ChatMessage {
    ChatMessage::assistant(SUPPORT_MESSAGE, MessageCategory::Alert)
        .with_analysis(analysis.clone())
        .with_features(AiFeatures {
            emotion: Some(Emotion::Concerned),
            risk_level: Some(RiskLevel::Moderate),
            confidence: Some(0.85),
            suggested_specialists: to_strings(&SUPPORT_SPECIALISTS),
            treatment_approach: None,
            follow_up_questions: to_strings(&SUPPORT_FOLLOW_UPS),
        })
}

/// No rule applied. With no configured fallback this is the blank turn.
fn fallback_reply(config: &AssistantConfig, analysis: &AnalysisResult) -> ChatMessage {
    let content = config.fallback_message.clone().unwrap_or_default();
    if content.is_empty() {
        tracing::warn!("No response rule matched and no fallback configured; sending blank turn");
    }
    ChatMessage::assistant(content, MessageCategory::General)
        .with_analysis(analysis.clone())
        .with_features(AiFeatures {
            emotion: Some(Emotion::from_sentiment(analysis.sentiment)),
            risk_level: Some(analysis.severity.risk_level()),
            confidence: Some(analysis.confidence),
            ..Default::default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::analyzer::analyze;
    use crate::models::enums::{MessageRole, Severity};

    fn run(message: &str, profile: Option<&UserProfile>) -> Vec<ChatMessage> {
        run_with(&AssistantConfig::instant(), message, profile)
    }

    fn run_with(
        config: &AssistantConfig,
        message: &str,
        profile: Option<&UserProfile>,
    ) -> Vec<ChatMessage> {
        let kb = KnowledgeBase::builtin();
        let analysis = analyze(&kb, message);
        generate(&kb, config, message, &analysis, profile)
    }

    fn profile_aged(age: u32) -> UserProfile {
        UserProfile {
            name: "Sam".into(),
            age,
            height: 175.0,
            weight: 70.0,
            gender: None,
        }
    }

    #[test]
    fn symptom_message_yields_two_replies() {
        let replies = run("I have restlessness and rapid heartbeat", None);
        assert_eq!(replies.len(), 2);
        assert!(replies.iter().all(|m| m.role == MessageRole::Assistant));
        assert_eq!(replies[0].category, Some(MessageCategory::Symptoms));
        assert!(replies[0].content.contains("associated with anxiety"));
        assert_eq!(replies[1].category, Some(MessageCategory::Analysis));
    }

    #[test]
    fn symptom_reply_carries_features() {
        let replies = run("I have restlessness and rapid heartbeat", None);
        let features = replies[0].ai_features.as_ref().unwrap();
        assert_eq!(features.emotion, Some(Emotion::Neutral));
        assert_eq!(features.risk_level, Some(RiskLevel::Low));
        assert_eq!(features.suggested_specialists.len(), 3);
        assert_eq!(features.follow_up_questions.len(), 3);
        assert!(features
            .treatment_approach
            .as_deref()
            .unwrap()
            .starts_with("Cognitive Behavioral Therapy, Exposure Therapy"));
    }

    #[test]
    fn analysis_reply_reports_confidence_and_first_approach() {
        let replies = run("I have restlessness and rapid heartbeat", None);
        let detail = &replies[1].content;
        assert!(detail.contains("Confidence Score: 70.0%"));
        assert!(detail.contains("Risk Level: low"));
        assert!(detail.contains("Recommended Approach: Cognitive Behavioral Therapy"));
        assert!(detail.contains("4. Connect with healthcare providers"));
    }

    #[test]
    fn severity_selects_guidance_text() {
        let replies = run("constantly exhausted with fatigue", None);
        assert!(replies[0]
            .content
            .contains("Immediate professional intervention required."));
        assert_eq!(
            replies[0].analysis.as_ref().unwrap().severity,
            Severity::High
        );
    }

    #[test]
    fn exercise_over_sixty_gets_senior_plan() {
        let profile = profile_aged(65);
        let replies = run("I want to start exercise", Some(&profile));
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].category, Some(MessageCategory::Exercise));
        assert!(replies[0].content.contains("fall-prevention"));
    }

    #[test]
    fn exercise_under_sixty_gets_general_plan() {
        let profile = profile_aged(30);
        let replies = run("I want to start exercise", Some(&profile));
        assert!(replies[0].content.contains("High-Intensity Interval Training"));
        assert!(!replies[0].content.contains("fall-prevention"));
    }

    #[test]
    fn exercise_without_profile_gets_general_plan() {
        let replies = run("any WORKOUT tips?", None);
        assert!(replies[0].content.contains("Cardio: 150 minutes"));
    }

    #[test]
    fn exact_threshold_age_is_not_senior() {
        let profile = profile_aged(60);
        let replies = run("exercise ideas", Some(&profile));
        assert!(!replies[0].content.contains("fall-prevention"));
    }

    #[test]
    fn negative_sentiment_triggers_support() {
        let replies = run("I feel terrible and hopeless", None);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].category, Some(MessageCategory::Alert));
        let features = replies[0].ai_features.as_ref().unwrap();
        assert_eq!(features.risk_level, Some(RiskLevel::Moderate));
        assert_eq!(features.emotion, Some(Emotion::Concerned));
        assert_eq!(features.confidence, Some(0.85));
    }

    #[test]
    fn symptom_match_outranks_exercise_and_sentiment() {
        let kb = KnowledgeBase::builtin();
        let msg = "sad and worried about fatigue after my workout";
        let analysis = analyze(&kb, msg);
        assert!(analysis.sentiment < 0);
        assert_eq!(
            select_rule(&kb, msg, &analysis),
            ResponseRule::SymptomMatch(Condition::Depression)
        );
    }

    #[test]
    fn exercise_outranks_negative_sentiment() {
        let kb = KnowledgeBase::builtin();
        let msg = "bad day, need a workout";
        let analysis = analyze(&kb, msg);
        assert_eq!(select_rule(&kb, msg, &analysis), ResponseRule::ExerciseIntent);
    }

    #[test]
    fn fallback_uses_configured_message() {
        let replies = run("hello there", None);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].category, Some(MessageCategory::General));
        assert_eq!(
            replies[0].content,
            AssistantConfig::instant().fallback_message.unwrap()
        );
    }

    #[test]
    fn fallback_disabled_yields_blank_turn() {
        let config = AssistantConfig {
            fallback_message: None,
            ..AssistantConfig::instant()
        };
        let replies = run_with(&config, "hello there", None);
        assert_eq!(replies.len(), 1);
        assert!(replies[0].content.is_empty());
    }
}
