//! Static wellness knowledge table: three conditions, each with the
//! symptom phrases that trigger it and the guidance shown in reply.

use serde::Serialize;

use crate::models::enums::Severity;

/// A named health topic in the knowledge base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Anxiety,
    Depression,
    Stress,
}

impl Condition {
    /// Iteration order of the knowledge base. Matching and response
    /// selection both follow it.
    pub const ALL: [Condition; 3] = [Self::Anxiety, Self::Depression, Self::Stress];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anxiety => "anxiety",
            Self::Depression => "depression",
            Self::Stress => "stress",
        }
    }
}

/// Advice text per severity tier, phrased mild/moderate/severe.
#[derive(Debug, Clone, Serialize)]
pub struct SeverityGuidance {
    pub mild: &'static str,
    pub moderate: &'static str,
    pub severe: &'static str,
}

impl SeverityGuidance {
    pub fn for_severity(&self, severity: Severity) -> &'static str {
        match severity {
            Severity::Low => self.mild,
            Severity::Medium => self.moderate,
            Severity::High => self.severe,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeEntry {
    /// Matched as case-insensitive substrings of the whole message.
    pub symptoms: &'static [&'static str],
    pub recommendations: &'static [&'static str],
    pub severity_guidance: SeverityGuidance,
    pub guideline_text: &'static str,
    pub specialists: &'static [&'static str],
    pub treatment_approaches: &'static [&'static str],
}

impl KnowledgeEntry {
    /// True when any symptom phrase occurs in `lowered`, which must
    /// already be lowercase.
    pub fn matches(&self, lowered: &str) -> bool {
        self.symptoms.iter().any(|s| lowered.contains(&s.to_lowercase()))
    }
}

/// Read-only lookup over the fixed condition set.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    anxiety: KnowledgeEntry,
    depression: KnowledgeEntry,
    stress: KnowledgeEntry,
}

impl KnowledgeBase {
    /// The built-in table. Built once at startup and shared via `Arc`.
    pub fn builtin() -> Self {
        Self {
            anxiety: ANXIETY,
            depression: DEPRESSION,
            stress: STRESS,
        }
    }

    pub fn by_condition(&self, condition: Condition) -> &KnowledgeEntry {
        match condition {
            Condition::Anxiety => &self.anxiety,
            Condition::Depression => &self.depression,
            Condition::Stress => &self.stress,
        }
    }

    pub fn all_conditions(&self) -> impl Iterator<Item = (Condition, &KnowledgeEntry)> + '_ {
        Condition::ALL.into_iter().map(|c| (c, self.by_condition(c)))
    }

    /// First condition (in table order) with a symptom hit in `message`.
    pub fn first_match(&self, message: &str) -> Option<(Condition, &KnowledgeEntry)> {
        let lowered = message.to_lowercase();
        self.all_conditions().find(|(_, entry)| entry.matches(&lowered))
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::builtin()
    }
}

// ═══════════════════════════════════════════
// Table data
// ═══════════════════════════════════════════

const ANXIETY: KnowledgeEntry = KnowledgeEntry {
    symptoms: &[
        "restlessness",
        "rapid heartbeat",
        "excessive worry",
        "difficulty concentrating",
        "sleep disturbances",
        "muscle tension",
    ],
    recommendations: &[
        "Practice deep breathing exercises - 4-7-8 technique",
        "Progressive muscle relaxation - 15 minutes daily",
        "Regular physical activity - 30 minutes of moderate exercise",
        "Mindfulness meditation - guided sessions",
        "Cognitive Behavioral Therapy techniques",
        "Stress management through time-boxing",
    ],
    severity_guidance: SeverityGuidance {
        mild: "Self-management techniques and lifestyle changes. Monitor symptoms for 2 weeks.",
        moderate: "Consider counseling or therapy. Combination of self-help and professional support recommended.",
        severe: "Urgent consultation with a mental health professional. May require comprehensive treatment plan.",
    },
    guideline_text: "WHO recommends a stepped care approach, starting with self-help and lifestyle changes before moving to professional interventions. Regular monitoring and adjustment of interventions based on response.",
    specialists: &[
        "Psychiatrist",
        "Clinical Psychologist",
        "Cognitive Behavioral Therapist",
    ],
    treatment_approaches: &[
        "Cognitive Behavioral Therapy",
        "Exposure Therapy",
        "Mindfulness-Based Stress Reduction",
        "Medication (if prescribed by healthcare provider)",
    ],
};

const DEPRESSION: KnowledgeEntry = KnowledgeEntry {
    symptoms: &[
        "persistent sadness",
        "loss of interest",
        "sleep changes",
        "fatigue",
        "concentration difficulties",
        "appetite changes",
        "feelings of worthlessness",
    ],
    recommendations: &[
        "Maintain regular sleep schedule - 7-9 hours daily",
        "Exercise regularly - start with 10-minute walks",
        "Stay connected with support system",
        "Structure daily activities and set small goals",
        "Practice gratitude journaling",
        "Engage in enjoyable activities daily",
    ],
    severity_guidance: SeverityGuidance {
        mild: "Self-help strategies and lifestyle modifications. Monitor mood daily.",
        moderate: "Psychological interventions recommended. Consider combination therapy.",
        severe: "Immediate professional intervention required. Combined therapy and medication evaluation.",
    },
    guideline_text: "WHO emphasizes early intervention and combining psychological support with social support systems. Regular assessment of suicide risk and safety planning when necessary.",
    specialists: &[
        "Psychiatrist",
        "Clinical Psychologist",
        "Licensed Therapist",
    ],
    treatment_approaches: &[
        "Psychotherapy",
        "Cognitive Behavioral Therapy",
        "Interpersonal Therapy",
        "Medication Management",
    ],
};

const STRESS: KnowledgeEntry = KnowledgeEntry {
    symptoms: &[
        "tension",
        "irritability",
        "difficulty sleeping",
        "concentration problems",
        "physical symptoms",
        "emotional exhaustion",
    ],
    recommendations: &[
        "Time management techniques - Priority matrix",
        "Regular exercise - 150 minutes per week",
        "Stress-reduction activities - Progressive relaxation",
        "Healthy work-life balance strategies",
        "Social support engagement",
        "Nature exposure - 20 minutes daily",
    ],
    severity_guidance: SeverityGuidance {
        mild: "Lifestyle modifications and self-help techniques. Review stressors weekly.",
        moderate: "Consider stress management programs and counseling support.",
        severe: "Professional intervention recommended. Comprehensive stress management plan needed.",
    },
    guideline_text: "WHO recommends addressing both individual and environmental factors contributing to stress. Focus on sustainable lifestyle changes and building resilience.",
    specialists: &[
        "Stress Management Counselor",
        "Occupational Therapist",
        "Clinical Psychologist",
    ],
    treatment_approaches: &[
        "Stress Management Training",
        "Lifestyle Modification",
        "Relaxation Techniques",
        "Cognitive Restructuring",
    ],
};
