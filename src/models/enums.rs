use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(MessageRole {
    User => "user",
    Assistant => "assistant",
});

str_enum!(MessageCategory {
    General => "general",
    Symptoms => "symptoms",
    Exercise => "exercise",
    Alert => "alert",
    Recommendation => "recommendation",
    Analysis => "analysis",
    Treatment => "treatment",
});

// Unified severity tier. The knowledge base phrases its guidance as
// mild/moderate/severe; `guidance_key` is the bridge.
str_enum!(Severity {
    Low => "low",
    Medium => "medium",
    High => "high",
});

impl Severity {
    /// Key into a knowledge entry's severity guidance table.
    pub fn guidance_key(&self) -> &'static str {
        match self {
            Self::Low => "mild",
            Self::Medium => "moderate",
            Self::High => "severe",
        }
    }

    pub fn risk_level(&self) -> RiskLevel {
        match self {
            Self::Low => RiskLevel::Low,
            Self::Medium => RiskLevel::Moderate,
            Self::High => RiskLevel::High,
        }
    }
}

str_enum!(RiskLevel {
    Low => "low",
    Moderate => "moderate",
    High => "high",
});

str_enum!(Emotion {
    Positive => "positive",
    Negative => "negative",
    Neutral => "neutral",
    Concerned => "concerned",
});

impl Emotion {
    /// Emotion label from the sign of a sentiment score.
    pub fn from_sentiment(sentiment: i32) -> Self {
        match sentiment.signum() {
            1 => Self::Positive,
            -1 => Self::Negative,
            _ => Self::Neutral,
        }
    }
}

str_enum!(Theme {
    Light => "light",
    Dark => "dark",
});

impl Theme {
    pub fn toggled(&self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::Light
    }
}

str_enum!(ActivityLevel {
    Low => "low",
    Moderate => "moderate",
    High => "high",
});

str_enum!(AuthProviderKind {
    Password => "password",
    Google => "google",
});
