use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Basic personal profile collected by the registration form.
///
/// Height is in centimetres and weight in kilograms. The chat assistant
/// reads `age` to branch its exercise guidance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub age: u32,
    pub height: f64,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

impl UserProfile {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("name", "must not be empty"));
        }
        if !(1..=130).contains(&self.age) {
            return Err(ValidationError::new("age", format!("{} is out of range", self.age)));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(ValidationError::new("height", "must be a positive number"));
        }
        if !(self.weight.is_finite() && self.weight > 0.0) {
            return Err(ValidationError::new("weight", "must be a positive number"));
        }
        Ok(())
    }

    /// Body-mass index, or `None` when height is unusable.
    pub fn bmi(&self) -> Option<f64> {
        let metres = self.height / 100.0;
        (metres > 0.0).then(|| self.weight / (metres * metres))
    }
}
