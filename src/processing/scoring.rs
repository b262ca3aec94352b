//! Score combination and required-skill coverage

use crate::config::ScoringConfig;
use crate::error::{Result, ResumeRankerError};
use crate::processing::skills::SkillSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub lexical: f32,
    pub semantic: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            lexical: 0.4,
            semantic: 0.6,
        }
    }
}

impl ScoreWeights {
    /// Weights are taken as given; they need not sum to 1
    pub fn new(lexical: f32, semantic: f32) -> Result<Self> {
        if !lexical.is_finite() || !semantic.is_finite() {
            return Err(ResumeRankerError::Validation(format!(
                "score weights must be finite (lexical {}, semantic {})",
                lexical, semantic
            )));
        }
        Ok(Self { lexical, semantic })
    }

    pub fn from_config(config: &ScoringConfig) -> Result<Self> {
        Self::new(config.lexical_weight, config.semantic_weight)
    }

    pub fn combine(&self, lexical: f32, semantic: f32) -> f32 {
        self.lexical * lexical + self.semantic * semantic
    }
}

/// Percentage (0-100) of `required` found in `candidate`; 0 when nothing is required
pub fn coverage(required: &SkillSet, candidate: &SkillSet) -> f32 {
    if required.is_empty() {
        return 0.0;
    }
    let matched = required.intersection(candidate).count();
    100.0 * matched as f32 / required.len() as f32
}
