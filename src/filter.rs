use crate::detection::Detection;
use crate::source::SourceId;
use crate::taxonomy::CanonicalClass;
use serde::{Deserialize, Serialize};

/// Canonical classes each source must never contribute to fusion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuppressRules {
    pub chaitanya: Vec<CanonicalClass>,
    pub soham: Vec<CanonicalClass>,
}

impl Default for SuppressRules {
    fn default() -> Self {
        // soham's "no violation" class is not a reportable behavior
        Self {
            chaitanya: Vec::new(),
            soham: vec![CanonicalClass::SafeDriving],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub kept: Vec<Detection>,
    pub dropped: usize,
}

impl SuppressRules {
    pub fn suppressed(&self, source: SourceId) -> &[CanonicalClass] {
        match source {
            SourceId::Chaitanya => &self.chaitanya,
            SourceId::Soham => &self.soham,
        }
    }

    /// Drop detections whose class is suppressed for `source`, keeping order.
    pub fn filter(&self, detections: Vec<Detection>, source: SourceId) -> FilterOutcome {
        let excluded = self.suppressed(source);
        let before = detections.len();
        let kept: Vec<Detection> = detections
            .into_iter()
            .filter(|d| !excluded.contains(&d.canonical_class))
            .collect();

        FilterOutcome {
            dropped: before - kept.len(),
            kept,
        }
    }
}
