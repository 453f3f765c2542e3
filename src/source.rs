use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Detector that produced a raw detection.
///
/// Declaration order is also the order sources are pooled in before
/// suppression, so it decides ties between equal-confidence boxes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    Chaitanya,
    Soham,
}

impl SourceId {
    pub const ALL: [SourceId; 2] = [SourceId::Chaitanya, SourceId::Soham];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Chaitanya => "chaitanya",
            SourceId::Soham => "soham",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-source `class_index -> label` tables, in the order each detector was
/// trained with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelTables {
    pub chaitanya: Vec<String>,
    pub soham: Vec<String>,
}

impl Default for LabelTables {
    fn default() -> Self {
        Self {
            chaitanya: to_owned(&["Cigarette", "Drinking", "Eating", "Phone", "Seatbelt"]),
            soham: to_owned(&[
                "Distracted",
                "Drinking",
                "Drowsy",
                "Eating",
                "PhoneUse",
                "SafeDriving",
                "Seatbelt",
                "Smoking",
            ]),
        }
    }
}

fn to_owned(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|s| s.to_string()).collect()
}

impl LabelTables {
    pub fn table(&self, source: SourceId) -> &[String] {
        match source {
            SourceId::Chaitanya => &self.chaitanya,
            SourceId::Soham => &self.soham,
        }
    }

    /// Label for `class_index`, or `None` when the detector reported an index
    /// its table does not cover.
    pub fn resolve(&self, source: SourceId, class_index: usize) -> Option<&str> {
        self.table(source).get(class_index).map(String::as_str)
    }
}
