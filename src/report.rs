use crate::advisor::SafetyInstructionSet;
use crate::detection::{AuxiliaryResult, Detection, ImageInput};
use crate::geometry::BoundingBox;
use crate::source::SourceId;
use crate::suppress::FusedDetectionSet;
use crate::taxonomy::CanonicalClass;
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::BTreeMap;

/// A detection that survived fusion.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct FusedEntry {
    pub bbox: BoundingBox,
    pub confidence: f32,
    pub source: SourceId,
}

/// A per-source detection as it entered fusion, kept for auditing.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct RawEntry {
    pub confidence: f32,
    pub bbox: BoundingBox,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct SourceAudit {
    /// Detections the source reported for the image.
    pub received: usize,
    /// Detections dropped by the source's suppress rules.
    pub filtered: usize,
}

/// Where detections went, so nothing disappears unexplained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct FusionAudit {
    pub sources: BTreeMap<SourceId, SourceAudit>,
    /// Cross-model duplicates removed, per class. Classes with none are omitted.
    pub suppressed: BTreeMap<CanonicalClass, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct DetailedReport {
    pub sources: BTreeMap<SourceId, BTreeMap<CanonicalClass, Vec<RawEntry>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auxiliary: Option<AuxiliaryResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ImageReport {
    pub image: String,
    pub detected_classes: Vec<CanonicalClass>,
    pub detection_counts: BTreeMap<CanonicalClass, usize>,
    pub detections: BTreeMap<CanonicalClass, Vec<FusedEntry>>,
    pub instructions: SafetyInstructionSet,
    pub detailed_report: DetailedReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auxiliary: Option<AuxiliaryResult>,
    pub audit: FusionAudit,
}

/// Packages one image's fusion output for the presentation layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportAssembler {
    /// Also surface the auxiliary classifier result at the top level, not only
    /// in the detailed report.
    pub show_auxiliary: bool,
}

impl ReportAssembler {
    pub fn new(show_auxiliary: bool) -> Self {
        Self { show_auxiliary }
    }

    pub fn assemble(
        &self,
        input: &ImageInput,
        fused: &FusedDetectionSet,
        per_source: &BTreeMap<SourceId, Vec<Detection>>,
        instructions: SafetyInstructionSet,
        audit: FusionAudit,
    ) -> ImageReport {
        let detections: BTreeMap<CanonicalClass, Vec<FusedEntry>> = fused
            .iter()
            .map(|(class, kept)| {
                let entries = kept
                    .iter()
                    .map(|d| FusedEntry {
                        bbox: d.bbox,
                        confidence: d.confidence,
                        source: d.source,
                    })
                    .collect();
                (class.clone(), entries)
            })
            .collect();

        let sources = SourceId::ALL
            .iter()
            .map(|source| {
                let grouped = per_source
                    .get(source)
                    .map(|detections| group_raw(detections))
                    .unwrap_or_default();
                (*source, grouped)
            })
            .collect();

        ImageReport {
            image: input.image.clone(),
            detected_classes: fused.classes().cloned().collect(),
            detection_counts: fused
                .iter()
                .map(|(class, kept)| (class.clone(), kept.len()))
                .collect(),
            detections,
            instructions,
            detailed_report: DetailedReport {
                sources,
                auxiliary: input.auxiliary.clone(),
            },
            auxiliary: if self.show_auxiliary {
                input.auxiliary.clone()
            } else {
                None
            },
            audit,
        }
    }
}

fn group_raw(detections: &[Detection]) -> BTreeMap<CanonicalClass, Vec<RawEntry>> {
    let mut grouped: BTreeMap<CanonicalClass, Vec<RawEntry>> = BTreeMap::new();
    for d in detections {
        grouped
            .entry(d.canonical_class.clone())
            .or_default()
            .push(RawEntry {
                confidence: d.confidence,
                bbox: d.bbox,
            });
    }
    grouped
}
