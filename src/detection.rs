use crate::error::FusionError;
use crate::geometry::BoundingBox;
use crate::source::{LabelTables, SourceId};
use crate::taxonomy::{CanonicalClass, ClassMapping};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One box as reported by a detector, before its label is resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawDetection {
    pub source: SourceId,
    pub class_index: usize,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

/// A raw detection annotated with its resolved and unified labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub confidence: f32,
    pub source: SourceId,
    pub original_label: String,
    pub canonical_class: CanonicalClass,
}

impl RawDetection {
    /// Validate the detection and unify its label.
    ///
    /// `index` is the detection's position in the image input and only used
    /// to point at the offending entry in errors.
    pub fn resolve(
        &self,
        index: usize,
        labels: &LabelTables,
        mapping: &ClassMapping,
    ) -> Result<Detection, FusionError> {
        if !self.bbox.is_well_formed() {
            return Err(FusionError::MalformedBox {
                detector: self.source,
                index,
                bbox: self.bbox.into(),
            });
        }

        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(FusionError::InvalidConfidence {
                detector: self.source,
                index,
                confidence: self.confidence,
            });
        }

        let label = labels
            .resolve(self.source, self.class_index)
            .ok_or_else(|| FusionError::LabelIndexOutOfRange {
                detector: self.source,
                index,
                class_index: self.class_index,
                table_len: labels.table(self.source).len(),
            })?;

        Ok(Detection {
            bbox: self.bbox,
            confidence: self.confidence,
            source: self.source,
            original_label: label.to_string(),
            canonical_class: mapping.unify(label),
        })
    }
}

/// Whole-image classifier output, carried through to the report untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AuxiliaryResult {
    pub label: String,
    pub confidence: f32,
}

/// Everything the inference step produced for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ImageInput {
    pub image: String,
    #[serde(default)]
    pub detections: Vec<RawDetection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auxiliary: Option<AuxiliaryResult>,
}

/// Input file layout: a single image or a batch.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InputDocument {
    Batch(Vec<ImageInput>),
    Single(ImageInput),
}

impl InputDocument {
    pub fn into_images(self) -> Vec<ImageInput> {
        match self {
            InputDocument::Batch(images) => images,
            InputDocument::Single(image) => vec![image],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(source: SourceId, class_index: usize, confidence: f32, bbox: [f32; 4]) -> RawDetection {
        RawDetection {
            source,
            class_index,
            confidence,
            bbox: bbox.into(),
        }
    }

    #[test]
    fn resolve_unifies_label() {
        let detection = raw(SourceId::Chaitanya, 0, 0.8, [0.0, 0.0, 10.0, 10.0])
            .resolve(0, &LabelTables::default(), &ClassMapping::default())
            .unwrap();
        assert_eq!(detection.original_label, "Cigarette");
        assert_eq!(detection.canonical_class, CanonicalClass::Smoking);
        assert_eq!(detection.source, SourceId::Chaitanya);
    }

    #[test]
    fn resolve_rejects_out_of_range_index() {
        let err = raw(SourceId::Chaitanya, 7, 0.8, [0.0, 0.0, 10.0, 10.0])
            .resolve(3, &LabelTables::default(), &ClassMapping::default())
            .unwrap_err();
        assert_eq!(
            err,
            FusionError::LabelIndexOutOfRange {
                detector: SourceId::Chaitanya,
                index: 3,
                class_index: 7,
                table_len: 5,
            }
        );
    }

    #[test]
    fn resolve_rejects_inverted_box() {
        let err = raw(SourceId::Soham, 0, 0.8, [10.0, 0.0, 0.0, 10.0])
            .resolve(0, &LabelTables::default(), &ClassMapping::default())
            .unwrap_err();
        assert!(matches!(err, FusionError::MalformedBox { index: 0, .. }));
    }

    #[test]
    fn resolve_rejects_confidence_out_of_range() {
        for confidence in [1.5, -0.1, f32::NAN] {
            let err = raw(SourceId::Soham, 0, confidence, [0.0, 0.0, 1.0, 1.0])
                .resolve(0, &LabelTables::default(), &ClassMapping::default())
                .unwrap_err();
            assert!(matches!(err, FusionError::InvalidConfidence { .. }));
        }
    }

    #[test]
    fn input_document_accepts_single_or_batch() {
        let single = r#"{"image": "a.jpg", "detections": []}"#;
        let doc: InputDocument = serde_json::from_str(single).unwrap();
        assert_eq!(doc.into_images().len(), 1);

        let batch = r#"[{"image": "a.jpg"}, {"image": "b.jpg"}]"#;
        let doc: InputDocument = serde_json::from_str(batch).unwrap();
        let images = doc.into_images();
        assert_eq!(images.len(), 2);
        assert!(images[1].detections.is_empty());
    }
}
