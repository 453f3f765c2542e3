use crate::source::SourceId;
use std::path::PathBuf;
use thiserror::Error;

/// Contract violations between the fusion core and the inference step that
/// produced its input. Any of these rejects the whole image.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FusionError {
    #[error("malformed bounding box from {detector} detection #{index}: {bbox:?}")]
    MalformedBox {
        detector: SourceId,
        index: usize,
        bbox: [f32; 4],
    },
    #[error(
        "class index {class_index} from {detector} detection #{index} is outside its label table ({table_len} labels)"
    )]
    LabelIndexOutOfRange {
        detector: SourceId,
        index: usize,
        class_index: usize,
        table_len: usize,
    },
    #[error("confidence {confidence} from {detector} detection #{index} is not within [0, 1]")]
    InvalidConfidence {
        detector: SourceId,
        index: usize,
        confidence: f32,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {reason}", path.display())]
    Read { path: PathBuf, reason: String },
    #[error("failed to parse config {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },
    #[error("IoU threshold must be within (0, 1], got {0}")]
    InvalidThreshold(f32),
    #[error("label table for {0} is empty")]
    EmptyLabelTable(SourceId),
}
