pub mod advisor;
pub mod config;
pub mod detection;
pub mod engine;
pub mod error;
pub mod filter;
pub mod geometry;
pub mod render;
pub mod report;
pub mod source;
pub mod suppress;
pub mod taxonomy;

pub use config::FusionConfig;
pub use detection::{Detection, ImageInput, RawDetection};
pub use engine::FusionEngine;
pub use error::{ConfigError, FusionError};
pub use report::ImageReport;
pub use source::SourceId;
pub use taxonomy::{CanonicalClass, ClassMapping};
