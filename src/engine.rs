use crate::advisor::advise;
use crate::config::FusionConfig;
use crate::detection::{Detection, ImageInput};
use crate::error::FusionError;
use crate::report::{FusionAudit, ImageReport, ReportAssembler, SourceAudit};
use crate::source::SourceId;
use crate::suppress::fuse;
use crate::taxonomy::CanonicalClass;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Runs the fusion pipeline for one image at a time against a shared,
/// read-only configuration.
pub struct FusionEngine<'a> {
    config: &'a FusionConfig,
    assembler: ReportAssembler,
}

impl<'a> FusionEngine<'a> {
    pub fn new(config: &'a FusionConfig) -> Self {
        Self {
            config,
            assembler: ReportAssembler::default(),
        }
    }

    pub fn show_auxiliary(mut self, show: bool) -> Self {
        self.assembler = ReportAssembler::new(show);
        self
    }

    pub fn config(&self) -> &FusionConfig {
        self.config
    }

    pub fn process(&self, input: &ImageInput) -> Result<ImageReport, FusionError> {
        let mut per_source: BTreeMap<SourceId, Vec<Detection>> = BTreeMap::new();
        for (index, raw) in input.detections.iter().enumerate() {
            let detection = raw
                .resolve(index, &self.config.labels, &self.config.mapping)
                .inspect_err(|e| warn!(image = %input.image, "rejected input: {}", e))?;
            per_source.entry(raw.source).or_default().push(detection);
        }

        let mut audit = FusionAudit::default();
        let mut filtered: BTreeMap<SourceId, Vec<Detection>> = BTreeMap::new();
        for source in SourceId::ALL {
            let detections = per_source.remove(&source).unwrap_or_default();
            let received = detections.len();
            let outcome = self.config.suppress.filter(detections, source);
            audit.sources.insert(
                source,
                SourceAudit {
                    received,
                    filtered: outcome.dropped,
                },
            );
            filtered.insert(source, outcome.kept);
        }

        // pool in source declaration order so equal confidences resolve
        // the same way on every run
        let mut grouped: BTreeMap<CanonicalClass, Vec<Detection>> = BTreeMap::new();
        for source in SourceId::ALL {
            for detection in filtered.get(&source).into_iter().flatten() {
                grouped
                    .entry(detection.canonical_class.clone())
                    .or_default()
                    .push(detection.clone());
            }
        }
        let pooled: BTreeMap<CanonicalClass, usize> = grouped
            .iter()
            .map(|(class, pool)| (class.clone(), pool.len()))
            .collect();
        debug!(image = %input.image, classes = pooled.len(), "pooled detections");

        let fused = fuse(grouped, self.config.fusion.iou_threshold);

        for (class, count) in pooled {
            let kept = fused.get(&class).map_or(0, <[Detection]>::len);
            if count > kept {
                audit.suppressed.insert(class, count - kept);
            }
        }

        let instructions = advise(&fused.present());
        let report = self
            .assembler
            .assemble(input, &fused, &filtered, instructions, audit);

        info!(
            image = %input.image,
            detected = ?report.detected_classes.iter().map(|c| c.as_str()).collect::<Vec<_>>(),
            "processed image"
        );
        Ok(report)
    }

    /// Process images independently. One image failing does not affect the
    /// others.
    pub fn process_batch(&self, inputs: &[ImageInput]) -> Vec<Result<ImageReport, FusionError>> {
        inputs.iter().map(|input| self.process(input)).collect()
    }
}
