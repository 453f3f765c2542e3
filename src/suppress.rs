use crate::detection::Detection;
use crate::taxonomy::CanonicalClass;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

pub const DEFAULT_IOU_THRESHOLD: f32 = 0.5;

/// Greedy non-maximum suppression over one class's pooled detections.
///
/// Detections are ranked by confidence, ties keeping their pool order. The
/// best remaining detection is kept and every other detection whose IoU with
/// it reaches `iou_threshold` is discarded, until the pool is exhausted.
pub fn suppress(mut pool: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    // sort_by is stable; -0.0 and 0.0 rank equal, NaN never gets this far
    pool.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });

    let mut kept = Vec::new();
    while !pool.is_empty() {
        let best = pool.remove(0);
        pool.retain(|other| best.bbox.iou(&other.bbox) < iou_threshold);
        kept.push(best);
    }
    kept
}

/// Surviving detections per canonical class. A class is only present when at
/// least one of its detections survived.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FusedDetectionSet {
    classes: BTreeMap<CanonicalClass, Vec<Detection>>,
}

impl FusedDetectionSet {
    pub fn get(&self, class: &CanonicalClass) -> Option<&[Detection]> {
        self.classes.get(class).map(Vec::as_slice)
    }

    pub fn contains(&self, class: &CanonicalClass) -> bool {
        self.classes.contains_key(class)
    }

    /// Classes in declared order.
    pub fn classes(&self) -> impl Iterator<Item = &CanonicalClass> {
        self.classes.keys()
    }

    pub fn present(&self) -> BTreeSet<CanonicalClass> {
        self.classes.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalClass, &[Detection])> {
        self.classes
            .iter()
            .map(|(class, detections)| (class, detections.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn total_detections(&self) -> usize {
        self.classes.values().map(Vec::len).sum()
    }
}

/// Run [`suppress`] independently for every class.
///
/// Detections of different classes never suppress each other.
pub fn fuse(
    grouped: BTreeMap<CanonicalClass, Vec<Detection>>,
    iou_threshold: f32,
) -> FusedDetectionSet {
    let mut classes = BTreeMap::new();

    for (class, pool) in grouped {
        let pooled = pool.len();
        let kept = suppress(pool, iou_threshold);
        debug!(class = %class, pooled, kept = kept.len(), "suppressed class pool");
        if !kept.is_empty() {
            classes.insert(class, kept);
        }
    }

    FusedDetectionSet { classes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundingBox;
    use crate::source::SourceId;

    fn det(source: SourceId, confidence: f32, bbox: [f32; 4]) -> Detection {
        det_class(source, CanonicalClass::PhoneUsage, confidence, bbox)
    }

    fn det_class(
        source: SourceId,
        class: CanonicalClass,
        confidence: f32,
        bbox: [f32; 4],
    ) -> Detection {
        Detection {
            bbox: BoundingBox::from(bbox),
            confidence,
            source,
            original_label: class.as_str().to_string(),
            canonical_class: class,
        }
    }

    #[test]
    fn empty_pool_yields_nothing() {
        assert!(suppress(Vec::new(), DEFAULT_IOU_THRESHOLD).is_empty());
    }

    #[test]
    fn overlapping_cross_model_duplicates_collapse_to_best() {
        let kept = suppress(
            vec![
                det(SourceId::Soham, 0.7, [12.0, 12.0, 52.0, 52.0]),
                det(SourceId::Chaitanya, 0.9, [10.0, 10.0, 50.0, 50.0]),
            ],
            DEFAULT_IOU_THRESHOLD,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].source, SourceId::Chaitanya);
        assert_eq!(kept[0].confidence, 0.9);
        assert_eq!(kept[0].bbox, BoundingBox::new(10.0, 10.0, 50.0, 50.0));
    }

    #[test]
    fn separated_boxes_are_both_kept_best_first() {
        let kept = suppress(
            vec![
                det(SourceId::Chaitanya, 0.6, [0.0, 0.0, 10.0, 10.0]),
                det(SourceId::Soham, 0.8, [100.0, 100.0, 110.0, 110.0]),
            ],
            DEFAULT_IOU_THRESHOLD,
        );
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].confidence, 0.8);
        assert_eq!(kept[1].confidence, 0.6);
    }

    #[test]
    fn threshold_is_inclusive() {
        // inner covers exactly half of outer: IoU == 0.5
        let kept = suppress(
            vec![
                det(SourceId::Chaitanya, 0.9, [0.0, 0.0, 10.0, 10.0]),
                det(SourceId::Soham, 0.8, [0.0, 0.0, 5.0, 10.0]),
            ],
            0.5,
        );
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn equal_confidence_ties_keep_pool_order() {
        let kept = suppress(
            vec![
                det(SourceId::Soham, 0.5, [0.0, 0.0, 10.0, 10.0]),
                det(SourceId::Chaitanya, 0.5, [1.0, 1.0, 10.0, 10.0]),
            ],
            DEFAULT_IOU_THRESHOLD,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].source, SourceId::Soham);
    }

    #[test]
    fn signed_zero_confidences_tie_in_pool_order() {
        let kept = suppress(
            vec![
                det(SourceId::Chaitanya, -0.0, [0.0, 0.0, 10.0, 10.0]),
                det(SourceId::Soham, 0.0, [0.0, 0.0, 10.0, 10.0]),
            ],
            DEFAULT_IOU_THRESHOLD,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].source, SourceId::Chaitanya);
    }

    #[test]
    fn huge_overlapping_boxes_still_collapse() {
        let kept = suppress(
            vec![
                det(SourceId::Chaitanya, 0.9, [0.0, 0.0, 2e19, 2e19]),
                det(SourceId::Soham, 0.8, [0.0, 0.0, 2e19, 1.9e19]),
            ],
            DEFAULT_IOU_THRESHOLD,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].source, SourceId::Chaitanya);
    }

    #[test]
    fn suppression_is_not_transitive_through_discarded_boxes() {
        // b overlaps a and c, but a and c do not overlap: once b is gone,
        // c survives.
        let kept = suppress(
            vec![
                det(SourceId::Chaitanya, 0.9, [0.0, 0.0, 10.0, 10.0]),
                det(SourceId::Soham, 0.8, [3.0, 0.0, 13.0, 10.0]),
                det(SourceId::Soham, 0.7, [6.0, 0.0, 16.0, 10.0]),
            ],
            DEFAULT_IOU_THRESHOLD,
        );
        let confidences: Vec<f32> = kept.iter().map(|d| d.confidence).collect();
        assert_eq!(confidences, vec![0.9, 0.7]);
    }

    #[test]
    fn colocated_degenerate_boxes_are_both_kept() {
        let kept = suppress(
            vec![
                det(SourceId::Chaitanya, 0.9, [5.0, 5.0, 5.0, 5.0]),
                det(SourceId::Soham, 0.8, [5.0, 5.0, 5.0, 5.0]),
            ],
            DEFAULT_IOU_THRESHOLD,
        );
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn suppress_is_idempotent() {
        let pool = vec![
            det(SourceId::Chaitanya, 0.9, [0.0, 0.0, 10.0, 10.0]),
            det(SourceId::Soham, 0.85, [1.0, 1.0, 11.0, 11.0]),
            det(SourceId::Soham, 0.4, [50.0, 50.0, 60.0, 60.0]),
            det(SourceId::Chaitanya, 0.3, [52.0, 52.0, 61.0, 61.0]),
        ];
        let once = suppress(pool, DEFAULT_IOU_THRESHOLD);
        let twice = suppress(once.clone(), DEFAULT_IOU_THRESHOLD);
        assert_eq!(once, twice);
    }

    #[test]
    fn fuse_keeps_classes_independent() {
        let bbox = [10.0, 10.0, 50.0, 50.0];
        let mut grouped = BTreeMap::new();
        grouped.insert(
            CanonicalClass::Smoking,
            vec![det_class(SourceId::Chaitanya, CanonicalClass::Smoking, 0.9, bbox)],
        );
        grouped.insert(
            CanonicalClass::Drinking,
            vec![det_class(SourceId::Soham, CanonicalClass::Drinking, 0.6, bbox)],
        );
        grouped.insert(CanonicalClass::Eating, Vec::new());

        let fused = fuse(grouped, DEFAULT_IOU_THRESHOLD);
        assert_eq!(fused.len(), 2);
        assert!(fused.contains(&CanonicalClass::Smoking));
        assert!(fused.contains(&CanonicalClass::Drinking));
        assert!(!fused.contains(&CanonicalClass::Eating));
        assert_eq!(fused.total_detections(), 2);

        let order: Vec<_> = fused.classes().cloned().collect();
        assert_eq!(order, vec![CanonicalClass::Drinking, CanonicalClass::Smoking]);
    }
}
