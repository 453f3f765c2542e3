use schemars::JsonSchema;
use schemars::r#gen::SchemaGenerator;
use schemars::schema::Schema;
use serde::{Deserialize, Serialize};

/// Axis-aligned box in image pixel space (origin top-left, x right, y down).
///
/// Serialized as `[x1, y1, x2, y2]`, the shape detectors emit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// All coordinates finite and corners ordered (`x1 <= x2`, `y1 <= y2`).
    ///
    /// Zero-area boxes are well-formed.
    pub fn is_well_formed(&self) -> bool {
        [self.x1, self.y1, self.x2, self.y2]
            .iter()
            .all(|c| c.is_finite())
            && self.x1 <= self.x2
            && self.y1 <= self.y2
    }

    // Extents and areas are f64 so spans of any finite box cannot overflow.

    pub fn width(&self) -> f64 {
        f64::from(self.x2) - f64::from(self.x1)
    }

    pub fn height(&self) -> f64 {
        f64::from(self.y2) - f64::from(self.y1)
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Area of the overlap between two boxes, zero when they are disjoint.
    pub fn intersection(&self, other: &Self) -> f64 {
        let w = f64::from(self.x2.min(other.x2)) - f64::from(self.x1.max(other.x1));
        let h = f64::from(self.y2.min(other.y2)) - f64::from(self.y1.max(other.y1));
        w.max(0.0) * h.max(0.0)
    }

    /// Intersection over union in `[0, 1]`.
    ///
    /// A non-positive union yields 0, so a pair of zero-area boxes never
    /// counts as overlapping. Callers must only pass well-formed boxes.
    pub fn iou(&self, other: &Self) -> f32 {
        let intersection = self.intersection(other);
        let union = self.area() + other.area() - intersection;
        if union > 0.0 {
            (intersection / union) as f32
        } else {
            0.0
        }
    }
}

impl From<[f32; 4]> for BoundingBox {
    fn from([x1, y1, x2, y2]: [f32; 4]) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

impl JsonSchema for BoundingBox {
    fn schema_name() -> String {
        "BoundingBox".to_owned()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        <[f32; 4]>::json_schema(generator)
    }
}
