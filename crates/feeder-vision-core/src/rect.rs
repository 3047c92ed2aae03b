use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Width/height pair in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size2 {
    pub width: f64,
    pub height: f64,
}

impl Size2 {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A detected rotated rectangle in image-pixel space.
///
/// Conventions follow the usual image-processing ones: `center` is in pixels
/// with Y pointing down, `angle_deg` is measured from the image X axis in the
/// (left-handed) pixel frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RotatedRect {
    pub center: Point2<f64>,
    pub size: Size2,
    pub angle_deg: f64,
}

impl RotatedRect {
    pub fn new(center: Point2<f64>, size: Size2, angle_deg: f64) -> Self {
        Self {
            center,
            size,
            angle_deg,
        }
    }

    /// The four corner points, in the order bottom-left, top-left, top-right,
    /// bottom-right of the unrotated rectangle.
    pub fn corners(&self) -> [Point2<f64>; 4] {
        let theta = self.angle_deg.to_radians();
        let b = theta.cos() * 0.5;
        let a = theta.sin() * 0.5;
        let (w, h) = (self.size.width, self.size.height);
        let c = self.center;

        let p0 = Point2::new(c.x - a * h - b * w, c.y + b * h - a * w);
        let p1 = Point2::new(c.x + a * h - b * w, c.y - b * h - a * w);
        let p2 = Point2::new(2.0 * c.x - p0.x, 2.0 * c.y - p0.y);
        let p3 = Point2::new(2.0 * c.x - p1.x, 2.0 * c.y - p1.y);
        [p0, p1, p2, p3]
    }
}

/// A circle detection, as produced by hole/blob finding stages.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point2<f64>,
    pub diameter: f64,
}

/// Result of one vision pipeline pass, as handed over by the image pipeline.
///
/// Feature finding only understands [`VisionResult::RotatedRects`]; the other
/// shapes exist so that a misconfigured pipeline can be reported precisely.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "items", rename_all = "snake_case")]
pub enum VisionResult {
    RotatedRects(Vec<RotatedRect>),
    Circles(Vec<Circle>),
    Points(Vec<Point2<f64>>),
}

impl VisionResult {
    /// Short name of the payload type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            VisionResult::RotatedRects(_) => "rotated_rects",
            VisionResult::Circles(_) => "circles",
            VisionResult::Points(_) => "points",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            VisionResult::RotatedRects(v) => v.len(),
            VisionResult::Circles(v) => v.len(),
            VisionResult::Points(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
