//! Robust fitting of an evenly pitched pocket row.
//!
//! Every pair of similar pockets proposes a row hypothesis: an axis and a
//! pitch snapped to the standard tape grid. The remaining pockets vote for the
//! hypothesis when they sit near an integer multiple of the pitch along the
//! axis. The best-supported hypothesis wins. The search is exhaustive, which
//! keeps it deterministic and is cheap for the few dozen candidates one camera
//! frame yields.

use crate::error::FeatureError;
use crate::params::ToleranceConfig;
use feeder_vision_core::{angle_norm_45, rect_angle_deviation, RotatedRect, Size2, UnitsPerPixel};
use log::{debug, info};
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Minimum number of pockets needed to claim a row.
pub const MIN_ROW_SUPPORT: usize = 3;
/// Maximum deviation of a corroborating pocket from a pitch multiple.
pub const PITCH_TOLERANCE_MM: f64 = 1.0;

const DUPLICATE_EPS_MM: f64 = 1e-6;

/// Row axis through two pocket centers, in image pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineModel {
    pub a: Point2<f64>,
    pub b: Point2<f64>,
}

impl LineModel {
    pub fn length(&self) -> f64 {
        (self.b - self.a).norm()
    }

    /// Perpendicular distance of `p` to the infinite line through `a` and `b`.
    pub fn distance_to(&self, p: Point2<f64>) -> f64 {
        let d = self.b - self.a;
        let n = d.norm();
        if n <= f64::EPSILON {
            return (p - self.a).norm();
        }
        (d.x * (p.y - self.a.y) - d.y * (p.x - self.a.x)).abs() / n
    }
}

/// Best row hypothesis found by [`fit_row`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RowFit {
    /// Axis between the outermost supporting pockets.
    pub line: LineModel,
    /// Indices into the input, ordered along the axis.
    pub support: Vec<usize>,
    /// Hypothesized pocket pitch.
    pub pitch_mm: f64,
    /// The pair that proposed the hypothesis.
    pub seed: (usize, usize),
}

impl RowFit {
    /// Confidence score: the number of supporting pockets.
    pub fn confidence(&self) -> usize {
        self.support.len()
    }
}

struct Sample {
    location: Vector2<f64>,
    angle_deg: f64,
    size: Size2,
}

impl Sample {
    fn new(rect: &RotatedRect, upp: &UnitsPerPixel) -> Self {
        let (sx, sy) = upp.mm();
        Self {
            location: Vector2::new(rect.center.x * sx, -rect.center.y * sy),
            angle_deg: angle_norm_45(rect.angle_deg),
            size: Size2::new((rect.size.width * sx).abs(), (rect.size.height * sy).abs()),
        }
    }

    fn similar(&self, other: &Sample, config: &ToleranceConfig) -> bool {
        rect_angle_deviation(self.angle_deg, other.angle_deg) <= config.angle_tolerance_deg
            && (self.size.width - other.size.width).abs() <= config.size_tolerance_mm
            && (self.size.height - other.size.height).abs() <= config.size_tolerance_mm
    }
}

/// Snap a pocket distance to the 2 mm tape grid; `None` if not a standard pitch.
pub fn standard_pitch(distance_mm: f64) -> Option<f64> {
    let pitch = (distance_mm / 2.0).round() * 2.0;
    let valid = pitch == 2.0 || (pitch >= 4.0 && pitch % 4.0 == 0.0);
    valid.then_some(pitch)
}

struct Hypothesis {
    seed: (usize, usize),
    pitch_mm: f64,
    /// `(index, signed projection along the axis)`.
    members: Vec<(usize, f64)>,
}

fn evaluate_pair(
    samples: &[Sample],
    i: usize,
    j: usize,
    config: &ToleranceConfig,
    min_cos: f64,
) -> Option<Hypothesis> {
    let (si, sj) = (&samples[i], &samples[j]);
    if !si.similar(sj, config) {
        return None;
    }
    let delta = sj.location - si.location;
    let distance = delta.norm();
    if distance < DUPLICATE_EPS_MM {
        return None;
    }
    let pitch = standard_pitch(distance)?;
    let axis = delta / distance;

    let mut members = vec![(i, 0.0), (j, distance)];
    for (k, sk) in samples.iter().enumerate() {
        if k == i || k == j || !si.similar(sk, config) {
            continue;
        }
        let v = sk.location - si.location;
        let dk = v.norm();
        if dk < DUPLICATE_EPS_MM {
            continue;
        }
        let factor = (dk / pitch).round();
        if factor < 1.0 || (pitch * factor - dk).abs() >= PITCH_TOLERANCE_MM {
            continue;
        }
        let projection = axis.dot(&v);
        if (projection / dk).abs() <= min_cos {
            continue;
        }
        members.push((k, projection));
    }
    Some(Hypothesis {
        seed: (i, j),
        pitch_mm: pitch,
        members,
    })
}

/// Find the best-supported evenly pitched row among `pockets`.
///
/// Ties in support go to the lexicographically smallest seed pair. Fails with
/// [`FeatureError::NoSupport`] unless at least [`MIN_ROW_SUPPORT`] pockets agree.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(pockets, units_per_pixel, config), fields(n = pockets.len()))
)]
pub fn fit_row(
    pockets: &[RotatedRect],
    units_per_pixel: &UnitsPerPixel,
    config: &ToleranceConfig,
) -> Result<RowFit, FeatureError> {
    let samples: Vec<Sample> = pockets
        .iter()
        .map(|r| Sample::new(r, units_per_pixel))
        .collect();
    let min_cos = config.angle_tolerance_deg.to_radians().cos();

    let mut best: Option<Hypothesis> = None;
    for i in 0..samples.len() {
        for j in (i + 1)..samples.len() {
            let Some(h) = evaluate_pair(&samples, i, j, config, min_cos) else {
                continue;
            };
            if best
                .as_ref()
                .is_none_or(|b| h.members.len() > b.members.len())
            {
                best = Some(h);
            }
        }
    }

    let best_support = best.as_ref().map_or(0, |b| b.members.len());
    let Some(mut best) = best.filter(|b| b.members.len() >= MIN_ROW_SUPPORT) else {
        debug!("row fit: best support {best_support} among {} pockets", pockets.len());
        return Err(FeatureError::NoSupport {
            best_support,
            required: MIN_ROW_SUPPORT,
        });
    };

    best.members.sort_by(|a, b| a.1.total_cmp(&b.1));
    let support: Vec<usize> = best.members.iter().map(|(k, _)| *k).collect();
    let (first, last) = (support[0], support[support.len() - 1]);
    info!(
        "row fit: {} of {} pockets at pitch {} mm, seed {:?}",
        support.len(),
        pockets.len(),
        best.pitch_mm,
        best.seed
    );
    Ok(RowFit {
        line: LineModel {
            a: pockets[first].center,
            b: pockets[last].center,
        },
        support,
        pitch_mm: best.pitch_mm,
        seed: best.seed,
    })
}
