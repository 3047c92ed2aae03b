//! Angle helpers in degrees.
//!
//! Rectangles detected by a vision pipeline carry an orientation that is only
//! meaningful modulo 90°: a square rotated by 10° is indistinguishable from the
//! same square rotated by 100°. All comparisons therefore go through
//! [`angle_norm`], which folds an angle into `(-lim, lim]`.

/// Fold `deg` into `(-lim, lim]` by adding or subtracting multiples of `2 * lim`.
///
/// `lim` must be positive. With `lim = 45` this collapses the 90°-periodic
/// symmetry of rectangle orientation; with `lim = 180` it yields a regular
/// signed heading.
pub fn angle_norm(deg: f64, lim: f64) -> f64 {
    debug_assert!(lim > 0.0);
    let period = 2.0 * lim;
    let mut t = (deg + lim).rem_euclid(period) - lim;
    // rem_euclid maps onto [-lim, lim); move the lower bound to the upper one.
    if t <= -lim {
        t += period;
    }
    t
}

/// Fold into `(-45°, 45°]`.
#[inline]
pub fn angle_norm_45(deg: f64) -> f64 {
    angle_norm(deg, 45.0)
}

/// Fold into `(-180°, 180°]`.
#[inline]
pub fn angle_norm_180(deg: f64) -> f64 {
    angle_norm(deg, 180.0)
}

/// Absolute deviation of a rectangle orientation from `reference`, modulo 90°.
///
/// The result is in `[0, 45]`.
#[inline]
pub fn rect_angle_deviation(angle_deg: f64, reference_deg: f64) -> f64 {
    angle_norm_45(angle_deg - reference_deg).abs()
}
