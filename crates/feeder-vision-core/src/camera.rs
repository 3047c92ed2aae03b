use crate::location::Location;
use crate::rect::RotatedRect;
use crate::units::LengthUnit;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Pixel scale of a camera at the working height, possibly anisotropic.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitsPerPixel {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub units: LengthUnit,
}

impl UnitsPerPixel {
    pub fn isotropic(value: f64, units: LengthUnit) -> Self {
        Self {
            x: value,
            y: value,
            units,
        }
    }

    /// Scale in millimeters per pixel, `(x, y)`.
    pub fn mm(&self) -> (f64, f64) {
        (
            self.units.convert(self.x, LengthUnit::Millimeters),
            self.units.convert(self.y, LengthUnit::Millimeters),
        )
    }
}

/// A camera frame: image size, pixel scale and the machine location of the image center.
///
/// Pixel coordinates have Y pointing down; machine coordinates have Y pointing up.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraView {
    pub width: u32,
    pub height: u32,
    pub units_per_pixel: UnitsPerPixel,
    #[serde(default)]
    pub location: Location,
}

impl CameraView {
    pub fn new(
        width: u32,
        height: u32,
        units_per_pixel: UnitsPerPixel,
        location: Location,
    ) -> Self {
        Self {
            width,
            height,
            units_per_pixel,
            location,
        }
    }

    /// Machine-space offset of pixel `px` from the image center, in the pixel-scale units.
    pub fn pixel_offset(&self, px: Point2<f64>) -> Location {
        let dx = px.x - self.width as f64 / 2.0;
        let dy = px.y - self.height as f64 / 2.0;
        Location::new(
            self.units_per_pixel.units,
            dx * self.units_per_pixel.x,
            -dy * self.units_per_pixel.y,
            0.0,
            0.0,
        )
    }

    /// Machine location of pixel `px`, in the units of the camera location.
    pub fn pixel_to_machine(&self, px: Point2<f64>) -> Location {
        self.location.add(&self.pixel_offset(px))
    }

    /// Pixel position of a machine location; inverse of [`CameraView::pixel_to_machine`].
    pub fn machine_to_pixel(&self, location: &Location) -> Point2<f64> {
        let upp = &self.units_per_pixel;
        let d = location
            .convert_to_units(upp.units)
            .subtract(&self.location.convert_to_units(upp.units));
        Point2::new(
            d.x / upp.x + self.width as f64 / 2.0,
            -d.y / upp.y + self.height as f64 / 2.0,
        )
    }

    /// Physical size of a `width_px` × `height_px` rectangle, in millimeters.
    pub fn pixel_size_mm(&self, width_px: f64, height_px: f64) -> (f64, f64) {
        let (sx, sy) = self.units_per_pixel.mm();
        ((width_px * sx).abs(), (height_px * sy).abs())
    }

    /// Whether any corner of `rect` lies within `margin_px` of the image border.
    pub fn is_at_margin(&self, rect: &RotatedRect, margin_px: f64) -> bool {
        let w = self.width as f64;
        let h = self.height as f64;
        rect.corners().iter().any(|p| {
            p.x <= margin_px || p.x >= w - margin_px || p.y <= margin_px || p.y >= h - margin_px
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rect::Size2;
    use approx::assert_abs_diff_eq;

    fn camera() -> CameraView {
        CameraView::new(
            640,
            480,
            UnitsPerPixel::isotropic(0.05, LengthUnit::Millimeters),
            Location::mm(100.0, 50.0),
        )
    }

    #[test]
    fn pixel_to_machine_flips_y() {
        let cam = camera();
        let l = cam.pixel_to_machine(Point2::new(340.0, 200.0));
        assert_abs_diff_eq!(l.x, 101.0, epsilon = 1e-12);
        assert_abs_diff_eq!(l.y, 52.0, epsilon = 1e-12);
        let back = cam.machine_to_pixel(&l);
        assert_abs_diff_eq!(back, Point2::new(340.0, 200.0), epsilon = 1e-9);
    }

    #[test]
    fn margin_detects_corners_near_border() {
        let cam = camera();
        let inside = RotatedRect::new(Point2::new(320.0, 240.0), Size2::new(40.0, 40.0), 0.0);
        assert!(!cam.is_at_margin(&inside, 2.0));
        let left = RotatedRect::new(Point2::new(21.5, 240.0), Size2::new(40.0, 40.0), 0.0);
        assert!(cam.is_at_margin(&left, 2.0));
        let bottom = RotatedRect::new(Point2::new(320.0, 458.5), Size2::new(40.0, 40.0), 0.0);
        assert!(cam.is_at_margin(&bottom, 2.0));
    }
}
