//! Axis-aligned box geometry in model input coordinates.
//!
//! Boxes are stored in the center/size form the network emits. Corners are
//! computed on demand as `center ∓ size / 2`; IoU is evaluated in `f64` so
//! that threshold comparisons do not depend on `f32` rounding of the union.

/// Axis-aligned box in center/size form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxGeometry {
    /// Box center along x.
    pub center_x: f32,
    /// Box center along y.
    pub center_y: f32,
    /// Box width.
    pub width: f32,
    /// Box height.
    pub height: f32,
}

impl BoxGeometry {
    /// Creates a box from its center and size.
    pub fn new(center_x: f32, center_y: f32, width: f32, height: f32) -> Self {
        Self {
            center_x,
            center_y,
            width,
            height,
        }
    }

    /// Returns the top-left corner `(x, y)`.
    pub fn top_left(&self) -> (f32, f32) {
        (
            self.center_x - self.width / 2.0,
            self.center_y - self.height / 2.0,
        )
    }

    /// Returns `(x_min, y_min, x_max, y_max)` in `f64`.
    pub fn corners(&self) -> (f64, f64, f64, f64) {
        let cx = f64::from(self.center_x);
        let cy = f64::from(self.center_y);
        let half_w = f64::from(self.width) / 2.0;
        let half_h = f64::from(self.height) / 2.0;
        (cx - half_w, cy - half_h, cx + half_w, cy + half_h)
    }

    /// Returns the box area; negative extents count as zero.
    pub fn area(&self) -> f64 {
        let (x0, y0, x1, y1) = self.corners();
        (x1 - x0).max(0.0) * (y1 - y0).max(0.0)
    }
}

/// Intersection over union of two boxes.
///
/// Returns 0 when the union area is not positive, so degenerate boxes never
/// suppress anything.
pub fn iou(a: &BoxGeometry, b: &BoxGeometry) -> f64 {
    let (ax0, ay0, ax1, ay1) = a.corners();
    let (bx0, by0, bx1, by1) = b.corners();

    let inter_w = (ax1.min(bx1) - ax0.max(bx0)).max(0.0);
    let inter_h = (ay1.min(by1) - ay0.max(by0)).max(0.0);
    let inter = inter_w * inter_h;

    let union = a.area() + b.area() - inter;
    if union > 0.0 {
        inter / union
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::{iou, BoxGeometry};

    #[test]
    fn top_left_subtracts_half_size() {
        let b = BoxGeometry::new(100.0, 100.0, 50.0, 40.0);
        assert_eq!(b.top_left(), (75.0, 80.0));
    }

    #[test]
    fn identical_boxes_have_unit_iou() {
        let b = BoxGeometry::new(10.0, 10.0, 4.0, 6.0);
        assert!((iou(&b, &b) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn disjoint_boxes_have_zero_iou() {
        let a = BoxGeometry::new(0.0, 0.0, 2.0, 2.0);
        let b = BoxGeometry::new(10.0, 0.0, 2.0, 2.0);
        assert_eq!(iou(&a, &b), 0.0);
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = BoxGeometry::new(0.0, 0.0, 2.0, 2.0);
        let b = BoxGeometry::new(2.0, 0.0, 2.0, 2.0);
        assert_eq!(iou(&a, &b), 0.0);
    }

    #[test]
    fn shifted_box_matches_hand_computed_iou() {
        // Intersection 45x50, union 2 * 2500 - 2250.
        let a = BoxGeometry::new(100.0, 100.0, 50.0, 50.0);
        let b = BoxGeometry::new(105.0, 100.0, 50.0, 50.0);
        let expected = 2250.0 / 2750.0;
        assert!((iou(&a, &b) - expected).abs() < 1e-12);
        assert!((iou(&b, &a) - expected).abs() < 1e-12);
    }

    #[test]
    fn zero_area_union_yields_zero() {
        let a = BoxGeometry::new(5.0, 5.0, 0.0, 0.0);
        assert_eq!(iou(&a, &a), 0.0);
    }

    #[test]
    fn negative_sizes_are_treated_as_empty() {
        let a = BoxGeometry::new(5.0, 5.0, -4.0, 4.0);
        let b = BoxGeometry::new(5.0, 5.0, 4.0, 4.0);
        assert_eq!(a.area(), 0.0);
        assert_eq!(iou(&a, &b), 0.0);
    }
}
