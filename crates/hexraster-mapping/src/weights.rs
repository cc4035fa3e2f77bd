/// Barycentric weights of `target` in the triangle `p`.
///
/// Returns `None` for a degenerate triangle.
///
/// The weights reproduce `target` as the weighted mean of the corners and sum to 1.
pub fn barycentric(p: &[[f64; 2]; 3], target: &[f64; 2]) -> Option<[f64; 3]> {
    let [[x1, y1], [x2, y2], [x3, y3]] = *p;
    let [x, y] = *target;

    let divisor = (y2 - y3) * (x1 - x3) + (x3 - x2) * (y1 - y3);
    if divisor == 0.0 {
        return None;
    }

    let w1 = ((y2 - y3) * (x - x3) + (x3 - x2) * (y - y3)) / divisor;
    let w2 = ((y3 - y1) * (x - x3) + (x1 - x3) * (y - y3)) / divisor;
    Some([w1, w2, 1.0 - w1 - w2])
}

/// Bilinear weights of `target` in the rectangle spanned by `lower` and `upper`.
///
/// The weights are ordered lower-left, upper-left, lower-right, upper-right. Returns `None` for
/// an empty rectangle.
pub fn bilinear(lower: &[f64; 2], upper: &[f64; 2], target: &[f64; 2]) -> Option<[f64; 4]> {
    let [x1, y1] = *lower;
    let [x2, y2] = *upper;
    let [x, y] = *target;

    let area = (x2 - x1) * (y2 - y1);
    if area == 0.0 {
        return None;
    }

    Some([
        (x2 - x) * (y2 - y) / area,
        (x2 - x) * (y - y1) / area,
        (x - x1) * (y2 - y) / area,
        (x - x1) * (y - y1) / area,
    ])
}
