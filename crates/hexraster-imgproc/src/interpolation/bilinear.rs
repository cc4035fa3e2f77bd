use hexraster_image::Image;

/// Sample `image` at the fractional position `(u, v)` with bilinear weights.
///
/// `u` and `v` must be non-negative; positions beyond the last column or row reuse the border
/// pixels.
pub fn bilinear(image: &Image<f32, 1>, u: f32, v: f32) -> f32 {
    let (rows, cols) = (image.rows(), image.cols());

    let x0 = (u.trunc() as usize).min(cols - 1);
    let y0 = (v.trunc() as usize).min(rows - 1);
    let x1 = (x0 + 1).min(cols - 1);
    let y1 = (y0 + 1).min(rows - 1);

    let (fx, fy) = (u.fract(), v.fract());

    let data = image.as_slice();
    let at = |x: usize, y: usize| data[y * cols + x];

    let top = at(x0, y0) * (1.0 - fx) + at(x1, y0) * fx;
    let bottom = at(x0, y1) * (1.0 - fx) + at(x1, y1) * fx;
    top * (1.0 - fy) + bottom * fy
}
