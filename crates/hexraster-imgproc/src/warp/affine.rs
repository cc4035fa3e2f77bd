use hexraster_image::{Image, ImageError};

use crate::interpolation::{bilinear, grid::meshgrid_from_fn};
use crate::parallel;

/// Invert a 2x3 affine matrix `[a, b, c, d, e, f]`.
///
/// A singular matrix inverts to zeros, as in OpenCV.
pub fn invert_affine_transform(m: &[f32; 6]) -> [f32; 6] {
    let [a, b, c, d, e, f] = *m;

    let det = a * e - b * d;
    let inv_det = if det != 0.0 { 1.0 / det } else { 0.0 };

    let (ia, ib) = (e * inv_det, -b * inv_det);
    let (id, ie) = (-d * inv_det, a * inv_det);

    [ia, ib, -(ia * c + ib * f), id, ie, -(id * c + ie * f)]
}

/// The 2x3 matrix rotating by `angle` degrees counter-clockwise about `center`, then scaling by
/// `scale`.
///
/// The convention is the one of OpenCV's `getRotationMatrix2D`, with y pointing down.
///
/// # Example
///
/// ```
/// use hexraster_imgproc::warp::get_rotation_matrix2d;
///
/// let m = get_rotation_matrix2d((0.0, 0.0), 90.0, 1.0);
/// assert!((m[1] - 1.0).abs() < 1e-6);
/// ```
pub fn get_rotation_matrix2d(center: (f32, f32), angle: f32, scale: f32) -> [f32; 6] {
    let (sin, cos) = angle.to_radians().sin_cos();
    let (alpha, beta) = (scale * cos, scale * sin);
    let (cx, cy) = center;

    [
        alpha,
        beta,
        (1.0 - alpha) * cx - beta * cy,
        -beta,
        alpha,
        beta * cx + (1.0 - alpha) * cy,
    ]
}

fn transform_point(x: f32, y: f32, m: &[f32; 6]) -> (f32, f32) {
    (
        m[0] * x + m[1] * y + m[2],
        m[3] * x + m[4] * y + m[5],
    )
}

/// Warp a single channel image by the affine matrix `m` with bilinear sampling.
///
/// Every destination pixel is pulled from the inverse-mapped source position. Pixels whose
/// source position falls outside of `src` are left untouched, so a zero-initialized `dst` gets a
/// zero border.
///
/// # Example
///
/// ```
/// use hexraster_image::{Image, ImageSize};
/// use hexraster_imgproc::warp::warp_affine;
///
/// let src = Image::<f32, 1>::from_size_val(ImageSize::square(4), 1.0).unwrap();
/// let mut dst = Image::<f32, 1>::from_size_val(ImageSize::square(4), 0.0).unwrap();
///
/// warp_affine(&src, &mut dst, &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0]).unwrap();
/// assert_eq!(dst.as_slice(), src.as_slice());
/// ```
pub fn warp_affine(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    m: &[f32; 6],
) -> Result<(), ImageError> {
    let m_inv = invert_affine_transform(m);

    let (map_x, map_y) = meshgrid_from_fn(dst.cols(), dst.rows(), |x, y| {
        Ok(transform_point(x as f32, y as f32, &m_inv))
    })?;

    let (cols, rows) = (src.cols() as f32, src.rows() as f32);
    parallel::par_iter_rows_resample(dst, &map_x, &map_y, |&x, &y, pixel| {
        if (0.0..cols).contains(&x) && (0.0..rows).contains(&y) {
            pixel[0] = bilinear(src, x, y);
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use hexraster_image::{Image, ImageError, ImageSize};

    #[test]
    fn zero_rotation_is_identity() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 4,
            height: 5,
        };
        let image = Image::<f32, 1>::new(size, (0..20).map(|x| x as f32).collect())?;
        let mut warped = Image::<f32, 1>::from_size_val(size, 0.0)?;

        let m = super::get_rotation_matrix2d((2.0, 2.5), 0.0, 1.0);
        super::warp_affine(&image, &mut warped, &m)?;

        assert_eq!(warped.as_slice(), image.as_slice());
        Ok(())
    }

    #[test]
    fn translation_leaves_zero_border() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 3,
            height: 2,
        };
        let image = Image::<f32, 1>::new(size, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])?;
        let mut warped = Image::<f32, 1>::from_size_val(size, 0.0)?;

        // one pixel to the right
        super::warp_affine(&image, &mut warped, &[1.0, 0.0, 1.0, 0.0, 1.0, 0.0])?;

        assert_eq!(warped.as_slice(), &[0.0, 1.0, 2.0, 0.0, 4.0, 5.0]);
        Ok(())
    }

    #[test]
    fn rotation_about_a_pixel_keeps_it() -> Result<(), ImageError> {
        let size = ImageSize::square(5);
        let mut data = vec![0.0f32; 25];
        data[2 * 5 + 2] = 1.0;
        let image = Image::<f32, 1>::new(size, data)?;
        let mut warped = Image::<f32, 1>::from_size_val(size, 0.0)?;

        let m = super::get_rotation_matrix2d((2.0, 2.0), 90.0, 1.0);
        super::warp_affine(&image, &mut warped, &m)?;

        assert_relative_eq!(warped.as_slice()[2 * 5 + 2], 1.0, epsilon = 1e-5);
        assert_relative_eq!(warped.as_slice().iter().sum::<f32>(), 1.0, epsilon = 1e-4);
        Ok(())
    }

    #[test]
    fn invert_rotation() {
        let m = super::get_rotation_matrix2d((3.0, 4.0), 30.0, 1.0);
        let m_inv = super::invert_affine_transform(&m);
        let (u, v) = super::transform_point(1.0, 2.0, &m);
        let (x, y) = super::transform_point(u, v, &m_inv);
        assert_relative_eq!(x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(y, 2.0, epsilon = 1e-5);
    }
}
