use rayon::prelude::*;

use hexraster_image::Image;

/// Apply a function to each pixel for grid sampling in parallel.
///
/// The rows of `dst` are processed in parallel; `f` receives the sampling position taken from
/// `map_x` and `map_y` and the channels of the destination pixel.
pub fn par_iter_rows_resample<const C: usize>(
    dst: &mut Image<f32, C>,
    map_x: &Image<f32, 1>,
    map_y: &Image<f32, 1>,
    f: impl Fn(&f32, &f32, &mut [f32]) + Send + Sync,
) {
    let cols = dst.cols();
    let map_x_slice = map_x.as_slice();
    let map_y_slice = map_y.as_slice();

    dst.as_slice_mut()
        .par_chunks_exact_mut(C * cols)
        .zip(map_x_slice.par_chunks_exact(cols))
        .zip(map_y_slice.par_chunks_exact(cols))
        .for_each(|((dst_chunk, map_x_chunk), map_y_chunk)| {
            dst_chunk
                .chunks_exact_mut(C)
                .zip(map_x_chunk.iter().zip(map_y_chunk.iter()))
                .for_each(|(dst_pixel, (x, y))| {
                    f(x, y, dst_pixel);
                });
        });
}

#[cfg(test)]
mod tests {
    use hexraster_image::{Image, ImageError, ImageSize};

    #[test]
    fn resample_rows() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 2,
            height: 2,
        };
        let map_x = Image::<f32, 1>::new(size, vec![0.0, 1.0, 0.0, 1.0])?;
        let map_y = Image::<f32, 1>::new(size, vec![0.0, 0.0, 1.0, 1.0])?;
        let mut dst = Image::<f32, 2>::from_size_val(size, 0.0)?;

        super::par_iter_rows_resample(&mut dst, &map_x, &map_y, |x, y, pixel| {
            pixel[0] = *x;
            pixel[1] = *y;
        });

        assert_eq!(dst.as_slice(), &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        Ok(())
    }
}
