use std::collections::HashSet;

use hexraster_image::ImageSize;

use crate::camera::CameraGeometry;
use crate::config::{ResamplingConfig, Strategy};
use crate::error::GeometryError;
use crate::lattice::{self, HexParity, LatticeShape};

/// The points the weights are spread over: real pixels first, then virtual pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceGrid {
    keys: Vec<[i64; 2]>,
    points: Vec<[f64; 2]>,
    num_pixels: usize,
}

impl SourceGrid {
    pub(crate) fn from_keys(keys: Vec<[i64; 2]>, num_pixels: usize) -> Self {
        let points = keys
            .iter()
            .map(|&[x, y]| [lattice::dequantize(x), lattice::dequantize(y)])
            .collect();
        Self {
            keys,
            points,
            num_pixels,
        }
    }

    /// The source coordinates.
    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    /// The source coordinates in quantization steps.
    pub fn keys(&self) -> &[[i64; 2]] {
        &self.keys
    }

    /// The number of real pixels.
    pub fn num_pixels(&self) -> usize {
        self.num_pixels
    }

    /// The number of virtual pixels.
    pub fn num_virtual(&self) -> usize {
        self.points.len() - self.num_pixels
    }

    /// The total number of source points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the grid holds no point.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether a source index refers to a virtual pixel.
    pub fn is_virtual(&self, index: usize) -> bool {
        index >= self.num_pixels
    }
}

/// The sampling positions of the raster cells, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetGrid {
    points: Vec<[f64; 2]>,
    size: ImageSize,
    factor: usize,
}

impl TargetGrid {
    fn from_axes(xs: &[f64], ys: &[f64], factor: usize) -> Self {
        let points = ys
            .iter()
            .flat_map(|&y| xs.iter().map(move |&x| [x, y]))
            .collect();
        Self {
            points,
            size: ImageSize {
                width: xs.len(),
                height: ys.len(),
            },
            factor,
        }
    }

    /// The sampling positions.
    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    /// The number of samples per axis.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// The number of samples per cell and axis.
    pub fn factor(&self) -> usize {
        self.factor
    }

    /// The size of the internal raster in cells.
    pub fn cell_size(&self) -> ImageSize {
        ImageSize {
            width: self.size.width / self.factor,
            height: self.size.height / self.factor,
        }
    }
}

/// `num` evenly spaced values over `[start, end]`, both ends included.
pub fn linspace(start: f64, end: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (num - 1) as f64;
            let mut values = (0..num)
                .map(|i| start + i as f64 * step)
                .collect::<Vec<_>>();
            values[num - 1] = end;
            values
        }
    }
}

/// Builds the source and target grids of a camera.
pub struct GridBuilder<'a> {
    positions: &'a [[f64; 2]],
    lattice: LatticeShape,
    config: ResamplingConfig,
}

impl<'a> GridBuilder<'a> {
    /// Create a builder for a camera geometry.
    pub fn new(geometry: &'a CameraGeometry, config: ResamplingConfig) -> Self {
        Self::from_positions(geometry.pixel_positions(), geometry.camera().lattice(), config)
    }

    /// Create a builder for raw pixel positions.
    pub fn from_positions(
        positions: &'a [[f64; 2]],
        lattice: LatticeShape,
        config: ResamplingConfig,
    ) -> Self {
        Self {
            positions,
            lattice,
            config,
        }
    }

    /// Build the source and the target grid.
    ///
    /// # Errors
    ///
    /// Fails if there is no pixel or an axis has fewer than two distinct coordinates.
    pub fn build(&self) -> Result<(SourceGrid, TargetGrid), GeometryError> {
        if self.positions.is_empty() {
            return Err(GeometryError::NoPixels);
        }

        let mut xs = self
            .positions
            .iter()
            .map(|p| lattice::quantize(p[0]))
            .collect::<Vec<_>>();
        let mut ys = self
            .positions
            .iter()
            .map(|p| lattice::quantize(p[1]))
            .collect::<Vec<_>>();

        let (source, target) = match self.lattice {
            LatticeShape::Square { merge_threshold } => {
                self.build_square(&mut xs, &mut ys, merge_threshold)?
            }
            LatticeShape::Hex { parity } => self.build_hex(&xs, &ys, parity)?,
        };

        if target.points().is_empty() {
            return Err(GeometryError::EmptyRaster);
        }

        log::debug!(
            "source grid: {} real and {} virtual points, target grid: {}",
            source.num_pixels(),
            source.num_virtual(),
            target.size()
        );

        Ok((source, target))
    }

    fn build_square(
        &self,
        xs: &mut [i64],
        ys: &mut [i64],
        merge_threshold: Option<i64>,
    ) -> Result<(SourceGrid, TargetGrid), GeometryError> {
        let mut x_ticks = lattice::unique_ticks(xs);
        let mut y_ticks = lattice::unique_ticks(ys);

        if let Some(threshold) = merge_threshold {
            lattice::merge_close_ticks(&mut x_ticks, xs, threshold);
            lattice::merge_close_ticks(&mut y_ticks, ys, threshold);
        }
        check_ticks("x", &x_ticks)?;
        check_ticks("y", &y_ticks)?;

        let pad = self.config.internal_pad();
        let x_spacing = lattice::tick_spacing(&x_ticks);
        let y_spacing = lattice::tick_spacing(&y_ticks);
        lattice::pad_ticks(&mut x_ticks, pad, x_spacing);
        lattice::pad_ticks(&mut y_ticks, pad, y_spacing);

        let mut keys = xs
            .iter()
            .zip(ys.iter())
            .map(|(&x, &y)| [x, y])
            .collect::<Vec<_>>();
        let occupied = keys.iter().copied().collect::<HashSet<_>>();
        keys.extend(lattice::vacant_points(&x_ticks, &y_ticks, &occupied));

        let source = SourceGrid::from_keys(keys, self.positions.len());

        let num = self.config.internal_size() * self.config.grid_factor();
        let (x_min, x_max) = axis_range(source.points(), 0);
        let (y_min, y_max) = axis_range(source.points(), 1);
        let target = TargetGrid::from_axes(
            &linspace(x_min, x_max, num),
            &linspace(y_min, y_max, num),
            self.config.grid_factor(),
        );

        Ok((source, target))
    }

    fn build_hex(
        &self,
        xs: &[i64],
        ys: &[i64],
        parity: HexParity,
    ) -> Result<(SourceGrid, TargetGrid), GeometryError> {
        let x_ticks = lattice::unique_ticks(xs);
        let y_ticks = lattice::unique_ticks(ys);
        check_ticks("x", &x_ticks)?;
        check_ticks("y", &y_ticks)?;

        // the first axis is the one with fewer ticks
        let x_first = x_ticks.len() < y_ticks.len();
        let (mut first_ticks, first_pos, mut second_ticks, second_pos) = if x_first {
            (x_ticks, xs, y_ticks, ys)
        } else {
            (y_ticks, ys, x_ticks, xs)
        };

        let first_spacing = lattice::tick_spacing(&first_ticks);
        let second_spacing = lattice::tick_spacing(&second_ticks);

        let oversampling = self.config.strategy == Strategy::Oversampling;
        let pad = self.config.internal_pad();
        let tick_diff = if oversampling {
            2 * first_ticks.len() as i64 - second_ticks.len() as i64
        } else {
            0
        };
        let each_side = tick_diff / 2;

        let second_pad = (each_side + 2 * pad as i64).max(0) as usize;
        lattice::pad_ticks(&mut second_ticks, second_pad, second_spacing);
        lattice::pad_ticks(&mut first_ticks, pad, first_spacing);
        if tick_diff % 2 != 0 {
            lattice::prepend_tick(&mut second_ticks, second_spacing);
        }

        let mut keys = first_pos
            .iter()
            .zip(second_pos.iter())
            .map(|(&a, &b)| [a, b])
            .collect::<Vec<_>>();
        let occupied = keys.iter().copied().collect::<HashSet<_>>();

        // the two sub-lattices keep the offset pattern of the real pixels
        let flip = parity.flipped(oversampling);
        for i in 0..2 {
            let j = if (pad % 2 == 0) != flip { i } else { 1 - i };
            keys.extend(lattice::vacant_points(
                &lattice::every_other(&first_ticks, i),
                &lattice::every_other(&second_ticks, j),
                &occupied,
            ));
        }

        let (grid_first, grid_second, factor) = if oversampling {
            let d1 = lattice::dequantize(first_spacing);
            let d2 = lattice::dequantize(second_spacing);
            let grid_first = first_ticks
                .iter()
                .map(|&t| lattice::dequantize(t))
                .flat_map(|t| [t - d1 / 4.0, t + d1 / 4.0])
                .collect::<Vec<_>>();
            let grid_second = second_ticks
                .iter()
                .map(|&t| lattice::dequantize(t) + d2 / 2.0)
                .collect::<Vec<_>>();
            (grid_first, grid_second, 1)
        } else {
            let minimum = keys.iter().flat_map(|k| k.iter()).copied().min();
            let maximum = keys.iter().flat_map(|k| k.iter()).copied().max();
            let (Some(minimum), Some(maximum)) = (minimum, maximum) else {
                return Err(GeometryError::NoPixels);
            };
            keys.extend([
                [minimum, minimum],
                [minimum, maximum],
                [maximum, minimum],
                [maximum, maximum],
            ]);

            let num = self.config.internal_size() * self.config.grid_factor();
            let axis = linspace(
                lattice::dequantize(minimum),
                lattice::dequantize(maximum),
                num,
            );
            (axis.clone(), axis, self.config.grid_factor())
        };

        // back to (x, y)
        let keys = if x_first {
            keys
        } else {
            keys.into_iter().map(|[a, b]| [b, a]).collect()
        };
        let source = SourceGrid::from_keys(keys, self.positions.len());
        let target = if x_first {
            TargetGrid::from_axes(&grid_first, &grid_second, factor)
        } else {
            TargetGrid::from_axes(&grid_second, &grid_first, factor)
        };

        Ok((source, target))
    }
}

fn check_ticks(axis: &'static str, ticks: &[i64]) -> Result<(), GeometryError> {
    if ticks.len() < 2 {
        return Err(GeometryError::DegenerateTicks {
            axis,
            ticks: ticks.len(),
        });
    }
    Ok(())
}

fn axis_range(points: &[[f64; 2]], axis: usize) -> (f64, f64) {
    points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        (lo.min(p[axis]), hi.max(p[axis]))
    })
}
