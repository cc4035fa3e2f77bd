use std::collections::{BTreeMap, HashSet};

use hexraster_image::{Image, ImageError, ImageSize};
use hexraster_imgproc::warp::{get_rotation_matrix2d, warp_affine};
use rayon::prelude::*;

use crate::config::ResamplingConfig;
use crate::error::{GeometryError, MappingError};
use crate::lattice::LatticeShape;
use crate::resolver::WeightAssignment;
use crate::table::MappingTable;

/// The mapping table under construction: one sparse weight image per row.
///
/// Row 0 is the null row, row `s + 1` belongs to source point `s`.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightCanvas {
    size: ImageSize,
    rows: Vec<BTreeMap<usize, f64>>,
}

impl WeightCanvas {
    /// Scatter an assignment onto a canvas enlarged by `padding` cells on every side.
    pub fn scatter(assignment: &WeightAssignment, num_sources: usize, padding: usize) -> Self {
        let internal = assignment.size();
        let size = internal.padded(padding);
        let mut rows = vec![BTreeMap::new(); num_sources + 1];

        for (cell, contributions) in assignment.cells().iter().enumerate() {
            let (x, y) = (cell % internal.width, cell / internal.width);
            let col = (y + padding) * size.width + x + padding;
            for c in contributions.iter().filter(|c| c.weight != 0.0) {
                let row = c.source.map_or(0, |s| s + 1);
                *rows[row].entry(col).or_insert(0.0) += c.weight;
            }
        }

        Self { size, rows }
    }

    /// The canvas size.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// The sparse rows.
    pub fn rows(&self) -> &[BTreeMap<usize, f64>] {
        &self.rows
    }

    /// The number of rows.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// The sum of the weights of the real pixel rows.
    pub fn real_weight(&self) -> f64 {
        self.rows.iter().skip(1).flat_map(|r| r.values()).sum()
    }

    /// Keep the null row and the real pixel rows; the weight of virtual rows goes to the null row.
    pub fn truncate(&mut self, num_pixels: usize) {
        if self.rows.len() <= num_pixels + 1 {
            return;
        }
        let virtual_rows = self.rows.split_off(num_pixels + 1);
        for (col, weight) in virtual_rows.into_iter().flatten() {
            *self.rows[0].entry(col).or_insert(0.0) += weight;
        }
    }

    /// Zero every row at the cells whose nearest source point is virtual.
    ///
    /// `nearest` holds one source index per cell of the internal raster of size `internal`.
    pub fn mask(&mut self, nearest: &[usize], internal: ImageSize, num_pixels: usize) {
        let padding = (self.size.width - internal.width) / 2;
        let masked = nearest
            .iter()
            .enumerate()
            .filter(|(_, &source)| source >= num_pixels)
            .map(|(cell, _)| {
                let (x, y) = (cell % internal.width, cell / internal.width);
                (y + padding) * self.size.width + x + padding
            })
            .collect::<HashSet<_>>();

        log::debug!("masking {} of {} cells", masked.len(), nearest.len());

        self.rows
            .par_iter_mut()
            .for_each(|row| row.retain(|col, _| !masked.contains(col)));
    }

    /// Rotate every row by `angle_deg` degrees about the canvas centre.
    ///
    /// Weights rotated outside of the canvas are lost. An angle of 0 leaves the canvas untouched.
    pub fn rotate(&mut self, angle_deg: f64) -> Result<(), ImageError> {
        if angle_deg == 0.0 {
            return Ok(());
        }

        let size = self.size;
        let center = (size.width as f32 / 2.0, size.height as f32 / 2.0);
        let m = get_rotation_matrix2d(center, angle_deg as f32, 1.0);

        self.rows.par_iter_mut().try_for_each(|row| {
            if row.is_empty() {
                return Ok(());
            }

            let mut src = Image::<f32, 1>::from_size_val(size, 0.0)?;
            let data = src.as_slice_mut();
            for (&col, &weight) in row.iter() {
                data[col] = weight as f32;
            }

            let mut dst = Image::<f32, 1>::from_size_val(size, 0.0)?;
            warp_affine(&src, &mut dst, &m)?;

            *row = dst
                .as_slice()
                .iter()
                .enumerate()
                .filter(|(_, &w)| w != 0.0)
                .map(|(col, &w)| (col, w as f64))
                .collect();
            Ok(())
        })
    }

    /// Scale the real pixel rows so that their total weight equals `num_pixels`.
    ///
    /// Returns the factor the rows were divided by. A zero total leaves the canvas untouched
    /// and returns 1.
    pub fn normalize(&mut self, num_pixels: usize) -> f64 {
        let factor = self.real_weight() / num_pixels as f64;
        if factor == 0.0 || !factor.is_finite() {
            log::warn!("no weight on real pixels, skipping normalization");
            return 1.0;
        }

        self.rows
            .iter_mut()
            .skip(1)
            .flat_map(|row| row.values_mut())
            .for_each(|w| *w /= factor);

        log::debug!("normalization factor: {factor}");
        factor
    }

    /// Remove `amount` cells on every side.
    ///
    /// # Errors
    ///
    /// Fails if no cell is left.
    pub fn trim(&mut self, amount: usize) -> Result<(), GeometryError> {
        let size = self.size;
        if size.width <= 2 * amount || size.height <= 2 * amount {
            return Err(GeometryError::EmptyRaster);
        }
        let trimmed = ImageSize {
            width: size.width - 2 * amount,
            height: size.height - 2 * amount,
        };

        for row in self.rows.iter_mut() {
            *row = std::mem::take(row)
                .into_iter()
                .filter_map(|(col, w)| {
                    let (x, y) = (col % size.width, col / size.width);
                    let inside = (amount..size.width - amount).contains(&x)
                        && (amount..size.height - amount).contains(&y);
                    inside.then(|| ((y - amount) * trimmed.width + x - amount, w))
                })
                .collect();
        }

        self.size = trimmed;
        Ok(())
    }

    /// Convert the canvas into a sparse table, dropping zeros.
    pub fn into_table(self) -> MappingTable {
        MappingTable::from_rows(&self.rows, self.size.area())
    }
}

/// Turns a weight assignment into the final mapping table of a camera.
pub struct TablePostProcessor {
    config: ResamplingConfig,
    lattice: LatticeShape,
    num_pixels: usize,
    rotation_deg: Option<f64>,
}

impl TablePostProcessor {
    /// Create a post-processor for a camera with `num_pixels` real pixels.
    pub fn new(config: ResamplingConfig, lattice: LatticeShape, num_pixels: usize) -> Self {
        Self {
            config,
            lattice,
            num_pixels,
            rotation_deg: None,
        }
    }

    /// Rotate the table back by the orientation offset of the camera.
    pub fn with_rotation(mut self, angle_deg: f64) -> Self {
        self.rotation_deg = Some(angle_deg);
        self
    }

    /// Run scatter, truncation, masking, rotation, normalization, trimming and sparsification.
    ///
    /// Returns the table and the final raster size.
    pub fn finalize(
        &self,
        assignment: &WeightAssignment,
        num_sources: usize,
    ) -> Result<(MappingTable, ImageSize), MappingError> {
        let strategy = self.config.strategy;

        let mut canvas = WeightCanvas::scatter(assignment, num_sources, self.config.padding);
        canvas.truncate(self.num_pixels);

        if self.config.mask && strategy.interpolates() {
            canvas.mask(assignment.nearest(), assignment.size(), self.num_pixels);
        }

        if let Some(angle) = self.rotation_deg {
            canvas.rotate(angle)?;
        }

        if !strategy.is_exact() {
            canvas.normalize(self.num_pixels);
        }

        canvas.trim(self.config.trim(self.lattice))?;

        let size = canvas.size();
        let table = canvas.into_table();
        log::debug!(
            "mapping table: {} x {} with {} non-zero weights, raster {}",
            table.num_rows(),
            table.num_cols(),
            table.nnz(),
            size
        );

        Ok((table, size))
    }
}
