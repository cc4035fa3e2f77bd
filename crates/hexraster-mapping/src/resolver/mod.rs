//! Weight resolution: which source points contribute to every raster cell, and how much.
//!
//! - **Oversampling / nearest**: the nearest source point takes a fixed weight
//! - **Rebinning**: the nearest source points of a finer sub-grid share the cell
//! - **Bilinear**: rectangular (square lattice) or barycentric (hex lattice) weights
//! - **Bicubic**: four overlapping larger stencils, each weighted by a quarter

mod bicubic;
mod bilinear;
mod nearest;
mod rebinning;

use std::collections::HashMap;

use hexraster_image::ImageSize;

use crate::config::Strategy;
use crate::error::GeometryError;
use crate::grid::{SourceGrid, TargetGrid};
use crate::lattice::{self, LatticeShape};
use crate::spatial::NearestIndex;
use crate::triangulation::Triangulation;

/// The weight of one source point on one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contribution {
    /// The source index, `None` for the null contribution of an invalid stencil.
    pub source: Option<usize>,
    /// The weight.
    pub weight: f64,
}

impl Contribution {
    /// A contribution of a source point.
    pub fn new(source: usize, weight: f64) -> Self {
        Self {
            source: Some(source),
            weight,
        }
    }

    /// The zero contribution of an invalid stencil.
    pub fn null() -> Self {
        Self {
            source: None,
            weight: 0.0,
        }
    }
}

/// The contributions of every cell of the internal raster.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightAssignment {
    size: ImageSize,
    cells: Vec<Vec<Contribution>>,
    nearest: Vec<usize>,
}

impl WeightAssignment {
    /// Create an assignment.
    ///
    /// `cells` and `nearest` hold one entry per cell, row-major.
    pub fn new(size: ImageSize, cells: Vec<Vec<Contribution>>, nearest: Vec<usize>) -> Self {
        Self {
            size,
            cells,
            nearest,
        }
    }

    /// The size of the internal raster.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// The contributions of every cell, row-major.
    pub fn cells(&self) -> &[Vec<Contribution>] {
        &self.cells
    }

    /// The contributions of the cell at column `x` and row `y`.
    pub fn cell(&self, x: usize, y: usize) -> &[Contribution] {
        &self.cells[y * self.size.width + x]
    }

    /// The nearest source index of every cell, row-major.
    pub fn nearest(&self) -> &[usize] {
        &self.nearest
    }

    /// The sum of the weights on the cell at column `x` and row `y`.
    pub fn cell_sum(&self, x: usize, y: usize) -> f64 {
        self.cell(x, y).iter().map(|c| c.weight).sum()
    }
}

/// Tick tables of a square lattice source grid.
pub struct SquareCells {
    x_ticks: Vec<f64>,
    y_ticks: Vec<f64>,
    x_keys: Vec<i64>,
    y_keys: Vec<i64>,
    index: HashMap<[i64; 2], usize>,
}

impl SquareCells {
    /// Build the tick tables of a source grid.
    pub fn new(source: &SourceGrid) -> Self {
        let keys = source.keys();
        let x_keys = lattice::unique_ticks(&keys.iter().map(|k| k[0]).collect::<Vec<_>>());
        let y_keys = lattice::unique_ticks(&keys.iter().map(|k| k[1]).collect::<Vec<_>>());

        // the first occurrence wins, real pixels come first
        let mut index = HashMap::with_capacity(keys.len());
        for (i, key) in keys.iter().enumerate() {
            index.entry(*key).or_insert(i);
        }

        Self {
            x_ticks: x_keys.iter().map(|&t| lattice::dequantize(t)).collect(),
            y_ticks: y_keys.iter().map(|&t| lattice::dequantize(t)).collect(),
            x_keys,
            y_keys,
            index,
        }
    }

    /// The number of ticks along x and y.
    pub fn num_ticks(&self) -> (usize, usize) {
        (self.x_ticks.len(), self.y_ticks.len())
    }

    /// The tick interval holding `point`: one less than the insertion position of each coordinate,
    /// not going below 0.
    pub fn cell_of(&self, point: &[f64; 2]) -> (usize, usize) {
        let locate = |ticks: &[f64], v: f64| {
            let i = ticks.partition_point(|&t| t < v);
            i.saturating_sub(1)
        };
        (locate(&self.x_ticks, point[0]), locate(&self.y_ticks, point[1]))
    }

    /// The source index and position of the lattice point at tick `(i, j)`.
    pub fn point(&self, i: usize, j: usize) -> Result<(usize, [f64; 2]), GeometryError> {
        let (Some(&xk), Some(&yk)) = (self.x_keys.get(i), self.y_keys.get(j)) else {
            return Err(GeometryError::MissingLatticePoint);
        };
        let index = self
            .index
            .get(&[xk, yk])
            .copied()
            .ok_or(GeometryError::MissingLatticePoint)?;
        Ok((index, [self.x_ticks[i], self.y_ticks[j]]))
    }

    /// Bilinear contributions over the rectangle with ticks `(i, j)` and `(i + span, j + span)`.
    pub(crate) fn rectangle(
        &self,
        i: usize,
        j: usize,
        span: usize,
        target: &[f64; 2],
        scale: f64,
    ) -> Result<Vec<Contribution>, GeometryError> {
        let corners = [
            self.point(i, j)?,
            self.point(i, j + span)?,
            self.point(i + span, j)?,
            self.point(i + span, j + span)?,
        ];
        let Some(weights) = crate::weights::bilinear(&corners[0].1, &corners[3].1, target) else {
            return Ok(vec![Contribution::null()]);
        };
        Ok(corners
            .iter()
            .zip(weights)
            .map(|((index, _), w)| Contribution::new(*index, w * scale))
            .collect())
    }
}

/// Locates the stencil of a target point, depending on the lattice.
pub enum StencilLocator {
    /// Tick tables of a square lattice.
    Square(SquareCells),
    /// Delaunay triangulation of a hexagonal lattice.
    Hex(Triangulation),
}

impl StencilLocator {
    /// Build the locator of a source grid.
    pub fn new(source: &SourceGrid, lattice: LatticeShape) -> Result<Self, GeometryError> {
        Ok(match lattice {
            LatticeShape::Square { .. } => StencilLocator::Square(SquareCells::new(source)),
            LatticeShape::Hex { .. } => StencilLocator::Hex(Triangulation::new(source.points())?),
        })
    }
}

/// Computes the weight assignment of a source/target grid pair.
pub struct WeightResolver<'a> {
    source: &'a SourceGrid,
    target: &'a TargetGrid,
    lattice: LatticeShape,
    strategy: Strategy,
}

impl<'a> WeightResolver<'a> {
    /// Create a resolver.
    pub fn new(
        source: &'a SourceGrid,
        target: &'a TargetGrid,
        lattice: LatticeShape,
        strategy: Strategy,
    ) -> Self {
        Self {
            source,
            target,
            lattice,
            strategy,
        }
    }

    /// Resolve the contributions of every cell.
    ///
    /// Invalid stencils degrade to the null contribution of their cell.
    ///
    /// # Errors
    ///
    /// Fails if the triangulation cannot be built or a square lattice point is missing.
    pub fn resolve(&self) -> Result<WeightAssignment, GeometryError> {
        // find the nearest source point of every target point
        let index = NearestIndex::new(self.source.points());
        let nearest = index.nearest_all(self.target.points());
        let size = self.target.cell_size();

        let assignment = match self.strategy {
            Strategy::Oversampling => {
                let weight = if self.lattice.is_hex() { 0.25 } else { 1.0 };
                WeightAssignment::new(size, nearest::resolve(&nearest, weight), nearest)
            }
            Strategy::Nearest => {
                WeightAssignment::new(size, nearest::resolve(&nearest, 1.0), nearest)
            }
            Strategy::Rebinning => {
                let (cells, majority) =
                    rebinning::resolve(&nearest, self.target.size(), self.target.factor());
                WeightAssignment::new(size, cells, majority)
            }
            Strategy::Bilinear => {
                let locator = StencilLocator::new(self.source, self.lattice)?;
                let cells = bilinear::resolve(&locator, self.source, self.target.points())?;
                WeightAssignment::new(size, cells, nearest)
            }
            Strategy::Bicubic => {
                let locator = StencilLocator::new(self.source, self.lattice)?;
                let cells = bicubic::resolve(&locator, self.source, self.target.points())?;
                WeightAssignment::new(size, cells, nearest)
            }
        };

        let invalid = assignment
            .cells()
            .iter()
            .filter(|cell| cell.iter().any(|c| c.source.is_none()))
            .count();
        if invalid > 0 {
            log::warn!(
                "{} of {} cells have at least one stencil degraded to zero",
                invalid,
                assignment.cells().len()
            );
        }

        Ok(assignment)
    }
}
