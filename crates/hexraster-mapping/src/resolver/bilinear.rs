use rayon::prelude::*;

use super::{Contribution, SquareCells, StencilLocator};
use crate::error::GeometryError;
use crate::grid::SourceGrid;
use crate::triangulation::Triangulation;
use crate::weights;

/// Bilinear weights on square lattices, barycentric weights on hexagonal lattices.
pub(crate) fn resolve(
    locator: &StencilLocator,
    source: &SourceGrid,
    targets: &[[f64; 2]],
) -> Result<Vec<Vec<Contribution>>, GeometryError> {
    targets
        .par_iter()
        .map(|target| match locator {
            StencilLocator::Square(cells) => square(cells, target),
            StencilLocator::Hex(tri) => Ok(hex(tri, source, target)),
        })
        .collect()
}

fn square(cells: &SquareCells, target: &[f64; 2]) -> Result<Vec<Contribution>, GeometryError> {
    let (nx, ny) = cells.num_ticks();
    let (i, j) = cells.cell_of(target);
    // the last tick closes the last interval
    cells.rectangle(i.min(nx - 2), j.min(ny - 2), 1, target, 1.0)
}

fn hex(tri: &Triangulation, source: &SourceGrid, target: &[f64; 2]) -> Vec<Contribution> {
    let Some(face) = tri.locate(target) else {
        return vec![Contribution::null()];
    };
    triangle(source, tri.corners(face), target, 1.0)
}

/// Barycentric contributions of the triangle with corners `corners`, scaled by `scale`.
pub(crate) fn triangle(
    source: &SourceGrid,
    corners: [usize; 3],
    target: &[f64; 2],
    scale: f64,
) -> Vec<Contribution> {
    let points = corners.map(|i| source.points()[i]);
    match weights::barycentric(&points, target) {
        Some(w) => corners
            .iter()
            .zip(w)
            .map(|(&index, wi)| Contribution::new(index, wi * scale))
            .collect(),
        None => vec![Contribution::null()],
    }
}
