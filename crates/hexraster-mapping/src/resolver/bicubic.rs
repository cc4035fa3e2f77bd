use rayon::prelude::*;

use super::bilinear::triangle;
use super::{Contribution, SquareCells, StencilLocator};
use crate::error::GeometryError;
use crate::grid::SourceGrid;
use crate::triangulation::{FaceId, Triangulation};

/// Four overlapping larger stencils per cell, each contributing a quarter.
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

// squares two ticks wide with lower-left corners at ticks (i-1|i, j-1|j)
fn square(cells: &SquareCells, target: &[f64; 2]) -> Result<Vec<Contribution>, GeometryError> {
    let (nx, ny) = cells.num_ticks();
    let (i, j) = cells.cell_of(target);
    if i == 0 || j == 0 || i + 2 >= nx || j + 2 >= ny {
        return Ok(vec![Contribution::null()]);
    }

    let mut contributions = Vec::with_capacity(16);
    for (si, sj) in [(i - 1, j - 1), (i - 1, j), (i, j - 1), (i, j)] {
        contributions.extend(cells.rectangle(si, sj, 2, target, 0.25)?);
    }
    Ok(contributions)
}

// the big triangle around the triangle holding the target point and the big triangles around
// each of its three neighbours
fn hex(tri: &Triangulation, source: &SourceGrid, target: &[f64; 2]) -> Vec<Contribution> {
    let Some(face) = tri.locate(target) else {
        return vec![Contribution::null()];
    };
    let neighbors = tri.neighbors(face);

    let mut contributions = Vec::with_capacity(12);
    contributions.extend(ring(tri, source, face, target));

    for neighbor in neighbors {
        match (neighbors.iter().all(|n| n.is_some()), neighbor) {
            (true, Some(neighbor)) => contributions.extend(ring(tri, source, neighbor, target)),
            _ => contributions.push(Contribution::null()),
        }
    }
    contributions
}

/// Barycentric quarter weights over the big triangle formed by the neighbours of `face`.
///
/// Null if `face` touches the triangulation boundary or has only virtual corners.
fn ring(
    tri: &Triangulation,
    source: &SourceGrid,
    face: FaceId,
    target: &[f64; 2],
) -> Vec<Contribution> {
    let corners = tri.corners(face);
    if corners.iter().all(|&c| source.is_virtual(c)) {
        return vec![Contribution::null()];
    }

    let mut apexes = [0usize; 3];
    for (apex, neighbor) in apexes.iter_mut().zip(tri.neighbors(face)) {
        let Some(neighbor) = neighbor else {
            return vec![Contribution::null()];
        };
        match tri
            .corners(neighbor)
            .into_iter()
            .find(|c| !corners.contains(c))
        {
            Some(c) => *apex = c,
            None => return vec![Contribution::null()],
        }
    }

    triangle(source, apexes, target, 0.25)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{ring, square};
    use crate::config::{ResamplingConfig, Strategy};
    use crate::grid::{GridBuilder, SourceGrid};
    use crate::lattice::{HexParity, LatticeShape};
    use crate::resolver::{Contribution, SquareCells, StencilLocator};
    use crate::triangulation::Triangulation;

    const HEX: LatticeShape = LatticeShape::Hex {
        parity: HexParity {
            flip_oversampling: false,
            flip_interpolation: false,
        },
    };

    fn config(image_size: usize) -> ResamplingConfig {
        ResamplingConfig {
            strategy: Strategy::Bicubic,
            padding: 0,
            image_size,
            mask: false,
            channels: 1,
        }
    }

    fn hex_positions(cols: usize, rows: usize) -> Vec<[f64; 2]> {
        (0..rows)
            .flat_map(|r| {
                (0..cols).map(move |c| [c as f64 + 0.5 * (r % 2) as f64, r as f64 * 0.866])
            })
            .collect()
    }

    fn weight_sum(cell: &[Contribution]) -> f64 {
        cell.iter().map(|c| c.weight).sum()
    }

    #[test]
    fn square_stencil_needs_a_tick_on_every_side() -> Result<(), Box<dyn std::error::Error>> {
        let positions = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
        let lattice = LatticeShape::Square {
            merge_threshold: None,
        };
        let (source, _) = GridBuilder::from_positions(&positions, lattice, config(7)).build()?;
        let cells = SquareCells::new(&source);
        assert_eq!(cells.num_ticks(), (8, 8));

        // first and last tick intervals
        for target in [[-2.5, 0.5], [3.5, 0.5], [0.5, -2.5], [0.5, 3.5]] {
            assert_eq!(square(&cells, &target)?, vec![Contribution::null()]);
        }

        for target in [[-1.5, 0.5], [0.5, 0.5], [2.5, 2.5]] {
            let cell = square(&cells, &target)?;
            assert_eq!(cell.len(), 16);
            assert!(cell.iter().all(|c| c.source.is_some()));
            assert_relative_eq!(weight_sum(&cell), 1.0, epsilon = 1e-9);
        }
        Ok(())
    }

    #[test]
    fn hex_cells_near_the_hull_lose_rings() -> Result<(), Box<dyn std::error::Error>> {
        let positions = hex_positions(8, 8);
        let (source, target) = GridBuilder::from_positions(&positions, HEX, config(16)).build()?;
        let locator = StencilLocator::new(&source, HEX)?;
        let cells = super::resolve(&locator, &source, target.points())?;

        let (mut partial, mut full) = (0, 0);
        for cell in &cells {
            let sum = weight_sum(cell);
            let quarters = (sum * 4.0).round();
            assert_relative_eq!(sum, quarters / 4.0, epsilon = 1e-9);
            assert!((0.0..=4.0).contains(&quarters));

            let nulls = cell.iter().filter(|c| c.source.is_none()).count();
            if quarters == 4.0 {
                full += 1;
                assert_eq!(nulls, 0);
            } else if quarters > 0.0 {
                partial += 1;
                assert!(nulls > 0);
            }
        }
        assert!(partial > 0);
        assert!(full > 0);
        Ok(())
    }

    #[test]
    fn ring_on_virtual_face_is_null() -> Result<(), Box<dyn std::error::Error>> {
        let positions = hex_positions(8, 8);
        let (source, target) = GridBuilder::from_positions(&positions, HEX, config(16)).build()?;
        let tri = Triangulation::new(source.points())?;

        // an interior face of the padding band
        let (face, point) = target
            .points()
            .iter()
            .filter_map(|p| tri.locate(p).map(|face| (face, *p)))
            .find(|&(face, _)| {
                tri.corners(face).iter().all(|&c| source.is_virtual(c))
                    && tri.neighbors(face).iter().all(|n| n.is_some())
            })
            .ok_or("no virtual face found")?;

        assert_eq!(ring(&tri, &source, face, &point), vec![Contribution::null()]);
        Ok(())
    }

    #[test]
    fn ring_on_boundary_face_is_null() -> Result<(), Box<dyn std::error::Error>> {
        // two triangles of real pixels only
        let source = SourceGrid::from_keys(vec![[0, 0], [2000, 0], [1000, 2000], [3000, 2000]], 4);
        let tri = Triangulation::new(source.points())?;

        let face = tri.locate(&[1.0, 0.5]).ok_or("point outside of the hull")?;
        assert!(tri.corners(face).iter().all(|&c| !source.is_virtual(c)));
        assert!(tri.neighbors(face).iter().any(|n| n.is_none()));

        assert_eq!(
            ring(&tri, &source, face, &[1.0, 0.5]),
            vec![Contribution::null()]
        );
        Ok(())
    }
}
