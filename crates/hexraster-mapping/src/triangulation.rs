use std::collections::HashSet;

use spade::handles::{FixedFaceHandle, InnerTag};
use spade::{DelaunayTriangulation, HasPosition, Point2, PositionInTriangulation, Triangulation as _};

use crate::error::GeometryError;

/// A triangle of the triangulation.
pub type FaceId = FixedFaceHandle<InnerTag>;

/// A source point stored in the triangulation.
#[derive(Clone, Copy, Debug)]
struct SourceVertex {
    position: Point2<f64>,
    index: usize,
}

impl HasPosition for SourceVertex {
    type Scalar = f64;

    fn position(&self) -> Point2<f64> {
        self.position
    }
}

/// Delaunay triangulation of a source grid with point location and face adjacency.
pub struct Triangulation {
    delaunay: DelaunayTriangulation<SourceVertex>,
}

impl Triangulation {
    /// Triangulate the points.
    ///
    /// Coincident points are inserted once, keeping the lowest index.
    ///
    /// # Errors
    ///
    /// Fails if a coordinate cannot be inserted, e.g. it is not finite.
    pub fn new(points: &[[f64; 2]]) -> Result<Self, GeometryError> {
        let mut seen = HashSet::with_capacity(points.len());
        let vertices = points
            .iter()
            .enumerate()
            .filter(|(_, p)| seen.insert([p[0].to_bits(), p[1].to_bits()]))
            .map(|(index, p)| SourceVertex {
                position: Point2::new(p[0], p[1]),
                index,
            })
            .collect::<Vec<_>>();

        let delaunay: DelaunayTriangulation<SourceVertex> = DelaunayTriangulation::bulk_load(vertices)
            .map_err(|e| GeometryError::Triangulation(format!("{e:?}")))?;

        Ok(Self { delaunay })
    }

    /// The number of triangles.
    pub fn num_faces(&self) -> usize {
        self.delaunay.num_inner_faces()
    }

    /// The triangle containing `point`, `None` outside of the convex hull.
    ///
    /// Points on an edge or a vertex resolve to one of the adjacent triangles.
    pub fn locate(&self, point: &[f64; 2]) -> Option<FaceId> {
        match self.delaunay.locate(Point2::new(point[0], point[1])) {
            PositionInTriangulation::OnFace(face) => Some(face),
            PositionInTriangulation::OnEdge(edge) => {
                let edge = self.delaunay.directed_edge(edge);
                edge.face()
                    .as_inner()
                    .or_else(|| edge.rev().face().as_inner())
                    .map(|face| face.fix())
            }
            PositionInTriangulation::OnVertex(vertex) => self
                .delaunay
                .vertex(vertex)
                .out_edges()
                .find_map(|edge| edge.face().as_inner())
                .map(|face| face.fix()),
            PositionInTriangulation::OutsideOfConvexHull(_)
            | PositionInTriangulation::NoTriangulation => None,
        }
    }

    /// The source indices of the corners of a triangle.
    pub fn corners(&self, face: FaceId) -> [usize; 3] {
        self.delaunay
            .face(face)
            .vertices()
            .map(|vertex| vertex.data().index)
    }

    /// The triangles sharing an edge with `face`, `None` across the hull boundary.
    pub fn neighbors(&self, face: FaceId) -> [Option<FaceId>; 3] {
        self.delaunay
            .face(face)
            .adjacent_edges()
            .map(|edge| edge.rev().face().as_inner().map(|f| f.fix()))
    }
}

#[cfg(test)]
mod tests {
    use super::Triangulation;
    use crate::error::GeometryError;

    #[test]
    fn locate_and_adjacency() -> Result<(), GeometryError> {
        let points = [[0.0, 0.0], [2.0, 0.0], [1.0, 2.0], [3.0, 2.0]];
        let tri = Triangulation::new(&points)?;
        assert_eq!(tri.num_faces(), 2);

        let face = tri.locate(&[1.0, 0.5]).ok_or(GeometryError::EmptyRaster)?;
        let mut corners = tri.corners(face);
        corners.sort();
        assert_eq!(corners, [0, 1, 2]);

        let neighbors = tri.neighbors(face);
        assert_eq!(neighbors.iter().filter(|n| n.is_some()).count(), 1);

        assert!(tri.locate(&[-1.0, -1.0]).is_none());
        Ok(())
    }

    #[test]
    fn points_on_vertices_and_edges() -> Result<(), GeometryError> {
        let points = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [0.0, 0.0]];
        let tri = Triangulation::new(&points)?;
        assert!(tri.locate(&[0.0, 0.0]).is_some());
        assert!(tri.locate(&[0.5, 0.0]).is_some());
        for face in [tri.locate(&[0.2, 0.1]), tri.locate(&[0.9, 0.8])]
            .into_iter()
            .flatten()
        {
            assert!(tri.corners(face).iter().all(|&i| i < 4));
        }
        Ok(())
    }
}
