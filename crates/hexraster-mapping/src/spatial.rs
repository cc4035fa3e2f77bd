use kiddo::immutable::float::kdtree::ImmutableKdTree;
use rayon::prelude::*;

/// Nearest neighbour index over a set of 2D points.
pub struct NearestIndex {
    kdtree: ImmutableKdTree<f64, u32, 2, 32>,
}

impl NearestIndex {
    /// Build the index.
    pub fn new(points: &[[f64; 2]]) -> Self {
        // kdtree over the source points, queried once per target point
        let kdtree: ImmutableKdTree<f64, u32, 2, 32> = ImmutableKdTree::new_from_slice(points);
        Self { kdtree }
    }

    /// The index of the point closest to `query`.
    pub fn nearest(&self, query: &[f64; 2]) -> usize {
        self.kdtree
            .nearest_one::<kiddo::SquaredEuclidean>(query)
            .item as usize
    }

    /// The index of the point closest to every query, computed in parallel.
    pub fn nearest_all(&self, queries: &[[f64; 2]]) -> Vec<usize> {
        queries.par_iter().map(|q| self.nearest(q)).collect()
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn nearest_points() {
        let points = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
        let index = super::NearestIndex::new(&points);
        assert_eq!(index.nearest(&[0.1, 0.2]), 0);
        assert_eq!(index.nearest(&[0.9, 1.3]), 3);
        assert_eq!(
            index.nearest_all(&[[0.8, -0.1], [-0.3, 0.7]]),
            vec![1, 2]
        );
    }
}
