use std::collections::BTreeMap;

use hexraster_image::ImageSize;
use rayon::prelude::*;

use super::Contribution;

/// Area weights from the nearest source points of a sub-sampled grid.
///
/// Every cell covers `factor × factor` samples of `nearest`; each distinct source point gets the
/// fraction of samples it is nearest to. Also returns the source point nearest to most samples
/// of every cell, the lowest index winning ties.
pub(crate) fn resolve(
    nearest: &[usize],
    fine_size: ImageSize,
    factor: usize,
) -> (Vec<Vec<Contribution>>, Vec<usize>) {
    let (cols, rows) = (fine_size.width / factor, fine_size.height / factor);
    let samples = (factor * factor) as f64;

    (0..cols * rows)
        .into_par_iter()
        .map(|cell| {
            let (cx, cy) = (cell % cols, cell / cols);

            let mut counter = BTreeMap::<usize, usize>::new();
            for y in cy * factor..(cy + 1) * factor {
                let row = &nearest[y * fine_size.width..(y + 1) * fine_size.width];
                for &source in &row[cx * factor..(cx + 1) * factor] {
                    *counter.entry(source).or_insert(0) += 1;
                }
            }

            let majority = counter
                .iter()
                .fold((0, 0), |best, (&source, &count)| {
                    if count > best.1 {
                        (source, count)
                    } else {
                        best
                    }
                })
                .0;

            let contributions = counter
                .into_iter()
                .map(|(source, count)| Contribution::new(source, count as f64 / samples))
                .collect();

            (contributions, majority)
        })
        .unzip()
}
