use std::collections::HashSet;

/// Number of quantization steps per coordinate unit (coordinates are rounded to 3 decimals).
pub const QUANTIZATION: f64 = 1000.0;

/// Flags selecting which of the two virtual pixel sub-lattices completes a hexagonal lattice.
///
/// The flags are per camera type constants; they keep the hexagonal offset pattern of the
/// virtual pixels consistent with the one of the real pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HexParity {
    /// Flip the sub-lattice selection under oversampling.
    pub flip_oversampling: bool,
    /// Flip the sub-lattice selection for the other strategies.
    pub flip_interpolation: bool,
}

impl HexParity {
    /// Whether the sub-lattice selection is flipped for the given strategy family.
    pub fn flipped(&self, oversampling: bool) -> bool {
        if oversampling {
            self.flip_oversampling
        } else {
            self.flip_interpolation
        }
    }
}

/// The layout of the pixels of a camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LatticeShape {
    /// Pixels on a (nearly) square lattice.
    Square {
        /// Adjacent ticks closer than this many quantization steps are merged.
        merge_threshold: Option<i64>,
    },
    /// Pixels on a hexagonal offset lattice.
    Hex {
        /// The virtual pixel parity flags.
        parity: HexParity,
    },
}

impl LatticeShape {
    /// Whether the lattice is hexagonal.
    pub fn is_hex(&self) -> bool {
        matches!(self, LatticeShape::Hex { .. })
    }
}

/// Round a coordinate to 3 decimals, expressed in integer quantization steps.
pub fn quantize(value: f64) -> i64 {
    (value * QUANTIZATION).round() as i64
}

/// Convert quantization steps back to a coordinate.
pub fn dequantize(value: i64) -> f64 {
    value as f64 / QUANTIZATION
}

/// Sorted distinct values.
pub fn unique_ticks(values: &[i64]) -> Vec<i64> {
    let mut ticks = values.to_vec();
    ticks.sort_unstable();
    ticks.dedup();
    ticks
}

/// Merge adjacent ticks whose spacing is at most `threshold`.
///
/// The lower tick of each close pair is removed and coordinates equal to it are moved onto the
/// upper tick. Pairs are taken from the ticks before merging and applied in ascending order, so
/// chains of close ticks collapse onto the highest one.
pub fn merge_close_ticks(ticks: &mut Vec<i64>, coords: &mut [i64], threshold: i64) {
    let pairs = ticks
        .windows(2)
        .filter(|w| (w[1] - w[0]).abs() <= threshold)
        .map(|w| (w[0], w[1]))
        .collect::<Vec<_>>();

    for (lower, upper) in pairs {
        ticks.retain(|&t| t != lower);
        coords
            .iter_mut()
            .filter(|c| **c == lower)
            .for_each(|c| *c = upper);
    }
}

/// Spacing between the first two ticks.
pub fn tick_spacing(ticks: &[i64]) -> i64 {
    match ticks {
        [first, second, ..] => (first - second).abs(),
        _ => 0,
    }
}

/// Extend `ticks` by `amount` ticks on both sides, stepping by `spacing`.
pub fn pad_ticks(ticks: &mut Vec<i64>, amount: usize, spacing: i64) {
    let (Some(&first), Some(&last)) = (ticks.first(), ticks.last()) else {
        return;
    };
    let before = (1..=amount as i64).rev().map(|k| first - k * spacing);
    let after = (1..=amount as i64).map(|k| last + k * spacing);

    let mut padded = Vec::with_capacity(ticks.len() + 2 * amount);
    padded.extend(before);
    padded.extend_from_slice(ticks);
    padded.extend(after);
    *ticks = padded;
}

/// Prepend one tick before the first one.
pub fn prepend_tick(ticks: &mut Vec<i64>, spacing: i64) {
    if let Some(&first) = ticks.first() {
        ticks.insert(0, first - spacing);
    }
}

/// Points of the product `first × second` that are not in `occupied`.
///
/// The first axis varies slowest.
pub fn vacant_points(first: &[i64], second: &[i64], occupied: &HashSet<[i64; 2]>) -> Vec<[i64; 2]> {
    first
        .iter()
        .flat_map(|&a| second.iter().map(move |&b| [a, b]))
        .filter(|p| !occupied.contains(p))
        .collect()
}

/// Every other element starting at `start`.
pub fn every_other(ticks: &[i64], start: usize) -> Vec<i64> {
    ticks.iter().skip(start).step_by(2).copied().collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    #[test]
    fn quantize_rounds_to_millis() {
        assert_eq!(super::quantize(0.8660254), 866);
        assert_eq!(super::quantize(-1.0004), -1000);
        assert_eq!(super::dequantize(866), 0.866);
    }

    #[test]
    fn merge_collapses_chains_upwards() {
        let mut ticks = vec![0, 10, 11, 12, 20];
        let mut coords = vec![10, 11, 12, 0, 20];
        super::merge_close_ticks(&mut ticks, &mut coords, 2);
        assert_eq!(ticks, vec![0, 12, 20]);
        assert_eq!(coords, vec![12, 12, 12, 0, 20]);
    }

    #[test]
    fn pad_ticks_both_sides() {
        let mut ticks = vec![0, 5, 10];
        super::pad_ticks(&mut ticks, 2, super::tick_spacing(&[0, 5]));
        assert_eq!(ticks, vec![-10, -5, 0, 5, 10, 15, 20]);

        super::prepend_tick(&mut ticks, 5);
        assert_eq!(ticks[0], -15);
    }

    #[test]
    fn vacant_points_skip_occupied() {
        let occupied = HashSet::from([[0, 0], [1, 1]]);
        let points = super::vacant_points(&[0, 1], &[0, 1], &occupied);
        assert_eq!(points, vec![[0, 1], [1, 0]]);
        assert_eq!(super::every_other(&[0, 1, 2, 3, 4], 1), vec![1, 3]);
    }
}
