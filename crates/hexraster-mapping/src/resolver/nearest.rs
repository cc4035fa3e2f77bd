use super::Contribution;

/// One contribution per cell on its nearest source point.
pub(crate) fn resolve(nearest: &[usize], weight: f64) -> Vec<Vec<Contribution>> {
    nearest
        .iter()
        .map(|&source| vec![Contribution::new(source, weight)])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::Contribution;

    #[test]
    fn one_contribution_per_cell() {
        let cells = super::resolve(&[3, 1, 3], 0.25);
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[1], vec![Contribution::new(1, 0.25)]);
    }
}
