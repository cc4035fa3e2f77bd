use std::collections::BTreeMap;

/// Sparse mapping from camera pixels to raster cells, in compressed sparse row layout.
///
/// Row 0 collects the weight of cells without a real pixel behind them, rows `1..=num_pixels`
/// hold the weights of the real pixels. Columns are the row-major raster cells.
#[derive(Clone, Debug, PartialEq)]
pub struct MappingTable {
    num_rows: usize,
    num_cols: usize,
    row_offsets: Vec<usize>,
    col_indices: Vec<usize>,
    values: Vec<f32>,
}

impl MappingTable {
    /// Build a table from one sparse row per source row, dropping zeros.
    ///
    /// Entries with a column index of at least `num_cols` are ignored.
    pub fn from_rows(rows: &[BTreeMap<usize, f64>], num_cols: usize) -> Self {
        let mut row_offsets = Vec::with_capacity(rows.len() + 1);
        let mut col_indices = Vec::new();
        let mut values = Vec::new();

        row_offsets.push(0);
        for row in rows {
            for (&col, &value) in row.range(..num_cols) {
                let value = value as f32;
                if value != 0.0 {
                    col_indices.push(col);
                    values.push(value);
                }
            }
            row_offsets.push(col_indices.len());
        }

        Self {
            num_rows: rows.len(),
            num_cols,
            row_offsets,
            col_indices,
            values,
        }
    }

    /// The number of rows, `num_pixels + 1`.
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// The number of raster cells.
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// The number of stored non-zero weights.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// The non-zero `(column, weight)` pairs of a row.
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, f32)> + '_ {
        let (start, end) = if row < self.num_rows {
            (self.row_offsets[row], self.row_offsets[row + 1])
        } else {
            (0, 0)
        };
        self.col_indices[start..end]
            .iter()
            .copied()
            .zip(self.values[start..end].iter().copied())
    }

    /// The weight at `(row, col)`, zero if not stored.
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.row(row)
            .find(|(c, _)| *c == col)
            .map(|(_, v)| v)
            .unwrap_or(0.0)
    }

    /// The sum of the weights of every column over the rows `rows`.
    pub fn column_sums(&self, rows: std::ops::Range<usize>) -> Vec<f32> {
        let mut sums = vec![0.0; self.num_cols];
        for row in rows {
            for (col, value) in self.row(row) {
                sums[col] += value;
            }
        }
        sums
    }

    /// The sum of the weights of the real pixel rows.
    pub fn total_weight(&self) -> f64 {
        let start = self.row_offsets.get(1).copied().unwrap_or(0);
        self.values[start..].iter().map(|&v| v as f64).sum()
    }
}
