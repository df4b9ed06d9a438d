pub mod linalg;
pub mod special;

pub use linalg::{
    LinalgError, LuDecomposition, SymmetricEigen, lu_factorize, lu_solve, symmetric_eigen,
};
pub use special::{bessel_i0, bessel_i0e, bessel_i1, bessel_i1e};

use faer::Mat;

pub type DenseMatrix = Mat<f64>;

pub const DEFAULT_RTOL: f64 = 1.0e-5;
pub const DEFAULT_ATOL: f64 = 1.0e-8;

/// Element-wise `|a - b| <= atol + rtol * |b|`. Shapes must agree.
pub fn allclose(actual: &DenseMatrix, expected: &DenseMatrix, rtol: f64, atol: f64) -> bool {
    if actual.nrows() != expected.nrows() || actual.ncols() != expected.ncols() {
        return false;
    }

    for row in 0..actual.nrows() {
        for col in 0..actual.ncols() {
            if !is_close(actual[(row, col)], expected[(row, col)], rtol, atol) {
                return false;
            }
        }
    }
    true
}

pub fn is_close(actual: f64, expected: f64, rtol: f64, atol: f64) -> bool {
    (actual - expected).abs() <= atol + rtol * expected.abs()
}

/// Builds a dense matrix from row slices. Ragged input is padded with zeros.
pub fn dense_matrix_from_rows(rows: &[Vec<f64>]) -> DenseMatrix {
    let nrows = rows.len();
    let ncols = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut matrix = DenseMatrix::zeros(nrows, ncols);
    for (row_index, row) in rows.iter().enumerate() {
        for (col_index, value) in row.iter().enumerate() {
            matrix[(row_index, col_index)] = *value;
        }
    }
    matrix
}

pub fn dense_matrix_to_rows(matrix: &DenseMatrix) -> Vec<Vec<f64>> {
    (0..matrix.nrows())
        .map(|row| (0..matrix.ncols()).map(|col| matrix[(row, col)]).collect())
        .collect()
}

/// `matrix * vector`. The vector length must equal the column count.
pub fn mat_vec(matrix: &DenseMatrix, vector: &[f64]) -> Vec<f64> {
    debug_assert_eq!(matrix.ncols(), vector.len());
    (0..matrix.nrows())
        .map(|row| {
            vector
                .iter()
                .enumerate()
                .map(|(col, value)| matrix[(row, col)] * value)
                .sum()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{allclose, dense_matrix_from_rows, dense_matrix_to_rows, is_close, mat_vec};

    #[test]
    fn allclose_uses_relative_and_absolute_tolerance() {
        let expected = dense_matrix_from_rows(&[vec![1.0e3, 0.0], vec![1.0, -2.0]]);
        let actual = dense_matrix_from_rows(&[vec![1.0e3 + 5.0e-3, 5.0e-9], vec![1.0, -2.0]]);
        assert!(allclose(&actual, &expected, 1.0e-5, 1.0e-8));

        let off = dense_matrix_from_rows(&[vec![1.0e3 + 2.0e-2, 0.0], vec![1.0, -2.0]]);
        assert!(!allclose(&off, &expected, 1.0e-5, 1.0e-8));
    }

    #[test]
    fn allclose_rejects_shape_mismatch() {
        let lhs = dense_matrix_from_rows(&[vec![1.0, 2.0]]);
        let rhs = dense_matrix_from_rows(&[vec![1.0], vec![2.0]]);
        assert!(!allclose(&lhs, &rhs, 1.0e-5, 1.0e-8));
    }

    #[test]
    fn rows_round_trip_and_matvec() {
        let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let matrix = dense_matrix_from_rows(&rows);
        assert_eq!(dense_matrix_to_rows(&matrix), rows);
        assert_eq!(mat_vec(&matrix, &[1.0, -1.0]), vec![-1.0, -1.0]);
        assert!(is_close(1.0 + 1.0e-9, 1.0, 0.0, 1.0e-8));
    }
}
