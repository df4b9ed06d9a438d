use super::DenseMatrix;

const SINGULAR_PIVOT_EPSILON: f64 = 1.0e-14;
const JACOBI_MAX_SWEEPS: usize = 100;
const JACOBI_RELATIVE_TOLERANCE: f64 = 1.0e-14;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinalgError {
    #[error("operation requires a square matrix, got {rows}x{cols}")]
    NonSquareMatrix { rows: usize, cols: usize },
    #[error("operation requires a non-empty matrix")]
    EmptyMatrix,
    #[error("matrix is singular at pivot index {pivot_index}")]
    SingularMatrix { pivot_index: usize },
    #[error("right-hand side length mismatch: expected {expected}, got {actual}")]
    RhsLengthMismatch { expected: usize, actual: usize },
    #[error("Jacobi eigen-solver did not converge after {sweeps} sweeps")]
    NoConvergence { sweeps: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LuDecomposition {
    lu: DenseMatrix,
    pivots: Vec<usize>,
}

impl LuDecomposition {
    pub fn dimension(&self) -> usize {
        self.lu.nrows()
    }

    pub fn solve(&self, rhs: &[f64]) -> Result<Vec<f64>, LinalgError> {
        let dimension = self.dimension();
        if rhs.len() != dimension {
            return Err(LinalgError::RhsLengthMismatch {
                expected: dimension,
                actual: rhs.len(),
            });
        }

        let mut forward = vec![0.0; dimension];
        for row in 0..dimension {
            let mut value = rhs[self.pivots[row]];
            for col in 0..row {
                value -= self.lu[(row, col)] * forward[col];
            }
            forward[row] = value;
        }

        let mut solution = vec![0.0; dimension];
        for row in (0..dimension).rev() {
            let mut value = forward[row];
            for col in (row + 1)..dimension {
                value -= self.lu[(row, col)] * solution[col];
            }
            solution[row] = value / self.lu[(row, row)];
        }

        Ok(solution)
    }
}

/// Doolittle factorization with partial pivoting.
pub fn lu_factorize(matrix: &DenseMatrix) -> Result<LuDecomposition, LinalgError> {
    let dimension = validate_square_shape(matrix)?;
    let scale = max_abs(matrix).max(f64::MIN_POSITIVE);
    let mut lu = matrix.clone();
    let mut pivots: Vec<usize> = (0..dimension).collect();

    for pivot_col in 0..dimension {
        let pivot_row = select_pivot_row(&lu, pivot_col);
        if lu[(pivot_row, pivot_col)].abs() <= SINGULAR_PIVOT_EPSILON * scale {
            return Err(LinalgError::SingularMatrix {
                pivot_index: pivot_col,
            });
        }

        if pivot_row != pivot_col {
            swap_rows(&mut lu, pivot_col, pivot_row);
            pivots.swap(pivot_col, pivot_row);
        }

        let pivot = lu[(pivot_col, pivot_col)];
        for row in (pivot_col + 1)..dimension {
            lu[(row, pivot_col)] /= pivot;
            let multiplier = lu[(row, pivot_col)];
            for col in (pivot_col + 1)..dimension {
                let updated = lu[(row, col)] - multiplier * lu[(pivot_col, col)];
                lu[(row, col)] = updated;
            }
        }
    }

    Ok(LuDecomposition { lu, pivots })
}

pub fn lu_solve(matrix: &DenseMatrix, rhs: &[f64]) -> Result<Vec<f64>, LinalgError> {
    lu_factorize(matrix)?.solve(rhs)
}

/// Eigenpairs of a real symmetric matrix, eigenvalues ascending.
/// Column `k` of `vectors` belongs to `values[k]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetricEigen {
    pub values: Vec<f64>,
    pub vectors: DenseMatrix,
}

/// Cyclic Jacobi rotations. Only the upper triangle is trusted to be
/// symmetric with the lower one.
pub fn symmetric_eigen(matrix: &DenseMatrix) -> Result<SymmetricEigen, LinalgError> {
    let dimension = validate_square_shape(matrix)?;
    let mut a = matrix.clone();
    let mut v = DenseMatrix::zeros(dimension, dimension);
    for index in 0..dimension {
        v[(index, index)] = 1.0;
    }
    let scale = max_abs(matrix);

    let mut converged = dimension == 1 || scale == 0.0;
    let mut sweep = 0;
    while !converged && sweep < JACOBI_MAX_SWEEPS {
        sweep += 1;
        for p in 0..dimension {
            for q in (p + 1)..dimension {
                let apq = a[(p, q)];
                if apq.abs() <= f64::MIN_POSITIVE {
                    continue;
                }
                let theta = (a[(q, q)] - a[(p, p)]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;
                rotate_columns(&mut a, p, q, c, s);
                rotate_rows(&mut a, p, q, c, s);
                rotate_columns(&mut v, p, q, c, s);
            }
        }
        converged = off_diagonal_norm(&a) <= JACOBI_RELATIVE_TOLERANCE * scale;
    }

    if !converged {
        return Err(LinalgError::NoConvergence { sweeps: sweep });
    }

    let mut order: Vec<usize> = (0..dimension).collect();
    order.sort_by(|lhs, rhs| a[(*lhs, *lhs)].total_cmp(&a[(*rhs, *rhs)]));

    let values = order.iter().map(|index| a[(*index, *index)]).collect();
    let mut vectors = DenseMatrix::zeros(dimension, dimension);
    for (target, source) in order.iter().enumerate() {
        for row in 0..dimension {
            vectors[(row, target)] = v[(row, *source)];
        }
    }

    Ok(SymmetricEigen { values, vectors })
}

fn rotate_columns(matrix: &mut DenseMatrix, p: usize, q: usize, c: f64, s: f64) {
    for k in 0..matrix.nrows() {
        let kp = matrix[(k, p)];
        let kq = matrix[(k, q)];
        matrix[(k, p)] = c * kp - s * kq;
        matrix[(k, q)] = s * kp + c * kq;
    }
}

fn rotate_rows(matrix: &mut DenseMatrix, p: usize, q: usize, c: f64, s: f64) {
    for k in 0..matrix.ncols() {
        let pk = matrix[(p, k)];
        let qk = matrix[(q, k)];
        matrix[(p, k)] = c * pk - s * qk;
        matrix[(q, k)] = s * pk + c * qk;
    }
}

fn off_diagonal_norm(matrix: &DenseMatrix) -> f64 {
    let mut sum = 0.0;
    for row in 0..matrix.nrows() {
        for col in 0..matrix.ncols() {
            if row != col {
                sum += matrix[(row, col)] * matrix[(row, col)];
            }
        }
    }
    sum.sqrt()
}

fn validate_square_shape(matrix: &DenseMatrix) -> Result<usize, LinalgError> {
    let rows = matrix.nrows();
    let cols = matrix.ncols();
    if rows == 0 || cols == 0 {
        return Err(LinalgError::EmptyMatrix);
    }
    if rows != cols {
        return Err(LinalgError::NonSquareMatrix { rows, cols });
    }

    Ok(rows)
}

fn select_pivot_row(matrix: &DenseMatrix, pivot_col: usize) -> usize {
    let mut best_row = pivot_col;
    let mut best = matrix[(pivot_col, pivot_col)].abs();
    for row in (pivot_col + 1)..matrix.nrows() {
        let candidate = matrix[(row, pivot_col)].abs();
        if candidate > best {
            best = candidate;
            best_row = row;
        }
    }
    best_row
}

fn swap_rows(matrix: &mut DenseMatrix, lhs: usize, rhs: usize) {
    for col in 0..matrix.ncols() {
        let value = matrix[(lhs, col)];
        matrix[(lhs, col)] = matrix[(rhs, col)];
        matrix[(rhs, col)] = value;
    }
}

fn max_abs(matrix: &DenseMatrix) -> f64 {
    let mut best: f64 = 0.0;
    for row in 0..matrix.nrows() {
        for col in 0..matrix.ncols() {
            best = best.max(matrix[(row, col)].abs());
        }
    }
    best
}
