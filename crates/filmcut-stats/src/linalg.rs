//! Small dense linear algebra for normal equations
//!
//! Regression fits in this crate only ever solve `A x = b` where `A` is a
//! symmetric positive definite information matrix with a handful of columns
//! (one per factor level). A Cholesky factorization is all that is needed.

/// Solves `a * x = b` for a symmetric positive definite `a`.
///
/// `a` is an `n x n` matrix stored row-major. Returns `None` when `a` is not
/// numerically positive definite, which for a design matrix means the
/// predictors are collinear or a level has no observations with weight.
///
/// # Panics
///
/// Panics if `a.len() != b.len() * b.len()`.
///
/// # Examples
///
/// ```
/// use filmcut_stats::linalg::cholesky_solve;
///
/// let a = [4.0, 2.0, 2.0, 3.0];
/// let b = [6.0, 5.0];
/// let x = cholesky_solve(&a, &b).unwrap();
/// assert!((x[0] - 1.0).abs() < 1e-12);
/// assert!((x[1] - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn cholesky_solve(a: &[f64], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    assert_eq!(a.len(), n * n, "matrix must be n x n");

    let max_diag = (0..n).map(|i| a[i * n + i].abs()).fold(0.0, f64::max);
    let threshold = max_diag * 1e-12;

    // Lower triangular factor, row-major
    let mut l = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..=i {
            let dot = (0..j).map(|k| l[i * n + k] * l[j * n + k]).sum::<f64>();
            let value = a[i * n + j] - dot;
            if i == j {
                if !value.is_finite() || value <= threshold {
                    return None;
                }
                l[i * n + i] = value.sqrt();
            } else {
                l[i * n + j] = value / l[j * n + j];
            }
        }
    }

    // Forward substitution: L y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let dot = (0..i).map(|k| l[i * n + k] * y[k]).sum::<f64>();
        y[i] = (b[i] - dot) / l[i * n + i];
    }

    // Back substitution: L^T x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let dot = (i + 1..n).map(|k| l[k * n + i] * x[k]).sum::<f64>();
        x[i] = (y[i] - dot) / l[i * n + i];
    }

    x.iter().all(|v| v.is_finite()).then_some(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let a = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        let x = cholesky_solve(&a, &[3.0, -2.0, 0.5]).unwrap();
        assert_eq!(x, vec![3.0, -2.0, 0.5]);
    }

    #[test]
    fn test_three_by_three() {
        // A = [[25, 15, -5], [15, 18, 0], [-5, 0, 11]], x = [1, 2, 3]
        let a = [25.0, 15.0, -5.0, 15.0, 18.0, 0.0, -5.0, 0.0, 11.0];
        let b = [40.0, 51.0, 28.0];
        let x = cholesky_solve(&a, &b).unwrap();
        for (actual, expected) in x.iter().zip([1.0, 2.0, 3.0]) {
            assert!((actual - expected).abs() < 1e-10, "{actual} != {expected}");
        }
    }

    #[test]
    fn test_singular_matrix() {
        // Two identical columns
        let a = [1.0, 1.0, 1.0, 1.0];
        assert!(cholesky_solve(&a, &[1.0, 1.0]).is_none());
    }

    #[test]
    fn test_empty_system() {
        assert_eq!(cholesky_solve(&[], &[]), Some(vec![]));
    }
}
