//! Least squares solver and the straight-line fit built on it.
//!
//! The forecaster only ever needs a degree-1 polynomial:
//!
//! ```text
//! minimize Σ (y_i - (intercept + slope * x_i))^2
//! ```
//!
//! The design matrix is `[1, x]` (intercept column first), so the solution
//! vector is `[intercept, slope]`. Solved via SVD; nalgebra's `QR::solve`
//! panics on non-square systems.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Coefficients of a fitted line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LineFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Ordinary least squares fit of a degree-1 polynomial.
///
/// Returns `None` when there are fewer than two points, the slices differ in
/// length, or the solve fails (e.g. all `x` identical).
pub fn fit_line(x: &[f64], y: &[f64]) -> Option<LineFit> {
    let n = x.len();
    if n < 2 || y.len() != n {
        return None;
    }

    let mut design = DMatrix::<f64>::zeros(n, 2);
    for (i, &xi) in x.iter().enumerate() {
        design[(i, 0)] = 1.0;
        design[(i, 1)] = xi;
    }
    let target = DVector::from_column_slice(y);

    let beta = solve_least_squares(&design, &target)?;
    Some(LineFit {
        intercept: beta[0],
        slope: beta[1],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn fit_line_two_points_is_exact() {
        let fit = fit_line(&[0.0, 1.0], &[150.0, 200.0]).unwrap();
        assert!((fit.slope - 50.0).abs() < 1e-9);
        assert!((fit.intercept - 150.0).abs() < 1e-9);
        assert!((fit.predict(8.0) - 550.0).abs() < 1e-8);
    }

    #[test]
    fn fit_line_matches_closed_form_on_noisy_series() {
        let x = [0.0, 1.0, 3.0, 4.0, 7.0];
        let y = [10.0, 14.0, 13.0, 21.0, 25.0];

        let n = x.len() as f64;
        let mx = x.iter().sum::<f64>() / n;
        let my = y.iter().sum::<f64>() / n;
        let sxy: f64 = x.iter().zip(&y).map(|(a, b)| (a - mx) * (b - my)).sum();
        let sxx: f64 = x.iter().map(|a| (a - mx) * (a - mx)).sum();
        let slope = sxy / sxx;
        let intercept = my - slope * mx;

        let fit = fit_line(&x, &y).unwrap();
        assert!((fit.slope - slope).abs() < 1e-9);
        assert!((fit.intercept - intercept).abs() < 1e-9);
    }

    #[test]
    fn fit_line_rejects_degenerate_input() {
        assert!(fit_line(&[1.0], &[1.0]).is_none());
        assert!(fit_line(&[0.0, 1.0], &[1.0]).is_none());
    }
}
