//! Negative binomial (NB2) count regression
//!
//! Models a non-negative integer response `y` with a log link:
//!
//! ```text
//! mu_i  = exp(x_i . beta)
//! Var_i = mu_i + alpha * mu_i^2
//! ```
//!
//! `alpha` is the dispersion; as it approaches zero the model reduces to
//! Poisson regression.
//!
//! # Fitting
//!
//! Parameters are estimated by maximum likelihood, alternating two steps per
//! iteration:
//!
//! 1. Profile `alpha` for the current means with a golden-section search over
//!    `ln(alpha)` in `[-20, 10]`
//! 2. One iteratively reweighted least squares (IRLS) update of `beta` with
//!    weights `mu / (1 + alpha * mu)`, halving the step while the
//!    log-likelihood decreases
//!
//! The fit converges when both the relative log-likelihood change and the
//! largest coefficient change fall below the tolerance. A fit that hits the
//! iteration cap is an error, never a silently returned estimate.
//!
//! # Examples
//!
//! ```
//! use filmcut_stats::{
//!     design::{DesignMatrix, Factor},
//!     negative_binomial::{FitOptions, NegativeBinomialFit},
//! };
//!
//! let group = Factor::new("group", ["a", "a", "a", "a", "b", "b", "b", "b"]);
//! let design = DesignMatrix::with_intercept(8, &[group]).unwrap();
//! let counts = [1, 2, 0, 3, 6, 9, 4, 7];
//!
//! let fit = NegativeBinomialFit::fit(&design, &counts, &FitOptions::default()).unwrap();
//! // With one factor the fitted means equal the group means.
//! assert!((fit.fitted_values()[0] - 1.5).abs() < 1e-4);
//! assert!((fit.fitted_values()[4] - 6.5).abs() < 1e-4);
//! ```

use statrs::function::factorial::ln_factorial;

use crate::{design::DesignMatrix, linalg::cholesky_solve};

const LN_ALPHA_MIN: f64 = -20.0;
const LN_ALPHA_MAX: f64 = 10.0;
const ETA_LIMIT: f64 = 30.0;
const MAX_STEP_HALVINGS: usize = 30;

/// Options controlling the maximum likelihood iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    /// Maximum number of outer iterations before giving up.
    pub max_iterations: usize,
    /// Relative tolerance for log-likelihood and coefficient changes.
    pub tolerance: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-8,
        }
    }
}

/// Reasons a negative binomial fit can fail.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum FitError {
    #[display("no observations to fit")]
    Empty,
    #[display("response has {actual} values but the design has {expected} rows")]
    LengthMismatch { expected: usize, actual: usize },
    #[display("response is zero for every observation")]
    ZeroResponse,
    #[display("{observations} observations cannot identify {parameters} parameters")]
    Underdetermined {
        observations: usize,
        parameters: usize,
    },
    #[display("information matrix is singular")]
    Singular,
    #[display("fit produced non-finite values")]
    NonFinite,
    #[display("did not converge within {iterations} iterations")]
    NotConverged { iterations: usize },
}

/// A converged negative binomial regression.
#[derive(Debug, Clone, PartialEq)]
pub struct NegativeBinomialFit {
    /// Names of the design columns, parallel to `coefficients`.
    pub column_names: Vec<String>,
    /// Estimated coefficients on the log scale.
    pub coefficients: Vec<f64>,
    /// Estimated dispersion.
    pub alpha: f64,
    /// Log-likelihood at the estimate.
    pub log_likelihood: f64,
    /// Number of outer iterations used.
    pub iterations: usize,
    fitted: Vec<f64>,
}

impl NegativeBinomialFit {
    /// Fits `counts ~ design` by maximum likelihood.
    pub fn fit(
        design: &DesignMatrix,
        counts: &[u32],
        options: &FitOptions,
    ) -> Result<Self, FitError> {
        let n = design.num_rows();
        let p = design.num_cols();
        if counts.len() != n {
            return Err(FitError::LengthMismatch {
                expected: n,
                actual: counts.len(),
            });
        }
        if n == 0 {
            return Err(FitError::Empty);
        }
        // Coefficients plus the dispersion
        if n <= p + 1 {
            return Err(FitError::Underdetermined {
                observations: n,
                parameters: p + 1,
            });
        }
        if counts.iter().all(|&y| y == 0) {
            return Err(FitError::ZeroResponse);
        }

        let y = counts.iter().copied().map(f64::from).collect::<Vec<_>>();
        let data = Observations::new(counts);

        // Start from means halfway between each observation and the overall mean
        #[expect(clippy::cast_precision_loss)]
        let y_mean = y.iter().sum::<f64>() / n as f64;
        let start_mu = y.iter().map(|yi| (yi + y_mean) / 2.0).collect::<Vec<_>>();
        let start_eta = start_mu.iter().map(|mu| mu.ln()).collect::<Vec<_>>();
        let mut alpha = moment_alpha(&y, y_mean);
        let mut beta = irls_update(design, &y, &start_eta, &start_mu, alpha)?;
        let mut mu = means(design, &beta)?;
        let mut log_likelihood = data.log_likelihood(&mu, alpha);

        for iteration in 1..=options.max_iterations {
            alpha = data.profile_alpha(&mu);
            let current_ll = data.log_likelihood(&mu, alpha);

            let eta = linear_predictor(design, &beta);
            let mut candidate = irls_update(design, &y, &eta, &mu, alpha)?;
            let mut candidate_mu = means(design, &candidate)?;
            let mut candidate_ll = data.log_likelihood(&candidate_mu, alpha);

            let mut halvings = 0;
            while candidate_ll < current_ll && halvings < MAX_STEP_HALVINGS {
                for (c, b) in candidate.iter_mut().zip(&beta) {
                    *c = f64::midpoint(*c, *b);
                }
                candidate_mu = means(design, &candidate)?;
                candidate_ll = data.log_likelihood(&candidate_mu, alpha);
                halvings += 1;
            }
            if !candidate_ll.is_finite() {
                return Err(FitError::NonFinite);
            }

            let max_step = candidate
                .iter()
                .zip(&beta)
                .map(|(c, b)| (c - b).abs() / (1.0 + b.abs()))
                .fold(0.0, f64::max);
            let ll_change =
                (candidate_ll - log_likelihood).abs() / (log_likelihood.abs() + options.tolerance);

            beta = candidate;
            mu = candidate_mu;
            log_likelihood = candidate_ll;

            if ll_change < options.tolerance && max_step < options.tolerance.sqrt() {
                return Ok(Self {
                    column_names: design.column_names().to_vec(),
                    coefficients: beta,
                    alpha,
                    log_likelihood,
                    iterations: iteration,
                    fitted: mu,
                });
            }
        }

        Err(FitError::NotConverged {
            iterations: options.max_iterations,
        })
    }

    /// Fitted mean of each observation used in the fit.
    #[must_use]
    pub fn fitted_values(&self) -> &[f64] {
        &self.fitted
    }

    /// Predicted mean for a design row.
    ///
    /// # Panics
    ///
    /// Panics if `row` does not have one value per coefficient.
    #[must_use]
    pub fn predict(&self, row: &[f64]) -> f64 {
        assert_eq!(row.len(), self.coefficients.len());
        dot(row, &self.coefficients).exp()
    }
}

/// Count data with the per-observation constants of the likelihood cached.
struct Observations<'a> {
    counts: &'a [u32],
    ln_factorials: Vec<f64>,
}

impl<'a> Observations<'a> {
    fn new(counts: &'a [u32]) -> Self {
        let ln_factorials = counts.iter().map(|&y| ln_factorial(u64::from(y))).collect();
        Self {
            counts,
            ln_factorials,
        }
    }

    /// NB2 log-likelihood.
    ///
    /// Written in terms of `ln_1p(k / r)` and `ln_1p(mu / r)` with
    /// `r = 1 / alpha`, which stays accurate for the very large `r` near the
    /// Poisson limit.
    fn log_likelihood(&self, mu: &[f64], alpha: f64) -> f64 {
        let r = alpha.recip();
        self.counts
            .iter()
            .zip(&self.ln_factorials)
            .zip(mu)
            .map(|((&y, ln_fact), &mu)| {
                let y_f = f64::from(y);
                let gamma_ratio = (0..y).map(|k| (f64::from(k) / r).ln_1p()).sum::<f64>();
                gamma_ratio - ln_fact + y_f * mu.ln() - (r + y_f) * (mu / r).ln_1p()
            })
            .sum()
    }

    /// Maximizes the log-likelihood over `alpha` for fixed means.
    fn profile_alpha(&self, mu: &[f64]) -> f64 {
        const INV_PHI: f64 = 0.618_033_988_749_894_9;

        let objective = |ln_alpha: f64| self.log_likelihood(mu, ln_alpha.exp());
        let (mut lo, mut hi) = (LN_ALPHA_MIN, LN_ALPHA_MAX);
        let mut x1 = hi - INV_PHI * (hi - lo);
        let mut x2 = lo + INV_PHI * (hi - lo);
        let mut f1 = objective(x1);
        let mut f2 = objective(x2);
        while hi - lo > 1e-10 {
            if f1 < f2 {
                lo = x1;
                x1 = x2;
                f1 = f2;
                x2 = lo + INV_PHI * (hi - lo);
                f2 = objective(x2);
            } else {
                hi = x2;
                x2 = x1;
                f2 = f1;
                x1 = hi - INV_PHI * (hi - lo);
                f1 = objective(x1);
            }
        }
        f64::midpoint(lo, hi).exp()
    }
}

/// Method-of-moments starting value for the dispersion.
fn moment_alpha(y: &[f64], y_mean: f64) -> f64 {
    #[expect(clippy::cast_precision_loss)]
    let variance = y.iter().map(|yi| (yi - y_mean).powi(2)).sum::<f64>() / y.len() as f64;
    ((variance - y_mean) / (y_mean * y_mean)).clamp(LN_ALPHA_MIN.exp(), LN_ALPHA_MAX.exp())
}

/// Solves the weighted normal equations for the IRLS working response.
fn irls_update(
    design: &DesignMatrix,
    y: &[f64],
    eta: &[f64],
    mu: &[f64],
    alpha: f64,
) -> Result<Vec<f64>, FitError> {
    let p = design.num_cols();
    let mut xtwx = vec![0.0; p * p];
    let mut xtwz = vec![0.0; p];

    for (((row, &yi), &eta_i), &mu_i) in design.rows().zip(y).zip(eta).zip(mu) {
        let weight = mu_i / (1.0 + alpha * mu_i);
        let z = eta_i + (yi - mu_i) / mu_i;
        for (j, &xj) in row.iter().enumerate() {
            xtwz[j] += weight * xj * z;
            for (k, &xk) in row.iter().enumerate().take(j + 1) {
                xtwx[j * p + k] += weight * xj * xk;
            }
        }
    }
    for j in 0..p {
        for k in 0..j {
            xtwx[k * p + j] = xtwx[j * p + k];
        }
    }

    cholesky_solve(&xtwx, &xtwz).ok_or(FitError::Singular)
}

fn linear_predictor(design: &DesignMatrix, beta: &[f64]) -> Vec<f64> {
    design
        .rows()
        .map(|row| dot(row, beta).clamp(-ETA_LIMIT, ETA_LIMIT))
        .collect()
}

fn means(design: &DesignMatrix, beta: &[f64]) -> Result<Vec<f64>, FitError> {
    let mu = linear_predictor(design, beta)
        .into_iter()
        .map(f64::exp)
        .collect::<Vec<_>>();
    if mu.iter().all(|m| m.is_finite() && *m > 0.0) {
        Ok(mu)
    } else {
        Err(FitError::NonFinite)
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _};
    use rand_distr::{Distribution as _, Gamma, Poisson};
    use rand_pcg::Pcg64Mcg;

    use super::*;
    use crate::design::Factor;

    /// Draws NB2 counts as a Gamma-Poisson mixture.
    fn sample_nb2(rng: &mut Pcg64Mcg, mu: f64, alpha: f64) -> u32 {
        let shape = 1.0 / alpha;
        let lambda = Gamma::new(shape, mu / shape).unwrap().sample(rng);
        if lambda <= 0.0 {
            return 0;
        }
        #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let count = Poisson::new(lambda).unwrap().sample(rng) as u32;
        count
    }

    #[test]
    fn test_recovers_known_coefficients() {
        let mut rng = Pcg64Mcg::seed_from_u64(42);
        let levels = ["a", "b", "c"];
        let true_means = [2.0_f64, 5.0, 1.0];
        let alpha = 0.5;

        let mut labels = vec![];
        let mut counts = vec![];
        for _ in 0..9000 {
            let idx = rng.random_range(0..levels.len());
            labels.push(levels[idx]);
            counts.push(sample_nb2(&mut rng, true_means[idx], alpha));
        }

        let factor = Factor::new("group", labels);
        let design = DesignMatrix::with_intercept(counts.len(), &[factor]).unwrap();
        let fit = NegativeBinomialFit::fit(&design, &counts, &FitOptions::default()).unwrap();

        let intercept = fit.coefficients[0];
        assert!((intercept - 2.0_f64.ln()).abs() < 0.1, "{intercept}");
        assert!((fit.coefficients[1] - 2.5_f64.ln()).abs() < 0.1);
        assert!((fit.coefficients[2] - 0.5_f64.ln()).abs() < 0.15);
        assert!((fit.alpha - alpha).abs() < 0.15, "alpha = {}", fit.alpha);
        assert!(fit.iterations <= FitOptions::default().max_iterations);
    }

    #[test]
    fn test_fitted_values_match_predict() {
        let group = Factor::new("group", ["x", "y", "x", "y", "x", "y", "x", "y"]);
        let design = DesignMatrix::with_intercept(8, &[group]).unwrap();
        let counts = [0, 4, 1, 6, 2, 3, 1, 9];
        let fit = NegativeBinomialFit::fit(&design, &counts, &FitOptions::default()).unwrap();
        for (row, fitted) in design.rows().zip(fit.fitted_values()) {
            assert!((fit.predict(row) - fitted).abs() < 1e-9);
        }
        assert!(fit.log_likelihood < 0.0);
    }

    #[test]
    fn test_poisson_like_data_converges() {
        // Underdispersed data pushes alpha to its lower bound
        let group = Factor::new("group", ["p", "q", "p", "q", "p", "q", "p", "q"]);
        let design = DesignMatrix::with_intercept(8, &[group]).unwrap();
        let counts = [2, 3, 2, 3, 2, 3, 2, 3];
        let fit = NegativeBinomialFit::fit(&design, &counts, &FitOptions::default()).unwrap();
        assert!(fit.alpha < 1e-3);
        assert!((fit.fitted_values()[0] - 2.0).abs() < 1e-4);
        assert!((fit.fitted_values()[1] - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_zero_response() {
        let group = Factor::new("group", ["a", "b", "a", "b"]);
        let design = DesignMatrix::with_intercept(4, &[group]).unwrap();
        let err = NegativeBinomialFit::fit(&design, &[0, 0, 0, 0], &FitOptions::default());
        assert_eq!(err, Err(FitError::ZeroResponse));
    }

    #[test]
    fn test_underdetermined() {
        let group = Factor::new("group", ["a", "b", "c"]);
        let design = DesignMatrix::with_intercept(3, &[group]).unwrap();
        let err = NegativeBinomialFit::fit(&design, &[1, 2, 3], &FitOptions::default());
        assert_eq!(
            err,
            Err(FitError::Underdetermined {
                observations: 3,
                parameters: 4
            })
        );
    }

    #[test]
    fn test_length_mismatch() {
        let design = DesignMatrix::with_intercept(3, &[]).unwrap();
        let err = NegativeBinomialFit::fit(&design, &[1, 2], &FitOptions::default());
        assert_eq!(
            err,
            Err(FitError::LengthMismatch {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_all_zero_level_does_not_converge() {
        // Level "b" only ever sees zeros, so its coefficient diverges
        let group = Factor::new("group", ["a", "b", "a", "b", "a", "b", "a", "b"]);
        let design = DesignMatrix::with_intercept(8, &[group]).unwrap();
        let counts = [3, 0, 5, 0, 2, 0, 4, 0];
        let options = FitOptions {
            max_iterations: 50,
            ..FitOptions::default()
        };
        let err = NegativeBinomialFit::fit(&design, &counts, &options);
        assert!(
            matches!(
                err,
                Err(FitError::NotConverged { .. } | FitError::Singular | FitError::NonFinite)
            ),
            "{err:?}"
        );
    }
}
