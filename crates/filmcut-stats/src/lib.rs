//! Statistical building blocks for the filmcut analysis pipeline.
//!
//! This crate provides the numeric tools used by comparative scoring:
//!
//! - **Descriptive statistics**: mean, median, variance, standard deviation
//! - **Design matrices**: treatment-coded expansion of categorical predictors
//! - **Linear algebra**: Cholesky solver for small normal equations
//! - **Negative binomial regression**: NB2 count model fitted by maximum likelihood
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics
//! - [`design`]: Categorical factors and design matrices
//! - [`linalg`]: Dense symmetric positive definite solver
//! - [`negative_binomial`]: NB2 regression with explicit convergence reporting
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use filmcut_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 2.5);
//! assert_eq!(stats.median, 2.5);
//! ```
//!
//! ## Fitting a count regression
//!
//! ```
//! use filmcut_stats::{
//!     design::{DesignMatrix, Factor},
//!     negative_binomial::{FitOptions, NegativeBinomialFit},
//! };
//!
//! let rating = Factor::new("rating", ["A", "A", "A", "UA", "UA", "UA"]);
//! let design = DesignMatrix::with_intercept(6, &[rating]).unwrap();
//! let fit = NegativeBinomialFit::fit(&design, &[4, 6, 5, 1, 0, 2], &FitOptions::default());
//! assert!(fit.is_ok());
//! ```

pub mod descriptive;
pub mod design;
pub mod linalg;
pub mod negative_binomial;
