// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
//! # RustedHessian
//!
//! Classification of stationary points of a function of two variables with the
//! second-derivative (Hessian) test.
//!
//! The pipeline: a string is parsed into a symbolic expression, the gradient is
//! computed analytically, the system `fx = 0, fy = 0` is solved exactly (resultant
//! elimination over the rationals), and every critical point gets a verdict from the
//! sign of the Hessian determinant and of `fxx`.
//! # Example
//! ```
//! use RustedHessian::hessian::orchestrator::run_classification;
//! use RustedHessian::hessian::classifier::Verdict;
//! let report = run_classification("x**3 - 3*x*y + y**2", ("x", "y")).unwrap();
//! assert_eq!(report.verdicts(), vec![Verdict::SaddlePoint, Verdict::LocalMinimum]);
//! ```
/// default tolerances and effort bounds
pub mod global;
/// error type shared by every stage of a run
pub mod errors;
/// run configuration with TOML overrides
pub mod config;
/// symbolic expressions: parsing, differentiation, simplification, small exact algebra
pub mod symbolic;
/// solving the gradient system for critical points
pub mod critical_points;
/// Hessian evaluation, classification and the run orchestrator
pub mod hessian;
/// logging and report formatting
pub mod Utils;
