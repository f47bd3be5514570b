/// Hessian matrix of second partials, its determinant and values at a point
pub mod hessian_evaluator;
/// the second-derivative test as a decision table over signs
pub mod classifier;
///____________________________________________________________________________________________________
/// # Orchestrator
/// one run: parse, differentiate, solve for critical points, differentiate again and
/// classify each point; every stage transition is logged
///# Example
/// ```
/// use RustedHessian::hessian::orchestrator::run_classification;
/// use RustedHessian::hessian::classifier::Verdict;
/// let report = run_classification("x**2 + y**2", ("x", "y")).unwrap();
/// assert_eq!(report.verdicts(), vec![Verdict::LocalMinimum]);
/// for r in &report.points {
///     println!("{}: {}", r.point, r.verdict);
/// }
/// ```
pub mod orchestrator;
