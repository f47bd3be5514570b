use crate::config::HessianConfig;
use crate::critical_points::critical_point_solver::{Point, solve_critical_points};
use crate::errors::HessianError;
use crate::hessian::classifier::{IgnoreReason, Verdict, classify};
use crate::hessian::hessian_evaluator::{SecondPartials, evaluate_hessian};
use crate::symbolic::symbolic_engine::Expr;
use log::{info, warn};
use rayon::prelude::*;
use strum_macros::Display;

/// Stages of one classification run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum Stage {
    ParseInput,
    Differentiate1,
    Solve,
    Differentiate2,
    ClassifyEach,
    Report,
    Failed,
}

/// Verdict for one critical point together with the values it was decided from.
/// `determinant` and `fxx` are `None` for points that were not tested.
#[derive(Clone, Debug, PartialEq)]
pub struct HessianReport {
    pub point: Point,
    pub determinant: Option<Expr>,
    pub fxx: Option<Expr>,
    pub verdict: Verdict,
}

/// Everything a finished run produced: the function, its gradient, the general
/// second partials (absent when there were no critical points) and one report per
/// critical point, in solver order.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassificationReport {
    pub function: Expr,
    pub fx: Expr,
    pub fy: Expr,
    pub second_partials: Option<SecondPartials>,
    pub points: Vec<HessianReport>,
}

impl ClassificationReport {
    pub fn verdicts(&self) -> Vec<Verdict> {
        self.points.iter().map(|r| r.verdict).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

fn check_variables(variables: (&str, &str)) -> Result<(), HessianError> {
    let valid = |name: &str| {
        let mut chars = name.chars();
        chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    };
    for name in [variables.0, variables.1] {
        if !valid(name) {
            return Err(HessianError::Parse(format!("invalid variable name '{}'", name)));
        }
    }
    if variables.0 == variables.1 {
        return Err(HessianError::Parse(format!(
            "the two variables must differ, both are '{}'",
            variables.0
        )));
    }
    Ok(())
}

struct ClassificationRun<'a> {
    text: &'a str,
    variables: (&'a str, &'a str),
    config: &'a HessianConfig,
    stage: Stage,
}

impl<'a> ClassificationRun<'a> {
    fn new(text: &'a str, variables: (&'a str, &'a str), config: &'a HessianConfig) -> Self {
        ClassificationRun {
            text,
            variables,
            config,
            stage: Stage::ParseInput,
        }
    }

    fn enter(&mut self, stage: Stage) {
        info!("{} -> {}", self.stage, stage);
        self.stage = stage;
    }

    fn run(mut self) -> Result<ClassificationReport, HessianError> {
        info!("classifying stationary points of '{}'", self.text);
        let result = self.execute();
        match &result {
            Ok(report) => {
                self.enter(Stage::Report);
                info!("{} point(s) classified", report.points.len());
            }
            Err(e) => {
                let failed_in = self.stage;
                self.enter(Stage::Failed);
                warn!("run failed in stage {}: {}", failed_in, e);
            }
        }
        result
    }

    fn execute(&mut self) -> Result<ClassificationReport, HessianError> {
        check_variables(self.variables)?;
        let function = Expr::parse_expression(self.text, self.variables)?;
        info!("function: {}", function);

        self.enter(Stage::Differentiate1);
        let (v1, v2) = self.variables;
        let fx = function.differentiate(v1)?;
        let fy = function.differentiate(v2)?;
        info!("gradient: f{} = {}, f{} = {}", v1, fx, v2, fy);

        self.enter(Stage::Solve);
        let points = solve_critical_points(&fx, &fy, self.variables, self.config)?;
        if points.is_empty() {
            return Ok(ClassificationReport {
                function,
                fx,
                fy,
                second_partials: None,
                points: Vec::new(),
            });
        }

        self.enter(Stage::Differentiate2);
        let partials = SecondPartials::from_gradient(&fx, &fy, self.variables)?;

        self.enter(Stage::ClassifyEach);
        let reports = points
            .into_iter()
            .map(|point| self.classify_point(&partials, point))
            .collect();
        Ok(ClassificationReport {
            function,
            fx,
            fy,
            second_partials: Some(partials),
            points: reports,
        })
    }

    fn classify_point(&self, partials: &SecondPartials, point: Point) -> HessianReport {
        if !point.is_real() {
            info!("{}: {}", point, Verdict::Ignored(IgnoreReason::ComplexPoint));
            return HessianReport {
                point,
                determinant: None,
                fxx: None,
                verdict: Verdict::Ignored(IgnoreReason::ComplexPoint),
            };
        }
        let (determinant, fxx) = evaluate_hessian(&partials.fxx, &partials.fyy, &partials.fxy, &point);
        let tolerance = self.config.zero_tolerance;
        let verdict = classify(
            determinant.compare_sign_with_tolerance(tolerance),
            fxx.compare_sign_with_tolerance(tolerance),
        );
        info!("{}: det H = {}, fxx = {}, {}", point, determinant, fxx, verdict);
        HessianReport {
            point,
            determinant: Some(determinant),
            fxx: Some(fxx),
            verdict,
        }
    }
}

/// Classifies the critical points of `text` with the default configuration.
///
/// # Arguments
/// * `text` - the function, e.g. `"x**3 - 3*x*y + y**2"`
/// * `variables` - names of the two variables
pub fn run_classification(
    text: &str,
    variables: (&str, &str),
) -> Result<ClassificationReport, HessianError> {
    run_classification_with_config(text, variables, &HessianConfig::default())
}

/// Classifies the critical points of `text`; fails with the error of the first stage
/// that fails, without a partial report.
pub fn run_classification_with_config(
    text: &str,
    variables: (&str, &str),
    config: &HessianConfig,
) -> Result<ClassificationReport, HessianError> {
    ClassificationRun::new(text, variables, config).run()
}

/// Independent runs over several functions, in parallel; results keep the input order.
pub fn run_classification_batch(
    texts: &[&str],
    variables: (&str, &str),
    config: &HessianConfig,
) -> Vec<Result<ClassificationReport, HessianError>> {
    texts
        .par_iter()
        .map(|text| run_classification_with_config(text, variables, config))
        .collect()
}
