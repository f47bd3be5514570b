/*
Pretty printing of classification results: the Hessian matrix and one row per critical point.
*/
use crate::hessian::hessian_evaluator::SecondPartials;
use crate::hessian::orchestrator::{ClassificationReport, HessianReport};
use tabled::builder::Builder;
use tabled::settings::Style;

fn optional(value: &Option<impl ToString>) -> String {
    value.as_ref().map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// General Hessian `[[fxx, fxy], [fxy, fyy]]` as a table.
pub fn hessian_table(partials: &SecondPartials) -> String {
    let mut builder = Builder::default();
    for row in partials.matrix() {
        builder.push_record(row.iter().map(|e| e.to_string()));
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.to_string()
}

fn row(r: &HessianReport) -> [String; 5] {
    [
        r.point.x.to_string(),
        r.point.y.to_string(),
        optional(&r.determinant),
        optional(&r.fxx),
        r.verdict.to_string(),
    ]
}

/// One row per critical point: coordinates, `det H`, `fxx` and the verdict.
pub fn verdict_table(report: &ClassificationReport) -> String {
    let (v1, v2) = match report.points.first() {
        Some(r) => (r.point.variables.0.clone(), r.point.variables.1.clone()),
        None => ("x".to_string(), "y".to_string()),
    };
    let mut builder = Builder::default();
    builder.push_record([
        v1.clone(),
        v2,
        "det H".to_string(),
        format!("f{}{}", v1, v1),
        "verdict".to_string(),
    ]);
    for r in &report.points {
        builder.push_record(row(r));
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.to_string()
}
