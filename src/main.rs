#![allow(non_snake_case)]
use RustedHessian::Utils::logger::{default_log_file_name, init_logger};
use RustedHessian::Utils::report_table::{hessian_table, verdict_table};
use RustedHessian::config::HessianConfig;
use RustedHessian::errors::HessianError;
use RustedHessian::hessian::orchestrator::{ClassificationReport, run_classification_with_config};
use clap::{Parser, ValueHint};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

/// Finds the stationary points of f(x, y) and classifies them with the second-derivative test
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// the function, e.g. "x**3 - 3*x*y + y**2"; read from stdin when absent
    expression: Option<String>,

    /// names of the two variables
    #[arg(long, value_delimiter = ',', default_values_t = ["x".to_string(), "y".to_string()])]
    vars: Vec<String>,

    /// TOML file with [solver], [classifier] and [logging] tables
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// off | error | warn | info | debug | trace
    #[arg(long)]
    loglevel: Option<String>,

    /// also write the log to this file; without a value the file is named after the current time
    #[arg(long, num_args = 0..=1, value_hint = ValueHint::FilePath)]
    log_file: Option<Option<String>>,
}

impl Cli {
    fn log_file_name(&self) -> Option<String> {
        self.log_file
            .as_ref()
            .map(|name| name.clone().unwrap_or_else(default_log_file_name))
    }
}

fn print_hints() {
    println!("Use * for multiplication and ** or ^ for powers, for example x**3 - 3*x*y + y**2");
    println!("Known functions: exp, ln, log, sqrt, sin, cos, tg (tan), ctg (cot), arcsin, arccos, arctg, arcctg");
}

fn read_expression() -> Result<String, HessianError> {
    print!("f(x, y) = ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn print_report(report: &ClassificationReport, (v1, v2): (&str, &str)) {
    println!("Acquired function: {}", report.function);
    println!("f{} = {}", v1, report.fx);
    println!("f{} = {}", v2, report.fy);
    if report.is_empty() {
        println!("no critical points found");
        return;
    }
    println!("Number of candidate points: {}", report.points.len());
    if let Some(partials) = &report.second_partials {
        println!("Hessian matrix:\n{}", hessian_table(partials));
    }
    println!("{}", verdict_table(report));
}

fn run(cli: Cli) -> Result<(), HessianError> {
    let mut config = match &cli.config {
        Some(path) => HessianConfig::from_file(path)?,
        None => HessianConfig::default(),
    };
    if let Some(level) = &cli.loglevel {
        config = config.with_loglevel(level);
    }
    if let Some(name) = cli.log_file_name() {
        config = config.with_log_file(Some(name.as_str()));
    }
    init_logger(&config.loglevel, config.log_file.as_deref())?;

    let (v1, v2) = match cli.vars.as_slice() {
        [a, b] => (a.as_str(), b.as_str()),
        _ => {
            return Err(HessianError::Parse(
                "exactly two variable names are expected".to_string(),
            ));
        }
    };
    print_hints();
    let text = match &cli.expression {
        Some(text) => text.clone(),
        None => read_expression()?,
    };
    let report = run_classification_with_config(&text, (v1, v2), &config)?;
    print_report(&report, (v1, v2));
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_arguments() {
        let cli = Cli::parse_from(["hessian", "--vars", "u,v", "--loglevel", "debug", "u^2 - v^2"]);
        assert_eq!(cli.vars, vec!["u".to_string(), "v".to_string()]);
        assert_eq!(cli.expression.as_deref(), Some("u^2 - v^2"));
        assert_eq!(cli.loglevel.as_deref(), Some("debug"));
        let cli = Cli::parse_from(["hessian", "x + y"]);
        assert_eq!(cli.vars, vec!["x".to_string(), "y".to_string()]);
        assert_eq!(cli.log_file_name(), None);
    }

    #[test]
    fn test_log_file_argument() {
        let cli = Cli::parse_from(["hessian", "--log-file", "run.log", "x^2 + y^2"]);
        assert_eq!(cli.log_file_name().as_deref(), Some("run.log"));
        assert_eq!(cli.expression.as_deref(), Some("x^2 + y^2"));

        let cli = Cli::parse_from(["hessian", "x^2 + y^2", "--log-file"]);
        let name = cli.log_file_name().unwrap();
        assert!(name.starts_with("hessian_") && name.ends_with(".log"), "{}", name);
        assert_eq!(cli.expression.as_deref(), Some("x^2 + y^2"));
    }
}
