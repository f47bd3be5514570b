use crate::errors::HessianError;
use chrono::Local;
use simplelog::{
    ColorChoice, CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::File;

/// `off | error | warn | info | debug | trace`, case-insensitive
pub fn parse_level(level: &str) -> Result<LevelFilter, HessianError> {
    match level.to_lowercase().as_str() {
        "off" | "none" => Ok(LevelFilter::Off),
        "error" => Ok(LevelFilter::Error),
        "warn" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        other => Err(HessianError::Config(format!("unknown log level '{}'", other))),
    }
}

/// log file name stamped with the current local time
pub fn default_log_file_name() -> String {
    format!("hessian_{}.log", Local::now().format("%Y-%m-%d_%H-%M-%S"))
}

/// Terminal logger plus an optional file logger at the same level.
/// A second initialization in the same process is ignored.
pub fn init_logger(level: &str, log_file: Option<&str>) -> Result<(), HessianError> {
    let level = parse_level(level)?;
    if level == LevelFilter::Off {
        return Ok(());
    }
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ));
    if let Some(name) = log_file {
        let file = File::create(name)
            .map_err(|e| HessianError::Config(format!("cannot create log file {}: {}", name, e)))?;
        loggers.push(WriteLogger::new(level, Config::default(), file));
    }
    let _ = CombinedLogger::init(loggers);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(parse_level("DEBUG").unwrap(), LevelFilter::Debug);
        assert_eq!(parse_level("off").unwrap(), LevelFilter::Off);
        assert!(matches!(parse_level("loud"), Err(HessianError::Config(_))));
    }

    #[test]
    fn test_default_log_file_name() {
        let name = default_log_file_name();
        assert!(name.starts_with("hessian_") && name.ends_with(".log"));
    }

    #[test]
    fn test_unwritable_log_file() {
        assert!(init_logger("info", Some("/nonexistent/dir/run.log")).is_err());
    }
}
