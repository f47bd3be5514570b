use std::fmt;

/// Fatal outcomes of a classification run. Non-fatal per-point outcomes
/// (complex points, inconclusive tests) are verdicts, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum HessianError {
    /// malformed expression text, unknown symbol or wrong number of function arguments
    Parse(String),
    /// differentiation met a construct it has no rule for
    UnsupportedOperation(String),
    /// the gradient system has no closed-form finite solution set within the effort bounds
    Unsolvable(String),
    /// unreadable or malformed configuration
    Config(String),
    /// reading the input or writing the prompt failed
    Io(String),
}

impl fmt::Display for HessianError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HessianError::Parse(msg) => write!(f, "Parse error: {}", msg),
            HessianError::UnsupportedOperation(msg) => {
                write!(f, "Unsupported operation: {}", msg)
            }
            HessianError::Unsolvable(msg) => write!(f, "Unsolvable system: {}", msg),
            HessianError::Config(msg) => write!(f, "Configuration error: {}", msg),
            HessianError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for HessianError {}

impl From<std::io::Error> for HessianError {
    fn from(e: std::io::Error) -> Self {
        HessianError::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_kind() {
        let e = HessianError::Parse("unexpected input at position 2".to_string());
        assert_eq!(e.to_string(), "Parse error: unexpected input at position 2");
        let e = HessianError::Unsolvable("infinitely many critical points".to_string());
        assert!(e.to_string().starts_with("Unsolvable system"));
    }

    #[test]
    fn test_io_errors_keep_their_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "stdin closed");
        let e = HessianError::from(io);
        assert_eq!(e, HessianError::Io("stdin closed".to_string()));
        assert_eq!(e.to_string(), "I/O error: stdin closed");
    }
}
