use crate::symbolic::symbolic_engine::Sign;
use strum_macros::Display;

/// Why a critical point was left out of the test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum IgnoreReason {
    #[strum(serialize = "complex point")]
    ComplexPoint,
}

/// Outcome of the second-derivative test at one critical point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum Verdict {
    #[strum(serialize = "local minimum")]
    LocalMinimum,
    #[strum(serialize = "local maximum")]
    LocalMaximum,
    #[strum(serialize = "saddle point")]
    SaddlePoint,
    #[strum(serialize = "inconclusive")]
    Inconclusive,
    #[strum(to_string = "ignored ({0})")]
    Ignored(IgnoreReason),
}

/// The second-derivative test from the signs of `det H` and `fxx`.
///
/// A positive determinant with `fxx` zero or unknown cannot happen for a real
/// symmetric matrix; it is reported as `Inconclusive` like every other undecided case.
pub fn classify(determinant_sign: Sign, fxx_sign: Sign) -> Verdict {
    match (determinant_sign, fxx_sign) {
        (Sign::Positive, Sign::Positive) => Verdict::LocalMinimum,
        (Sign::Positive, Sign::Negative) => Verdict::LocalMaximum,
        (Sign::Positive, Sign::Zero | Sign::Unknown) => Verdict::Inconclusive,
        (Sign::Negative, _) => Verdict::SaddlePoint,
        (Sign::Zero | Sign::Unknown, _) => Verdict::Inconclusive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_decision_table() {
        for det in Sign::iter() {
            for fxx in Sign::iter() {
                let expected = match (det, fxx) {
                    (Sign::Positive, Sign::Positive) => Verdict::LocalMinimum,
                    (Sign::Positive, Sign::Negative) => Verdict::LocalMaximum,
                    (Sign::Negative, _) => Verdict::SaddlePoint,
                    _ => Verdict::Inconclusive,
                };
                assert_eq!(classify(det, fxx), expected, "det {}, fxx {}", det, fxx);
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Verdict::SaddlePoint.to_string(), "saddle point");
        assert_eq!(
            Verdict::Ignored(IgnoreReason::ComplexPoint).to_string(),
            "ignored (complex point)"
        );
    }
}
