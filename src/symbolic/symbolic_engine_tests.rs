use crate::errors::HessianError;
use crate::symbolic::numbers::Number;
use crate::symbolic::symbolic_engine::{Expr, Sign};
//___________________________________TESTS____________________________________

mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const XY: (&str, &str) = ("x", "y");

    fn parse(text: &str) -> Expr {
        Expr::parse_expression(text, XY).unwrap()
    }

    #[test]
    fn test_operators_build_trees() {
        let x = Expr::var("x");
        let expected = Expr::Add(Box::new(Expr::var("x")), Box::new(Expr::int(2)));
        assert_eq!(x.clone() + Expr::int(2), expected);
        let expected = Expr::Neg(Box::new(Expr::var("x")));
        assert_eq!(-x.clone(), expected);
        let expected = Expr::Pow(Box::new(Expr::var("x")), Box::new(Expr::int(3)));
        assert_eq!(x.pow(Expr::int(3)), expected);
    }

    #[test]
    fn test_differentiation_is_linear() {
        let pairs = [
            ("x^3*y", "sin(x) + y^2"),
            ("exp(x*y)", "x/y"),
            ("ln(x^2 + y^2)", "arctg(x)"),
            ("x^y", "cos(x - y)^2"),
        ];
        for (f, g) in pairs {
            let (f, g) = (parse(f), parse(g));
            for var in ["x", "y"] {
                let lhs = (f.clone() + g.clone()).differentiate(var).unwrap();
                let rhs = f.differentiate(var).unwrap() + g.differentiate(var).unwrap();
                assert!(lhs.is_equivalent(&rhs), "d({} + {})/d{}", f, g, var);
            }
        }
    }

    #[test]
    fn test_power_rule() {
        for n in 1..=8_i64 {
            let f = Expr::var("x").pow(Expr::int(n));
            let expected = Expr::int(n) * Expr::var("x").pow(Expr::int(n - 1));
            assert!(f.differentiate("x").unwrap().is_equivalent(&expected), "n = {}", n);
        }
    }

    #[test]
    fn test_differentiation_is_deterministic() {
        let f = parse("x^3 - 3*x*y + y^2 + exp(x)*sin(y)");
        let first = f.differentiate("x").unwrap();
        for _ in 0..5 {
            assert_eq!(f.differentiate("x").unwrap(), first);
        }
    }

    #[test]
    fn test_second_partials_commute() {
        let f = parse("x^2*y^3 + exp(x*y) + x/y");
        let fxy = f.differentiate("x").unwrap().differentiate("y").unwrap();
        let fyx = f.differentiate("y").unwrap().differentiate("x").unwrap();
        assert!(fxy.is_equivalent(&fyx));
    }

    #[test]
    fn test_trigonometric_derivatives() {
        let cases = [
            ("tg(x)", "1/cos(x)^2"),
            ("ctg(x)", "-1/sin(x)^2"),
            ("arcsin(x)", "1/sqrt(1 - x^2)"),
            ("arccos(x)", "-1/sqrt(1 - x^2)"),
            ("arcctg(x)", "-1/(1 + x^2)"),
        ];
        for (f, d) in cases {
            assert!(
                parse(f).differentiate("x").unwrap().is_equivalent(&parse(d)),
                "d/dx {}",
                f
            );
        }
    }

    #[test]
    fn test_substitution_evaluates_hessian_entries() {
        let f = parse("x^3 - 3*x*y + y^2");
        let fxx = f.differentiate("x").unwrap().differentiate("x").unwrap();
        let value = fxx.substitute_all(&[("x", &Expr::rational(3, 2)), ("y", &Expr::rational(9, 4))]);
        assert_eq!(value, Expr::int(9));
        let value = fxx.substitute_all(&[("x", &Expr::real(1.5)), ("y", &Expr::real(2.25))]);
        match value {
            Expr::Const(Number::Real(v)) => assert_relative_eq!(v, 9.0, epsilon = 1e-12),
            other => panic!("expected a real constant, got {}", other),
        }
    }

    #[test]
    fn test_sign_of_irrational_constants() {
        let e = parse("sqrt(2) - 1.5");
        assert_eq!(e.compare_sign(), Sign::Negative);
        assert!(e.is_real());
        let e = parse("ln(2) - ln(2)");
        assert_eq!(e.compare_sign(), Sign::Zero);
    }

    #[test]
    fn test_unsupported_function_is_reported() {
        let f = parse("g(x*y)");
        match f.differentiate("y") {
            Err(HessianError::UnsupportedOperation(msg)) => assert!(msg.contains("'g'")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
