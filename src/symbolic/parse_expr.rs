//! Turns a string into a symbolic expression over two variables.
//!
//! Grammar, loosest binding first:
//! ```text
//! sum     := product (('+' | '-') product)*
//! product := unary (('*' | '/') unary)*
//! unary   := ('-' | '+') unary | power
//! power   := primary (('^' | '**') unary)?      right associative, -x^2 = -(x^2)
//! primary := number | name '(' sum (',' sum)* ')' | name | '(' sum ')'
//! ```
//! Numbers are read as exact rationals (`0.1` is `1/10`). Multiplication must be
//! written explicitly.

use crate::errors::HessianError;
use crate::symbolic::numbers::{Elementary, Number};
use crate::symbolic::symbolic_engine::Expr;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit0, digit1, multispace0, one_of},
    combinator::{all_consuming, cut, map_res, not, opt, recognize},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, terminated},
};
use num::{BigInt, BigRational};

/// decimal exponents beyond this are rejected instead of building huge integers
const MAX_DECIMAL_SCALE: u64 = 1000;

fn decimal_to_rational(text: &str) -> Result<BigRational, String> {
    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(i) => (
            &text[..i],
            text[i + 1..]
                .parse::<i64>()
                .map_err(|e| format!("bad exponent in '{}': {}", text, e))?,
        ),
        None => (text, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = format!("{}{}", int_part, frac_part);
    let numer: BigInt = digits
        .parse()
        .map_err(|e| format!("bad number '{}': {}", text, e))?;
    let out_of_range = || format!("number '{}' is out of range", text);
    let scale = i64::try_from(frac_part.len())
        .ok()
        .and_then(|len| exponent.checked_sub(len))
        .filter(|scale| scale.unsigned_abs() <= MAX_DECIMAL_SCALE)
        .ok_or_else(out_of_range)?;
    let ten = BigInt::from(10);
    Ok(if scale >= 0 {
        BigRational::from_integer(numer * num::pow(ten, scale as usize))
    } else {
        BigRational::new(numer, num::pow(ten, (-scale) as usize))
    })
}

fn number(input: &str) -> IResult<&str, Expr> {
    let mantissa = alt((
        recognize(pair(digit1, opt(pair(char('.'), digit0)))),
        recognize(pair(char('.'), digit1)),
    ));
    let exponent = opt((one_of("eE"), opt(one_of("+-")), digit1));
    let mut parser = map_res(recognize(pair(mantissa, exponent)), |s: &str| {
        decimal_to_rational(s).map(|r| Expr::Const(Number::Rational(r)))
    });
    parser.parse(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

fn call_or_variable(input: &str) -> IResult<&str, Expr> {
    let (input, name) = identifier(input)?;
    let args = preceded(
        multispace0,
        delimited(
            char('('),
            cut(separated_list1(preceded(multispace0, char(',')), sum)),
            cut(preceded(multispace0, char(')'))),
        ),
    )
    .parse(input);
    match args {
        Ok((rest, args)) => Ok((rest, Expr::Func(name.to_string(), args))),
        Err(nom::Err::Error(_)) => Ok((input, Expr::Var(name.to_string()))),
        Err(e) => Err(e),
    }
}

fn parenthesized(input: &str) -> IResult<&str, Expr> {
    delimited(char('('), cut(sum), cut(preceded(multispace0, char(')')))).parse(input)
}

fn primary(input: &str) -> IResult<&str, Expr> {
    let (input, _) = multispace0(input)?;
    alt((number, call_or_variable, parenthesized)).parse(input)
}

fn power(input: &str) -> IResult<&str, Expr> {
    let (input, base) = primary(input)?;
    match preceded(multispace0, alt((tag("**"), tag("^")))).parse(input) {
        Ok((rest, _)) => {
            let (rest, exponent) = cut(unary).parse(rest)?;
            Ok((rest, base.pow(exponent)))
        }
        Err(nom::Err::Error(_)) => Ok((input, base)),
        Err(e) => Err(e),
    }
}

fn unary(input: &str) -> IResult<&str, Expr> {
    match preceded(multispace0, one_of("+-")).parse(input) {
        Ok((rest, '-')) => {
            let (rest, operand) = cut(unary).parse(rest)?;
            Ok((rest, -operand))
        }
        Ok((rest, _)) => cut(unary).parse(rest),
        Err(nom::Err::Error(_)) => power(input),
        Err(e) => Err(e),
    }
}

fn product(input: &str) -> IResult<&str, Expr> {
    let (mut input, mut acc) = unary(input)?;
    loop {
        let op = preceded(
            multispace0,
            alt((terminated(char('*'), not(char('*'))), char('/'))),
        )
        .parse(input);
        match op {
            Ok((rest, op)) => {
                let (rest, rhs) = cut(unary).parse(rest)?;
                acc = if op == '*' { acc * rhs } else { acc / rhs };
                input = rest;
            }
            Err(nom::Err::Error(_)) => return Ok((input, acc)),
            Err(e) => return Err(e),
        }
    }
}

fn sum(input: &str) -> IResult<&str, Expr> {
    let (mut input, mut acc) = product(input)?;
    loop {
        match preceded(multispace0, one_of("+-")).parse(input) {
            Ok((rest, op)) => {
                let (rest, rhs) = cut(product).parse(rest)?;
                acc = if op == '+' { acc + rhs } else { acc - rhs };
                input = rest;
            }
            Err(nom::Err::Error(_)) => return Ok((input, acc)),
            Err(e) => return Err(e),
        }
    }
}

fn elementary_by_name(name: &str) -> Option<Elementary> {
    let func = match name {
        "exp" => Elementary::Exp,
        "ln" => Elementary::Ln,
        "sin" => Elementary::Sin,
        "cos" => Elementary::Cos,
        "tan" | "tg" => Elementary::Tg,
        "cot" | "ctg" => Elementary::Ctg,
        "asin" | "arcsin" => Elementary::Arcsin,
        "acos" | "arccos" => Elementary::Arccos,
        "atan" | "arctan" | "arctg" => Elementary::Arctg,
        "acot" | "arccot" | "arcctg" => Elementary::Arcctg,
        _ => return None,
    };
    Some(func)
}

fn arity_error(name: &str, expected: &str, got: usize) -> String {
    format!(
        "function '{}' expects {} argument(s), got {}",
        name, expected, got
    )
}

fn resolve_call(name: String, mut args: Vec<Expr>, variables: (&str, &str)) -> Result<Expr, String> {
    if name == variables.0 || name == variables.1 {
        return Err(format!("variable '{}' used as a function", name));
    }
    match name.as_str() {
        "sqrt" => {
            if args.len() != 1 {
                return Err(arity_error(&name, "1", args.len()));
            }
            Ok(args.remove(0).pow(Expr::rational(1, 2)))
        }
        "log" => match args.len() {
            1 => Ok(Expr::Ln(args.remove(0).boxed())),
            2 => {
                let base = args.remove(1);
                let arg = args.remove(0);
                Ok(Expr::Ln(arg.boxed()) / Expr::Ln(base.boxed()))
            }
            n => Err(arity_error(&name, "1 or 2", n)),
        },
        _ => match elementary_by_name(&name) {
            Some(func) => {
                if args.len() != 1 {
                    return Err(arity_error(&name, "1", args.len()));
                }
                Ok(Expr::elementary(func, args.remove(0)))
            }
            None => Ok(Expr::Func(name, args)),
        },
    }
}

/// Checks symbols of the raw tree: variables must be one of the two given names,
/// known function names become their dedicated nodes, other calls stay opaque.
fn resolve(expr: Expr, variables: (&str, &str)) -> Result<Expr, String> {
    let bin = |a: Box<Expr>, b: Box<Expr>| -> Result<(Box<Expr>, Box<Expr>), String> {
        Ok((resolve(*a, variables)?.boxed(), resolve(*b, variables)?.boxed()))
    };
    match expr {
        Expr::Var(name) => {
            if name == variables.0 || name == variables.1 {
                Ok(Expr::Var(name))
            } else {
                Err(format!("unknown symbol '{}'", name))
            }
        }
        Expr::Func(name, args) => {
            let args = args
                .into_iter()
                .map(|a| resolve(a, variables))
                .collect::<Result<Vec<_>, _>>()?;
            resolve_call(name, args, variables)
        }
        Expr::Add(a, b) => bin(a, b).map(|(a, b)| Expr::Add(a, b)),
        Expr::Sub(a, b) => bin(a, b).map(|(a, b)| Expr::Sub(a, b)),
        Expr::Mul(a, b) => bin(a, b).map(|(a, b)| Expr::Mul(a, b)),
        Expr::Div(a, b) => bin(a, b).map(|(a, b)| Expr::Div(a, b)),
        Expr::Pow(a, b) => bin(a, b).map(|(a, b)| Expr::Pow(a, b)),
        Expr::Neg(a) => Ok(Expr::Neg(resolve(*a, variables)?.boxed())),
        other => Ok(other),
    }
}

/// Parses `input` into an expression over the two `variables`.
///
/// # Arguments
/// * `input` - expression text, e.g. `"x**3 - 3*x*y + y**2"`
/// * `variables` - names of the two variables
///
/// # Returns
/// The expression tree, or `HessianError::Parse` with the position where parsing stopped
pub fn parse_expression(input: &str, variables: (&str, &str)) -> Result<Expr, HessianError> {
    if input.trim().is_empty() {
        return Err(HessianError::Parse("empty expression".to_string()));
    }
    let mut parser = all_consuming(delimited(multispace0, sum, multispace0));
    let raw = match parser.parse(input) {
        Ok((_, expr)) => expr,
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            let position = input.len() - e.input.len();
            let near: String = e.input.chars().take(12).collect();
            let msg = if near.is_empty() {
                format!("unexpected end of input at position {}", position)
            } else {
                format!("unexpected input '{}' at position {}", near, position)
            };
            return Err(HessianError::Parse(msg));
        }
        Err(nom::Err::Incomplete(_)) => {
            return Err(HessianError::Parse("incomplete expression".to_string()));
        }
    };
    resolve(raw, variables).map_err(HessianError::Parse)
}

impl Expr {
    /// Parses `input` into an expression over the two `variables`.
    pub fn parse_expression(input: &str, variables: (&str, &str)) -> Result<Expr, HessianError> {
        parse_expression(input, variables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const XY: (&str, &str) = ("x", "y");

    fn x() -> Expr {
        Expr::var("x")
    }

    fn y() -> Expr {
        Expr::var("y")
    }

    #[test]
    fn test_parse_sum_and_product() {
        let parsed = parse_expression("x + 2*y", XY).unwrap();
        assert_eq!(parsed, x() + Expr::int(2) * y());
        let parsed = parse_expression("x - y - 1", XY).unwrap();
        assert_eq!(parsed, (x() - y()) - Expr::int(1));
        let parsed = parse_expression("x / y * 2", XY).unwrap();
        assert_eq!(parsed, (x() / y()) * Expr::int(2));
    }

    #[test]
    fn test_parse_power_forms() {
        assert_eq!(parse_expression("x**2", XY).unwrap(), x().pow(Expr::int(2)));
        assert_eq!(parse_expression("x^2", XY).unwrap(), x().pow(Expr::int(2)));
        assert_eq!(
            parse_expression("x^2^3", XY).unwrap(),
            x().pow(Expr::int(2).pow(Expr::int(3)))
        );
        assert_eq!(parse_expression("-x^2", XY).unwrap(), -(x().pow(Expr::int(2))));
        assert_eq!(parse_expression("x^-1", XY).unwrap(), x().pow(-Expr::int(1)));
    }

    #[test]
    fn test_parse_decimals_exactly() {
        assert_eq!(parse_expression("0.1", XY).unwrap(), Expr::rational(1, 10));
        assert_eq!(parse_expression("2.5e2", XY).unwrap(), Expr::int(250));
        assert_eq!(parse_expression("1E-3", XY).unwrap(), Expr::rational(1, 1000));
        assert_eq!(parse_expression(".5", XY).unwrap(), Expr::rational(1, 2));
    }

    #[test]
    fn test_parse_functions() {
        assert_eq!(
            parse_expression("sin(x) + exp(y)", XY).unwrap(),
            Expr::sin(x().boxed()) + Expr::Exp(y().boxed())
        );
        assert_eq!(parse_expression("tan(x)", XY).unwrap(), Expr::tg(x().boxed()));
        assert_eq!(parse_expression("atan(x)", XY).unwrap(), Expr::arctg(x().boxed()));
        assert_eq!(parse_expression("log(x)", XY).unwrap(), Expr::Ln(x().boxed()));
        assert_eq!(
            parse_expression("sqrt(x)", XY).unwrap(),
            x().pow(Expr::rational(1, 2))
        );
        assert_eq!(
            parse_expression("f(x, y)", XY).unwrap(),
            Expr::Func("f".to_string(), vec![x(), y()])
        );
    }

    #[test]
    fn test_parse_custom_variable_names() {
        let parsed = parse_expression("a*b", ("a", "b")).unwrap();
        assert_eq!(parsed, Expr::var("a") * Expr::var("b"));
        assert!(parse_expression("x*b", ("a", "b")).is_err());
    }

    #[test]
    fn test_parse_errors() {
        let err = parse_expression("3x^^2", XY).unwrap_err();
        match err {
            HessianError::Parse(msg) => assert!(msg.contains("position 1"), "{}", msg),
            other => panic!("unexpected error {:?}", other),
        }
        assert!(matches!(parse_expression("", XY), Err(HessianError::Parse(_))));
        assert!(matches!(parse_expression("   ", XY), Err(HessianError::Parse(_))));
        assert!(matches!(parse_expression("x^^2", XY), Err(HessianError::Parse(_))));
        assert!(matches!(parse_expression("(x + y", XY), Err(HessianError::Parse(_))));
        assert!(matches!(parse_expression("x + z", XY), Err(HessianError::Parse(_))));
        assert!(matches!(parse_expression("sin(x, y)", XY), Err(HessianError::Parse(_))));
        assert!(matches!(parse_expression("x(2)", XY), Err(HessianError::Parse(_))));
        assert!(matches!(parse_expression("x +", XY), Err(HessianError::Parse(_))));
        // exponents at the edge of the integer range
        for text in ["1e-2147483648", "1.5e-2147483648*x", "2e9223372036854775807", "1e1001"] {
            assert!(
                matches!(parse_expression(text, XY), Err(HessianError::Parse(_))),
                "{}",
                text
            );
        }
        assert!(parse_expression("1.5e3*x", XY).is_ok());
    }
}
