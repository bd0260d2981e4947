//! `nom` grammar for attribute formulas
//!
//! ```text
//! expr   = term (('+' | '-') term)*
//! term   = unary (('*' | '/' | '%') unary)*
//! unary  = '-' unary | power
//! power  = atom ('^' unary)?
//! atom   = call | ident | number | '(' expr ')'
//! ```

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{alpha1, alphanumeric1, char, multispace0};
use nom::combinator::{all_consuming, map, opt, recognize};
use nom::multi::{many0, separated_list0};
use nom::number::complete::double;
use nom::sequence::{delimited, pair, preceded};
use nom::{IResult, Parser};

use super::expression::{BinOp, Expr, ParseError, UnaryOp};

type Error<'a> = nom::error::Error<&'a str>;

/// Parse a formula and check it only uses `level` and known functions
pub fn parse_formula(input: &str) -> Result<Expr, ParseError> {
    let parsed = all_consuming(ws(expr)).parse(input);
    let expr = match parsed {
        Ok((_, expr)) => expr,
        Err(e) => {
            return Err(ParseError {
                message: format!("'{}': {}", input.trim(), e),
            })
        }
    };
    expr.validate().map_err(|e| ParseError {
        message: format!("'{}': {}", input.trim(), e),
    })?;
    Ok(expr)
}

fn ws<'a, O, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = Error<'a>>
where
    F: Parser<&'a str, Output = O, Error = Error<'a>>,
{
    delimited(multispace0, inner, multispace0)
}

fn expr(input: &str) -> IResult<&str, Expr> {
    let (input, first) = term(input)?;
    let (input, rest) = many0(pair(ws(alt((char('+'), char('-')))), term)).parse(input)?;
    Ok((input, fold_ops(first, rest)))
}

fn term(input: &str) -> IResult<&str, Expr> {
    let (input, first) = unary(input)?;
    let (input, rest) =
        many0(pair(ws(alt((char('*'), char('/'), char('%')))), unary)).parse(input)?;
    Ok((input, fold_ops(first, rest)))
}

fn unary(input: &str) -> IResult<&str, Expr> {
    alt((
        map(preceded(ws(char('-')), unary), |operand| Expr::UnaryOp {
            op: UnaryOp::Neg,
            operand: Box::new(operand),
        }),
        power,
    ))
    .parse(input)
}

// Right-associative: 2^3^2 == 2^(3^2)
fn power(input: &str) -> IResult<&str, Expr> {
    let (input, base) = atom(input)?;
    let (input, exponent) = opt(preceded(ws(char('^')), unary)).parse(input)?;
    let expr = match exponent {
        Some(exponent) => Expr::BinOp {
            op: BinOp::Pow,
            left: Box::new(base),
            right: Box::new(exponent),
        },
        None => base,
    };
    Ok((input, expr))
}

fn atom(input: &str) -> IResult<&str, Expr> {
    alt((
        call,
        map(identifier, |name: &str| Expr::Param(name.to_lowercase())),
        map(double, Expr::Literal),
        delimited(ws(char('(')), expr, ws(char(')'))),
    ))
    .parse(input)
}

fn call(input: &str) -> IResult<&str, Expr> {
    map(
        pair(
            identifier,
            delimited(
                ws(char('(')),
                separated_list0(ws(char(',')), expr),
                ws(char(')')),
            ),
        ),
        |(name, args)| Expr::Function {
            name: name.to_lowercase(),
            args,
        },
    )
    .parse(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

fn fold_ops(first: Expr, rest: Vec<(char, Expr)>) -> Expr {
    rest.into_iter().fold(first, |left, (op, right)| {
        let op = match op {
            '+' => BinOp::Add,
            '-' => BinOp::Sub,
            '*' => BinOp::Mul,
            '/' => BinOp::Div,
            _ => BinOp::Mod,
        };
        Expr::BinOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(src: &str, level: f64) -> f64 {
        parse_formula(src).unwrap().evaluate(level).unwrap()
    }

    #[test]
    fn test_literal_parsing() {
        assert_eq!(parse_formula("42.5"), Ok(Expr::Literal(42.5)));
        assert_eq!(parse_formula("  42 "), Ok(Expr::Literal(42.0)));
    }

    #[test]
    fn test_param_parsing() {
        assert_eq!(parse_formula("level"), Ok(Expr::Param("level".to_string())));
        assert_eq!(parse_formula("Level"), Ok(Expr::Param("level".to_string())));
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("2 + 3 * level", 4.0), 14.0);
        assert_eq!(eval("(2 + 3) * level", 4.0), 20.0);
        assert_eq!(eval("10 - 4 - 3", 0.0), 3.0);
        assert_eq!(eval("level % 3", 7.0), 1.0);
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(eval("2 ^ 3 ^ 2", 0.0), 512.0);
        assert_eq!(eval("100 + 25 * level ^ 2", 2.0), 200.0);
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(eval("-level", 3.0), -3.0);
        assert_eq!(eval("-level ^ 2", 3.0), -9.0);
        assert_eq!(eval("5 - -2", 0.0), 7.0);
    }

    #[test]
    fn test_function_calls() {
        assert_eq!(eval("min(level, 10)", 25.0), 10.0);
        assert_eq!(eval("max( level * 2 , 3 )", 1.0), 3.0);
        assert_eq!(eval("floor(level / 2)", 5.0), 2.0);
        assert_eq!(eval("sqrt(level)", 16.0), 4.0);
    }

    #[test]
    fn test_rejects_unknown_param() {
        let err = parse_formula("strength * 2").unwrap_err();
        assert!(err.message.contains("strength"));
    }

    #[test]
    fn test_rejects_unknown_function() {
        assert!(parse_formula("pow(level, 2)").is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_formula("").is_err());
        assert!(parse_formula("2 +").is_err());
        assert!(parse_formula("(level").is_err());
        assert!(parse_formula("level level").is_err());
    }
}
