//! Attribute formulas
//!
//! Every per-level number in the catalogs (health, mana, cost, range,
//! cooldown, ...) and the experience curve is a formula of `level`.
//! TOML may spell a formula as a plain number or as an expression string.

pub mod expression;
pub mod parser;

pub use expression::{BinOp, EvalError, Expr, ParseError, UnaryOp, LEVEL_PARAM};
pub use parser::parse_formula;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A parsed formula together with its source text
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

impl Formula {
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let expr = parse_formula(source)?;
        Ok(Self {
            source: source.trim().to_string(),
            expr,
        })
    }

    /// A formula that ignores the level
    pub fn constant(value: f64) -> Self {
        Self {
            source: value.to_string(),
            expr: Expr::Literal(value),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn try_eval(&self, level: u32) -> Result<f64, EvalError> {
        self.expr.evaluate(level as f64)
    }

    /// Evaluate at `level`; evaluation errors yield 0 and are logged
    pub fn eval(&self, level: u32) -> f64 {
        match self.try_eval(level) {
            Ok(v) if v.is_finite() => v,
            Ok(v) => {
                tracing::warn!("Formula '{}' produced {} at level {}", self.source, v, level);
                0.0
            }
            Err(e) => {
                tracing::warn!("Formula '{}' failed at level {}: {}", self.source, level, e);
                0.0
            }
        }
    }

    /// Integer attribute, truncated toward zero
    pub fn eval_int(&self, level: u32) -> i64 {
        self.eval(level) as i64
    }

    /// Integer attribute clamped at zero (costs, durations, pools)
    pub fn eval_u32(&self, level: u32) -> u32 {
        self.eval_int(level).clamp(0, u32::MAX as i64) as u32
    }
}

impl FromStr for Formula {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Formula::parse(s)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Serialize for Formula {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

struct FormulaVisitor;

impl<'de> Visitor<'de> for FormulaVisitor {
    type Value = Formula;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number or a formula of `level`")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Formula, E> {
        Formula::parse(v).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Formula, E> {
        Ok(Formula::constant(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Formula, E> {
        Ok(Formula::constant(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Formula, E> {
        Ok(Formula::constant(v))
    }
}

impl<'de> Deserialize<'de> for Formula {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FormulaVisitor)
    }
}
