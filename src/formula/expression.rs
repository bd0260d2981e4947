//! Expression types and AST for attribute formulas.
//!
//! Formulas are expressions over a single variable, `level`. They can include
//! literals, binary/unary operations and a small set of function calls.

/// Binary operators supported in expressions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    Neg,
}

/// Expression AST node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A numeric literal (e.g., 42.5)
    Literal(f64),
    /// A variable reference (only `level` is bound)
    Param(String),
    /// A binary operation (e.g., left + right)
    BinOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// A unary operation (e.g., -x)
    UnaryOp { op: UnaryOp, operand: Box<Expr> },
    /// A function call (e.g., min(a, b))
    Function { name: String, args: Vec<Expr> },
}

/// The only variable a formula may reference
pub const LEVEL_PARAM: &str = "level";

/// Function name and arity
const FUNCTIONS: &[(&str, usize)] = &[
    ("min", 2),
    ("max", 2),
    ("floor", 1),
    ("ceil", 1),
    ("round", 1),
    ("sqrt", 1),
    ("abs", 1),
];

/// Error type for expression evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Referenced a parameter that doesn't exist in the context
    UnknownParam(String),
    /// Called a function that doesn't exist
    UnknownFunction(String),
    /// Attempted to divide by zero
    DivisionByZero,
    /// Function called with wrong number of arguments
    InvalidArgCount {
        func: String,
        expected: usize,
        got: usize,
    },
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalError::UnknownParam(name) => write!(f, "Unknown parameter: {}", name),
            EvalError::UnknownFunction(name) => write!(f, "Unknown function: {}", name),
            EvalError::DivisionByZero => write!(f, "Division by zero"),
            EvalError::InvalidArgCount {
                func,
                expected,
                got,
            } => {
                write!(
                    f,
                    "Function {} expected {} args, got {}",
                    func, expected, got
                )
            }
        }
    }
}

impl std::error::Error for EvalError {}

/// Error type for expression parsing
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

impl Expr {
    /// Evaluate with `level` bound to the given value
    pub fn evaluate(&self, level: f64) -> Result<f64, EvalError> {
        match self {
            Expr::Literal(v) => Ok(*v),
            Expr::Param(name) if name == LEVEL_PARAM => Ok(level),
            Expr::Param(name) => Err(EvalError::UnknownParam(name.clone())),
            Expr::UnaryOp {
                op: UnaryOp::Neg,
                operand,
            } => Ok(-operand.evaluate(level)?),
            Expr::BinOp { op, left, right } => {
                let l = left.evaluate(level)?;
                let r = right.evaluate(level)?;
                match op {
                    BinOp::Add => Ok(l + r),
                    BinOp::Sub => Ok(l - r),
                    BinOp::Mul => Ok(l * r),
                    BinOp::Div if r == 0.0 => Err(EvalError::DivisionByZero),
                    BinOp::Div => Ok(l / r),
                    BinOp::Mod if r == 0.0 => Err(EvalError::DivisionByZero),
                    BinOp::Mod => Ok(l % r),
                    BinOp::Pow => Ok(l.powf(r)),
                }
            }
            Expr::Function { name, args } => {
                check_arity(name, args.len())?;
                let values = args
                    .iter()
                    .map(|a| a.evaluate(level))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(match name.as_str() {
                    "min" => values[0].min(values[1]),
                    "max" => values[0].max(values[1]),
                    "floor" => values[0].floor(),
                    "ceil" => values[0].ceil(),
                    "round" => values[0].round(),
                    "sqrt" => values[0].sqrt(),
                    "abs" => values[0].abs(),
                    other => return Err(EvalError::UnknownFunction(other.to_string())),
                })
            }
        }
    }

    /// Check every variable and call against what evaluation supports
    pub fn validate(&self) -> Result<(), EvalError> {
        match self {
            Expr::Literal(_) => Ok(()),
            Expr::Param(name) if name == LEVEL_PARAM => Ok(()),
            Expr::Param(name) => Err(EvalError::UnknownParam(name.clone())),
            Expr::UnaryOp { operand, .. } => operand.validate(),
            Expr::BinOp { left, right, .. } => {
                left.validate()?;
                right.validate()
            }
            Expr::Function { name, args } => {
                check_arity(name, args.len())?;
                args.iter().try_for_each(Expr::validate)
            }
        }
    }
}

fn check_arity(name: &str, got: usize) -> Result<(), EvalError> {
    let Some(&(_, expected)) = FUNCTIONS.iter().find(|(f, _)| *f == name) else {
        return Err(EvalError::UnknownFunction(name.to_string()));
    };
    if expected != got {
        return Err(EvalError::InvalidArgCount {
            func: name.to_string(),
            expected,
            got,
        });
    }
    Ok(())
}
