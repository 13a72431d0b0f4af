//! Rotation angles, either fixed or bound later by an optimizer.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{IrError, IrResult};

/// An angle expression.
///
/// Variational circuits are built once with [`ParameterExpression::Symbol`]
/// placeholders and then bound to concrete values for every cost evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterExpression {
    Constant(f64),
    Symbol(String),
    Neg(Box<ParameterExpression>),
    Add(Box<ParameterExpression>, Box<ParameterExpression>),
    Mul(Box<ParameterExpression>, Box<ParameterExpression>),
}

impl ParameterExpression {
    pub fn constant(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        ParameterExpression::Symbol(name.into())
    }

    /// True if any symbol remains unbound.
    pub fn is_symbolic(&self) -> bool {
        match self {
            ParameterExpression::Constant(_) => false,
            ParameterExpression::Symbol(_) => true,
            ParameterExpression::Neg(e) => e.is_symbolic(),
            ParameterExpression::Add(a, b) | ParameterExpression::Mul(a, b) => {
                a.is_symbolic() || b.is_symbolic()
            }
        }
    }

    /// Numeric value, if the expression is fully bound.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterExpression::Constant(v) => Some(*v),
            ParameterExpression::Symbol(_) => None,
            ParameterExpression::Neg(e) => e.as_f64().map(|v| -v),
            ParameterExpression::Add(a, b) => Some(a.as_f64()? + b.as_f64()?),
            ParameterExpression::Mul(a, b) => Some(a.as_f64()? * b.as_f64()?),
        }
    }

    /// Like [`as_f64`](Self::as_f64), but names the first unbound symbol on failure.
    pub fn evaluate(&self) -> IrResult<f64> {
        self.as_f64().ok_or_else(|| {
            let name = self.symbols().into_iter().next().unwrap_or_default();
            IrError::UnboundParameter(name)
        })
    }

    /// Symbol names in lexical order.
    pub fn symbols(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols(&self, out: &mut BTreeSet<String>) {
        match self {
            ParameterExpression::Constant(_) => {}
            ParameterExpression::Symbol(name) => {
                out.insert(name.clone());
            }
            ParameterExpression::Neg(e) => e.collect_symbols(out),
            ParameterExpression::Add(a, b) | ParameterExpression::Mul(a, b) => {
                a.collect_symbols(out);
                b.collect_symbols(out);
            }
        }
    }

    /// Substitute every symbol found in `values`. Unknown symbols are left as-is.
    pub fn bind(&self, values: &FxHashMap<String, f64>) -> Self {
        match self {
            ParameterExpression::Symbol(name) => match values.get(name) {
                Some(v) => ParameterExpression::Constant(*v),
                None => self.clone(),
            },
            ParameterExpression::Constant(_) => self.clone(),
            ParameterExpression::Neg(e) => ParameterExpression::Neg(Box::new(e.bind(values))),
            ParameterExpression::Add(a, b) => {
                ParameterExpression::Add(Box::new(a.bind(values)), Box::new(b.bind(values)))
            }
            ParameterExpression::Mul(a, b) => {
                ParameterExpression::Mul(Box::new(a.bind(values)), Box::new(b.bind(values)))
            }
        }
    }
}

impl fmt::Display for ParameterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterExpression::Constant(v) => write!(f, "{v}"),
            ParameterExpression::Symbol(name) => write!(f, "{name}"),
            ParameterExpression::Neg(e) => write!(f, "-({e})"),
            ParameterExpression::Add(a, b) => write!(f, "({a} + {b})"),
            ParameterExpression::Mul(a, b) => write!(f, "({a} * {b})"),
        }
    }
}

impl From<f64> for ParameterExpression {
    fn from(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }
}

impl From<&str> for ParameterExpression {
    fn from(name: &str) -> Self {
        ParameterExpression::Symbol(name.to_string())
    }
}

impl std::ops::Add for ParameterExpression {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        ParameterExpression::Add(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Mul for ParameterExpression {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        ParameterExpression::Mul(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Neg for ParameterExpression {
    type Output = Self;

    fn neg(self) -> Self::Output {
        ParameterExpression::Neg(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_constant_evaluates() {
        let p = ParameterExpression::constant(1.5);
        assert!(!p.is_symbolic());
        assert_eq!(p.evaluate().unwrap(), 1.5);
    }

    #[test]
    fn test_unbound_symbol_is_reported() {
        let p = ParameterExpression::symbol("theta_1") * ParameterExpression::constant(2.0);
        assert!(p.is_symbolic());
        match p.evaluate() {
            Err(IrError::UnboundParameter(name)) => assert_eq!(name, "theta_1"),
            other => panic!("expected UnboundParameter, got {other:?}"),
        }
    }

    #[test]
    fn test_bind_compound_expression() {
        let p = -(ParameterExpression::symbol("a") + ParameterExpression::symbol("b"));
        let mut values = FxHashMap::default();
        values.insert("a".to_string(), FRAC_PI_2);
        let partial = p.bind(&values);
        assert!(partial.is_symbolic());
        assert_eq!(partial.symbols().into_iter().collect::<Vec<_>>(), vec!["b"]);

        values.insert("b".to_string(), 0.5);
        let full = p.bind(&values);
        assert!((full.evaluate().unwrap() + FRAC_PI_2 + 0.5).abs() < 1e-12);
    }
}
