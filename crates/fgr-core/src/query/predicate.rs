use crate::value::Value;
use serde::Serialize;
use std::ops::{BitAnd, BitOr, Not};

///
/// Predicate tree
///
/// Pure, schema-agnostic representation of a filter. Nothing here checks
/// operands against field types; queries may search with partial or
/// differently typed values, such as a substring for `contains`.
///
/// Combinators are strictly binary and never flattened, so `a & b & c`
/// builds `And(And(a, b), c)`. Evaluators must recurse.
///

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum CompareOp {
    Eq = 0x01,
    Ne = 0x02,
    Lt = 0x03,
    Le = 0x04,
    Gt = 0x05,
    Ge = 0x06,
    Contains = 0x07,
    Similar = 0x08,
}

impl CompareOp {
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Contains => "contains",
            Self::Similar => "similar",
        }
    }
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// Condition
/// One leaf: `field <op> value`, with an optional threshold for `similar`.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Condition {
    pub field: String,
    pub op: CompareOp,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

impl Condition {
    #[must_use]
    pub fn new(field: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
            threshold: None,
        }
    }

    #[must_use]
    pub fn similar(field: impl Into<String>, value: impl Into<Value>, threshold: Option<f64>) -> Self {
        Self {
            threshold,
            ..Self::new(field, CompareOp::Similar, value)
        }
    }
}

///
/// Predicate
///

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Condition(Condition),
    And(Box<Self>, Box<Self>),
    Or(Box<Self>, Box<Self>),
    Not(Box<Self>),
}

impl Predicate {
    #[must_use]
    pub fn and(left: Self, right: Self) -> Self {
        Self::And(Box::new(left), Box::new(right))
    }

    #[must_use]
    pub fn or(left: Self, right: Self) -> Self {
        Self::Or(Box::new(left), Box::new(right))
    }

    #[expect(clippy::should_implement_trait)]
    #[must_use]
    pub fn not(inner: Self) -> Self {
        Self::Not(Box::new(inner))
    }

    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Condition(Condition::new(field, CompareOp::Eq, value))
    }

    #[must_use]
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Condition(Condition::new(field, CompareOp::Ne, value))
    }

    #[must_use]
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Condition(Condition::new(field, CompareOp::Lt, value))
    }

    #[must_use]
    pub fn le(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Condition(Condition::new(field, CompareOp::Le, value))
    }

    #[must_use]
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Condition(Condition::new(field, CompareOp::Gt, value))
    }

    #[must_use]
    pub fn ge(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Condition(Condition::new(field, CompareOp::Ge, value))
    }

    #[must_use]
    pub fn contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Condition(Condition::new(field, CompareOp::Contains, value))
    }

    /// Approximate match; the threshold is passed through unchecked.
    #[must_use]
    pub fn similar(
        field: impl Into<String>,
        value: impl Into<Value>,
        threshold: Option<f64>,
    ) -> Self {
        Self::Condition(Condition::similar(field, value, threshold))
    }

    /// Visit every node depth-first, left to right.
    pub fn walk<V: PredicateVisitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            Self::Condition(condition) => visitor.condition(condition),
            Self::And(left, right) | Self::Or(left, right) => {
                visitor.enter(self);
                left.walk(visitor);
                right.walk(visitor);
                visitor.leave(self);
            }
            Self::Not(inner) => {
                visitor.enter(self);
                inner.walk(visitor);
                visitor.leave(self);
            }
        }
    }

    /// Leaf conditions in traversal order.
    #[must_use]
    pub fn conditions(&self) -> Vec<&Condition> {
        let mut out = Vec::new();
        self.collect_conditions(&mut out);

        out
    }

    // walk can't hand out borrows tied to self, so leaves are gathered here
    fn collect_conditions<'a>(&'a self, out: &mut Vec<&'a Condition>) {
        match self {
            Self::Condition(condition) => out.push(condition),
            Self::And(left, right) | Self::Or(left, right) => {
                left.collect_conditions(out);
                right.collect_conditions(out);
            }
            Self::Not(inner) => inner.collect_conditions(out),
        }
    }
}

impl From<Condition> for Predicate {
    fn from(condition: Condition) -> Self {
        Self::Condition(condition)
    }
}

impl BitAnd for Predicate {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::and(self, rhs)
    }
}

impl BitAnd for &Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Self) -> Self::Output {
        Predicate::and(self.clone(), rhs.clone())
    }
}

impl BitOr for Predicate {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::or(self, rhs)
    }
}

impl BitOr for &Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Self) -> Self::Output {
        Predicate::or(self.clone(), rhs.clone())
    }
}

impl Not for Predicate {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::Not(Box::new(self))
    }
}

impl Not for &Predicate {
    type Output = Predicate;

    fn not(self) -> Self::Output {
        Predicate::Not(Box::new(self.clone()))
    }
}

///
/// PredicateVisitor
///
/// Callback surface for evaluators walking a tree. `enter` and `leave`
/// bracket the children of every combinator.
///

pub trait PredicateVisitor {
    fn condition(&mut self, condition: &Condition);

    fn enter(&mut self, _node: &Predicate) {}

    fn leave(&mut self, _node: &Predicate) {}
}
