use crate::{
    query::{Predicate, QueryError},
    record::Record,
    schema::SchemaId,
    value::Value,
};
use std::ops::{Rem, Shl};

///
/// FieldRef
///
/// A field bound to its schema rather than to any record. Building methods
/// produce predicate nodes instead of booleans, so it deliberately has no
/// `PartialEq` of its own; ordinary value comparisons stay ordinary.
///
/// Obtained through `SchemaModel::field_ref` or `SchemaRegistry::field_ref`,
/// which reject undeclared names.
///

#[derive(Clone, Debug)]
pub struct FieldRef {
    schema: SchemaId,
    field: String,
}

impl FieldRef {
    pub(crate) fn new(schema: SchemaId, field: &str) -> Self {
        Self {
            schema,
            field: field.to_string(),
        }
    }

    #[must_use]
    pub const fn schema(&self) -> &SchemaId {
        &self.schema
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.field
    }

    #[must_use]
    pub fn eq(&self, value: impl Into<Value>) -> Predicate {
        Predicate::eq(&self.field, value)
    }

    #[must_use]
    pub fn ne(&self, value: impl Into<Value>) -> Predicate {
        Predicate::ne(&self.field, value)
    }

    #[must_use]
    pub fn lt(&self, value: impl Into<Value>) -> Predicate {
        Predicate::lt(&self.field, value)
    }

    #[must_use]
    pub fn le(&self, value: impl Into<Value>) -> Predicate {
        Predicate::le(&self.field, value)
    }

    #[must_use]
    pub fn gt(&self, value: impl Into<Value>) -> Predicate {
        Predicate::gt(&self.field, value)
    }

    #[must_use]
    pub fn ge(&self, value: impl Into<Value>) -> Predicate {
        Predicate::ge(&self.field, value)
    }

    #[must_use]
    pub fn contains(&self, value: impl Into<Value>) -> Predicate {
        Predicate::contains(&self.field, value)
    }

    #[must_use]
    pub fn similar(&self, value: impl Into<Value>) -> Predicate {
        Predicate::similar(&self.field, value, None)
    }

    #[must_use]
    pub fn similar_with(&self, value: impl Into<Value>, threshold: f64) -> Predicate {
        Predicate::similar(&self.field, value, Some(threshold))
    }

    /// Similarity from a dynamically shaped operand.
    ///
    /// A scalar is a bare operand and `[value, number]` is a thresholded
    /// pair. Any other list, and any map, is rejected.
    pub fn similar_value(&self, operand: Value) -> Result<Predicate, QueryError> {
        let operand = match operand {
            Value::List(items) => self.similar_pair(items)?,
            Value::Map(entries) => {
                return Err(self.invalid_operand(&Value::Map(entries), "maps are not operands"));
            }
            value => SimilarOperand::from(value),
        };

        Ok(self.similar_operand(operand))
    }

    fn similar_operand(&self, operand: SimilarOperand) -> Predicate {
        Predicate::similar(&self.field, operand.value, operand.threshold)
    }

    fn similar_pair(&self, items: Vec<Value>) -> Result<SimilarOperand, QueryError> {
        let [value, threshold] = <[Value; 2]>::try_from(items).map_err(|items| {
            self.invalid_operand(
                &Value::List(items),
                "expected a bare value or a [value, threshold] pair",
            )
        })?;

        if matches!(value, Value::List(_) | Value::Map(_)) {
            return Err(self.invalid_operand(
                &Value::List(vec![value, threshold]),
                "pair value must not be a container",
            ));
        }

        let Some(threshold) = threshold.as_f64() else {
            return Err(self.invalid_operand(
                &Value::List(vec![value, threshold]),
                "threshold must be a number",
            ));
        };

        Ok(SimilarOperand {
            value,
            threshold: Some(threshold),
        })
    }

    fn invalid_operand(&self, operand: &Value, reason: &'static str) -> QueryError {
        QueryError::InvalidOperand {
            field: self.field.clone(),
            operand: operand.to_string(),
            reason,
        }
    }
}

///
/// SimilarOperand
/// Right-hand side of `field % operand`: a bare value or `(value, threshold)`.
///

#[derive(Clone, Debug, PartialEq)]
pub struct SimilarOperand {
    pub value: Value,
    pub threshold: Option<f64>,
}

impl From<Value> for SimilarOperand {
    fn from(value: Value) -> Self {
        Self {
            value,
            threshold: None,
        }
    }
}

impl From<(Value, f64)> for SimilarOperand {
    fn from((value, threshold): (Value, f64)) -> Self {
        Self {
            value,
            threshold: Some(threshold),
        }
    }
}

macro_rules! impl_similar_operand {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for SimilarOperand {
                fn from(value: $ty) -> Self {
                    Value::from(value).into()
                }
            }

            impl From<($ty, f64)> for SimilarOperand {
                fn from((value, threshold): ($ty, f64)) -> Self {
                    (Value::from(value), threshold).into()
                }
            }
        )*
    };
}

impl_similar_operand!(bool, i32, i64, u32, f64, &str, String, Record);

//
// Operator veneer
//

impl<T: Into<SimilarOperand>> Rem<T> for &FieldRef {
    type Output = Predicate;

    fn rem(self, operand: T) -> Self::Output {
        self.similar_operand(operand.into())
    }
}

impl<T: Into<SimilarOperand>> Rem<T> for FieldRef {
    type Output = Predicate;

    fn rem(self, operand: T) -> Self::Output {
        (&self).rem(operand)
    }
}

impl<T: Into<Value>> Shl<T> for &FieldRef {
    type Output = Predicate;

    fn shl(self, value: T) -> Self::Output {
        self.contains(value)
    }
}

impl<T: Into<Value>> Shl<T> for FieldRef {
    type Output = Predicate;

    fn shl(self, value: T) -> Self::Output {
        self.contains(value)
    }
}
