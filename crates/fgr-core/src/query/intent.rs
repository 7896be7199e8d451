use crate::{
    query::{Predicate, QueryError, fingerprint},
    schema::SchemaModel,
};
use serde::Serialize;
use std::ops::{BitAnd, BitOr, Not};

///
/// SortDirection
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

///
/// SortBy
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct SortBy {
    pub field: String,
    pub direction: SortDirection,
}

///
/// Query
///
/// Predicate tree plus ordering and an optional row limit; the complete
/// value handed to an evaluator. A query without a predicate matches
/// everything.
///

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Query {
    predicate: Option<Predicate>,
    sorting: Vec<SortBy>,
    limit: Option<u64>,
}

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predicate; an existing one is combined with a binary AND.
    #[must_use]
    pub fn filter(mut self, predicate: impl Into<Predicate>) -> Self {
        let predicate = predicate.into();
        self.predicate = Some(match self.predicate.take() {
            Some(existing) => Predicate::and(existing, predicate),
            None => predicate,
        });
        self
    }

    /// Append a sort key. Duplicates are kept for the evaluator to resolve.
    #[must_use]
    pub fn with_sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sorting.push(SortBy {
            field: field.into(),
            direction,
        });
        self
    }

    /// Cap the result size; zero is allowed and negative limits are not.
    pub fn with_limit(mut self, limit: i64) -> Result<Self, QueryError> {
        let limit = u64::try_from(limit).map_err(|_| QueryError::InvalidLimit { limit })?;
        self.limit = Some(limit);

        Ok(self)
    }

    // combine
    // the result is a fresh query: neither side's sorting or limit carries over
    fn combine(self, other: Self, join: fn(Predicate, Predicate) -> Predicate) -> Self {
        let predicate = match (self.predicate, other.predicate) {
            (Some(left), Some(right)) => Some(join(left, right)),
            (left, right) => left.or(right),
        };

        Self {
            predicate,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn and(self, other: Self) -> Self {
        self.combine(other, Predicate::and)
    }

    #[must_use]
    pub fn or(self, other: Self) -> Self {
        self.combine(other, Predicate::or)
    }

    /// Negate the predicate into a fresh query without sorting or limit.
    ///
    /// A query with no predicate stays predicate-free.
    #[expect(clippy::should_implement_trait)]
    #[must_use]
    pub fn not(self) -> Self {
        Self {
            predicate: self.predicate.map(Predicate::not),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    #[must_use]
    pub fn sorting(&self) -> &[SortBy] {
        &self.sorting
    }

    #[must_use]
    pub const fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Check that every condition and sort key names a field of `model`.
    ///
    /// Operands are never checked against declared types.
    pub fn validate(&self, model: &SchemaModel) -> Result<(), QueryError> {
        let condition_fields = self
            .predicate
            .iter()
            .flat_map(Predicate::conditions)
            .map(|condition| condition.field.as_str());
        let sort_fields = self.sorting.iter().map(|sort| sort.field.as_str());

        for field in condition_fields.chain(sort_fields) {
            if model.position(field).is_none() {
                return Err(QueryError::UnknownField {
                    schema: model.id().clone(),
                    field: field.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Deterministic digest of tree shape, operands, sorting, and limit.
    #[must_use]
    pub fn fingerprint(&self) -> [u8; 32] {
        fingerprint::hash_query(self)
    }
}

impl From<Predicate> for Query {
    fn from(predicate: Predicate) -> Self {
        Self::new().filter(predicate)
    }
}

impl BitAnd for Query {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl BitOr for Query {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

impl Not for Query {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::not(self)
    }
}
