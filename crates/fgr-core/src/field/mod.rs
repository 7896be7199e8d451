
use crate::{
    error::ValidationError,
    naming::NamingConvention,
    value::{TypeSpec, Value},
};
use std::fmt;

///
/// FieldDefault
///
/// How a field is populated when a record is constructed without it.
/// A factory is invoked once per record, so no default value is ever shared
/// between instances.
///

#[derive(Clone, Default)]
pub enum FieldDefault {
    /// No default; an absent value resolves to `Null`.
    #[default]
    Required,
    Value(Value),
    Factory(fn() -> Value),
}

impl FieldDefault {
    #[must_use]
    pub const fn is_required(&self) -> bool {
        matches!(self, Self::Required)
    }
}

impl fmt::Debug for FieldDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("Required"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

impl PartialEq for FieldDefault {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Required, Self::Required) => true,
            (Self::Value(a), Self::Value(b)) => a == b,
            (Self::Factory(a), Self::Factory(b)) => std::ptr::fn_addr_eq(*a, *b),
            _ => false,
        }
    }
}

impl Eq for FieldDefault {}

///
/// FieldDescriptor
///
/// The typed contract for one named attribute of a schema.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldDescriptor {
    name: String,
    declared_type: TypeSpec,
    default: FieldDefault,
    nullable: bool,
    enumeration: Option<Vec<Value>>,
    immutable: bool,
    hashable: bool,
    naming: Option<NamingConvention>,
    description: String,
}

impl FieldDescriptor {
    /// Create a required, non-nullable, mutable, non-hashable field.
    #[must_use]
    pub fn new(name: impl Into<String>, declared_type: impl Into<TypeSpec>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            default: FieldDefault::Required,
            nullable: false,
            enumeration: None,
            immutable: false,
            hashable: false,
            naming: None,
            description: String::new(),
        }
    }

    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = FieldDefault::Value(value.into());
        self
    }

    /// Populate the field from `factory` for every new record.
    #[must_use]
    pub fn default_with(mut self, factory: fn() -> Value) -> Self {
        self.default = FieldDefault::Factory(factory);
        self
    }

    #[must_use]
    pub fn enumeration<T: Into<Value>>(mut self, members: impl IntoIterator<Item = T>) -> Self {
        self.enumeration = Some(members.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub const fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    #[must_use]
    pub const fn hashable(mut self) -> Self {
        self.hashable = true;
        self
    }

    #[must_use]
    pub const fn naming(mut self, naming: NamingConvention) -> Self {
        self.naming = Some(naming);
        self
    }

    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    //
    // Accessors
    //

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn declared_type(&self) -> &TypeSpec {
        &self.declared_type
    }

    #[must_use]
    pub const fn default(&self) -> &FieldDefault {
        &self.default
    }

    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }

    #[must_use]
    pub fn enumeration_members(&self) -> Option<&[Value]> {
        self.enumeration.as_deref()
    }

    #[must_use]
    pub const fn is_immutable(&self) -> bool {
        self.immutable
    }

    #[must_use]
    pub const fn is_hashable(&self) -> bool {
        self.hashable
    }

    /// Effective naming convention (snake_case unless declared otherwise).
    #[must_use]
    pub fn naming_convention(&self) -> NamingConvention {
        self.naming.unwrap_or_default()
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Private fields start with an underscore and need no description.
    #[must_use]
    pub fn is_public(&self) -> bool {
        !self.name.starts_with('_')
    }

    /// Key this field is rendered under in a primitive mapping.
    #[must_use]
    pub fn external_name(&self) -> String {
        self.naming_convention().render(&self.name)
    }

    //
    // Contract
    //

    /// Check `value` against this field: nullability, then type, then enumeration.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        if value.is_null() {
            if self.nullable {
                return Ok(());
            }

            return Err(self.type_mismatch(value));
        }

        if !self.declared_type.matches(value) {
            return Err(self.type_mismatch(value));
        }

        if let Some(allowed) = &self.enumeration
            && !allowed.contains(value)
        {
            return Err(ValidationError::EnumerationViolation {
                field: self.name.clone(),
                allowed: allowed.clone(),
                received: value.clone(),
            });
        }

        Ok(())
    }

    /// Produce this field's default; `Null` when none was declared.
    #[must_use]
    pub fn resolve_default(&self) -> Value {
        match &self.default {
            FieldDefault::Required => Value::Null,
            FieldDefault::Value(value) => value.clone(),
            FieldDefault::Factory(factory) => factory(),
        }
    }

    // apply a schema-level convention to fields that did not pick their own
    pub(crate) const fn with_fallback_naming(mut self, naming: NamingConvention) -> Self {
        if self.naming.is_none() {
            self.naming = Some(naming);
        }
        self
    }

    fn type_mismatch(&self, value: &Value) -> ValidationError {
        ValidationError::TypeMismatch {
            field: self.name.clone(),
            expected: self.declared_type.clone(),
            received: value.clone(),
        }
    }
}
