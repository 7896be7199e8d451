//! Heritage computation, definition checks, and field aggregation.
//!
//! These are pure functions over registry snapshots; the registry decides
//! when they run and caches what they produce.

use crate::{
    error::SchemaDefinitionError,
    field::FieldDescriptor,
    naming::NamingConvention,
    schema::{SchemaDef, SchemaId, SchemaModel, reserved},
};
use std::collections::{BTreeMap, BTreeSet};

///
/// DefinitionRules
/// Registry-wide knobs applied to every definition check.
///

#[derive(Clone, Debug)]
pub(crate) struct DefinitionRules {
    pub default_naming: NamingConvention,
    pub require_descriptions: bool,
    pub extra_reserved: BTreeSet<String>,
}

/// Compute the heritage of a schema from its direct parents.
///
/// Each parent contributes itself followed by its own heritage; duplicates
/// keep their last occurrence, so a shared ancestor lands after every schema
/// that inherits from it.
pub(crate) fn heritage<'a>(
    def: &SchemaDef,
    lookup: impl Fn(&SchemaId) -> Option<&'a [SchemaId]>,
) -> Result<Vec<SchemaId>, SchemaDefinitionError> {
    let mut chain = Vec::new();

    for parent in &def.parents {
        if parent == &def.id {
            return Err(SchemaDefinitionError::CyclicHeritage {
                schema: def.id.clone(),
                parent: parent.clone(),
            });
        }

        let parent_heritage = lookup(parent).ok_or_else(|| SchemaDefinitionError::UnknownParent {
            schema: def.id.clone(),
            parent: parent.clone(),
        })?;

        if parent_heritage.contains(&def.id) {
            return Err(SchemaDefinitionError::CyclicHeritage {
                schema: def.id.clone(),
                parent: parent.clone(),
            });
        }

        chain.push(parent.clone());
        chain.extend(parent_heritage.iter().cloned());
    }

    let mut seen = BTreeSet::new();
    let mut deduped: Vec<SchemaId> = chain
        .into_iter()
        .rev()
        .filter(|id| seen.insert(id.clone()))
        .collect();
    deduped.reverse();

    Ok(deduped)
}

/// Check the schema's own declarations before anything is aggregated.
pub(crate) fn check_definition(
    def: &SchemaDef,
    rules: &DefinitionRules,
    is_registered: impl Fn(&SchemaId) -> bool,
) -> Result<(), SchemaDefinitionError> {
    let schema = &def.id;
    let mut names = BTreeSet::new();

    for field in &def.fields {
        let name = field.name();

        reserved::validate_ident(name).map_err(|reason| SchemaDefinitionError::InvalidIdent {
            schema: schema.clone(),
            field: name.to_string(),
            reason,
        })?;

        if reserved::is_reserved(name, &rules.extra_reserved) {
            return Err(SchemaDefinitionError::ReservedIdent {
                schema: schema.clone(),
                field: name.to_string(),
            });
        }

        if !names.insert(name) {
            return Err(SchemaDefinitionError::DuplicateField {
                schema: schema.clone(),
                field: name.to_string(),
            });
        }

        if rules.require_descriptions && field.is_public() && field.description().trim().is_empty()
        {
            return Err(SchemaDefinitionError::MissingDescription {
                schema: schema.clone(),
                field: name.to_string(),
            });
        }

        if field.declared_type().is_ambiguous() {
            return Err(SchemaDefinitionError::AmbiguousType {
                schema: schema.clone(),
                field: name.to_string(),
                declared: field.declared_type().clone(),
            });
        }

        if let Some(members) = field.enumeration_members() {
            for member in members {
                let fits = if member.is_null() {
                    field.is_nullable()
                } else {
                    field.declared_type().matches(member)
                };

                if !fits {
                    return Err(SchemaDefinitionError::EnumerationType {
                        schema: schema.clone(),
                        field: name.to_string(),
                        member: member.clone(),
                        expected: field.declared_type().clone(),
                    });
                }
            }
        }

        for target in field.declared_type().record_refs() {
            if target != schema && !is_registered(target) {
                return Err(SchemaDefinitionError::UnknownRecordType {
                    schema: schema.clone(),
                    field: name.to_string(),
                    target: target.clone(),
                });
            }
        }
    }

    Ok(())
}

/// Merge the heritage's fields with the schema's own into one model.
///
/// Ancestors are applied from most distant to most specific, then the schema
/// itself. A re-declared name replaces the earlier descriptor but keeps the
/// position where the name was first introduced.
pub(crate) fn aggregate(
    def: &SchemaDef,
    heritage: &[SchemaId],
    ancestors: &BTreeMap<&SchemaId, &SchemaDef>,
    rules: &DefinitionRules,
) -> Result<SchemaModel, SchemaDefinitionError> {
    let mut fields: Vec<FieldDescriptor> = Vec::new();

    let mut layers = Vec::with_capacity(heritage.len() + 1);
    for id in heritage.iter().rev() {
        let ancestor = ancestors
            .get(id)
            .copied()
            .ok_or_else(|| SchemaDefinitionError::UnknownParent {
                schema: def.id.clone(),
                parent: id.clone(),
            })?;
        layers.push(ancestor);
    }
    layers.push(def);

    for layer in layers {
        let naming = layer.naming.unwrap_or(rules.default_naming);

        for field in &layer.fields {
            let field = field.clone().with_fallback_naming(naming);

            match fields.iter().position(|f| f.name() == field.name()) {
                Some(i) => fields[i] = field,
                None => fields.push(field),
            }
        }
    }

    // defaults are checked once here, never per record
    for field in &fields {
        if field.default().is_required() {
            continue;
        }

        let value = field.resolve_default();
        field
            .validate(&value)
            .map_err(|source| SchemaDefinitionError::InvalidDefault {
                schema: def.id.clone(),
                field: field.name().to_string(),
                source,
            })?;
    }

    let hash_fields: Vec<usize> = fields
        .iter()
        .enumerate()
        .filter(|(_, f)| f.is_hashable())
        .map(|(i, _)| i)
        .collect();

    let identity = if hash_fields.is_empty() {
        (0..fields.len()).collect()
    } else {
        hash_fields.clone()
    };

    Ok(SchemaModel {
        id: def.id.clone(),
        description: def.description.clone(),
        heritage: heritage.to_vec(),
        fields,
        hash_fields,
        identity,
    })
}
