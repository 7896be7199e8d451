use crate::{
    Error,
    error::SchemaDefinitionError,
    obs::{LogEntry, LogSink, Logger, NoopSink},
    query::{FieldRef, QueryError},
    record::Record,
    schema::{
        SchemaDef, SchemaId, SchemaModel,
        aggregate::{self, DefinitionRules},
    },
    value::Value,
};
use fgr_config::FgrConfig;
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

const TARGET: &str = "fgr::schema";

///
/// Entry
/// One registered definition, its heritage, and the lazily cached model.
///

#[derive(Debug)]
struct Entry {
    def: SchemaDef,
    heritage: Vec<SchemaId>,
    model: OnceLock<Arc<SchemaModel>>,
    init: Mutex<()>,
}

impl Entry {
    fn new(def: SchemaDef, heritage: Vec<SchemaId>) -> Self {
        Self {
            def,
            heritage,
            model: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    fn cached(def: SchemaDef, heritage: Vec<SchemaId>, model: Arc<SchemaModel>) -> Self {
        let entry = Self::new(def, heritage);
        entry.model.set(model).ok();

        entry
    }
}

type Entries = BTreeMap<SchemaId, Arc<Entry>>;

///
/// SchemaRegistry
///
/// Owns every schema definition and caches one aggregated model per id.
/// Registries are independent of each other; nothing here is global.
///

#[derive(Debug)]
pub struct SchemaRegistry {
    rules: DefinitionRules,
    log: Logger,
    entries: RwLock<Entries>,
}

impl SchemaRegistry {
    /// Registry with default configuration and no log output.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&FgrConfig::default(), Arc::new(NoopSink))
    }

    #[must_use]
    pub fn with_config(config: &FgrConfig, sink: Arc<dyn LogSink>) -> Self {
        let rules = DefinitionRules {
            default_naming: config.schema.default_naming.into(),
            require_descriptions: config.schema.require_descriptions,
            extra_reserved: config.schema.extra_reserved.iter().cloned().collect(),
        };

        Self {
            rules,
            log: Logger::new(sink, config.log.level),
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Register a new schema and return its aggregated model.
    ///
    /// Registering an identical definition again leaves the entry alone and
    /// returns its model, aggregating it first if a redefinition upstream
    /// dropped the cached one.
    pub fn register(&self, def: SchemaDef) -> Result<Arc<SchemaModel>, SchemaDefinitionError> {
        let id = def.id.clone();
        let result = self.install(def, false);
        self.report(&id, "register", &result);

        result
    }

    /// Replace a schema's definition, dropping the cached models of the
    /// schema and every registered descendant.
    ///
    /// Descendants are re-aggregated lazily on their next `model` call.
    pub fn redefine(&self, def: SchemaDef) -> Result<Arc<SchemaModel>, SchemaDefinitionError> {
        let id = def.id.clone();
        let result = self.install(def, true);
        self.report(&id, "redefine", &result);

        result
    }

    /// Aggregated model for `id`, computed at most once per definition.
    pub fn model(&self, id: &SchemaId) -> Result<Arc<SchemaModel>, SchemaDefinitionError> {
        let entries = self.read();
        let entry = entries
            .get(id)
            .ok_or_else(|| SchemaDefinitionError::UnknownSchema { schema: id.clone() })?;

        if let Some(model) = entry.model.get() {
            return Ok(Arc::clone(model));
        }

        let _guard = entry.init.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(model) = entry.model.get() {
            return Ok(Arc::clone(model));
        }

        let ancestors = ancestor_defs(&entries, &entry.heritage);
        let model = aggregate::aggregate(&entry.def, &entry.heritage, &ancestors, &self.rules)
            .inspect_err(|err| self.warn(id, "aggregate", err))?;
        let model = Arc::new(model);
        entry.model.set(Arc::clone(&model)).ok();

        self.log.debug(
            TARGET,
            LogEntry::mapping([
                ("event", Value::from("aggregated")),
                ("schema", Value::from(id.as_str())),
                ("fields", Value::from(model.fields().len())),
            ]),
        );

        Ok(model)
    }

    /// Whether a definition is registered under `id`.
    #[must_use]
    pub fn contains(&self, id: &SchemaId) -> bool {
        self.read().contains_key(id)
    }

    /// Registered ids in sorted order.
    #[must_use]
    pub fn ids(&self) -> Vec<SchemaId> {
        self.read().keys().cloned().collect()
    }

    pub fn field_ref(&self, id: &SchemaId, name: &str) -> Result<FieldRef, QueryError> {
        let model = self
            .model(id)
            .map_err(|_| QueryError::UnknownSchema { schema: id.clone() })?;

        model.field_ref(name)
    }

    /// Construct a record of schema `id` from named values.
    pub fn construct<K, V>(
        &self,
        id: &SchemaId,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Record, Error>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let model = self.model(id)?;

        Record::construct(&model, values)
            .map_err(Error::from)
            .inspect_err(|err| self.construction_failed(id, err))
    }

    /// Decode a record of schema `id` from its primitive mapping.
    pub fn from_primitive(
        &self,
        id: &SchemaId,
        map: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Record, Error> {
        Record::from_primitive(self, id, map).inspect_err(|err| self.construction_failed(id, err))
    }

    // install
    // shared path for register and redefine; runs under the write lock so
    // definition checks see a consistent snapshot
    fn install(
        &self,
        def: SchemaDef,
        replace: bool,
    ) -> Result<Arc<SchemaModel>, SchemaDefinitionError> {
        validate_schema_id(&def.id)?;

        let mut entries = self.write();

        if !replace && let Some(existing) = entries.get(&def.id) {
            if existing.def != def {
                return Err(SchemaDefinitionError::DuplicateSchema {
                    schema: def.id.clone(),
                });
            }

            // identical definition: hand back the model, aggregating it if a
            // redefinition upstream dropped the cached one
            drop(entries);
            return self.model(&def.id);
        }

        aggregate::check_definition(&def, &self.rules, |id| entries.contains_key(id))?;
        let heritage = aggregate::heritage(&def, |id| {
            entries.get(id).map(|entry| entry.heritage.as_slice())
        })?;

        let model = {
            let ancestors = ancestor_defs(&entries, &heritage);
            Arc::new(aggregate::aggregate(
                &def,
                &heritage,
                &ancestors,
                &self.rules,
            )?)
        };

        let id = def.id.clone();
        let replaced = entries.contains_key(&id);
        let mut next = entries.clone();
        next.insert(
            id.clone(),
            Arc::new(Entry::cached(def, heritage, Arc::clone(&model))),
        );

        let invalidated = if replaced {
            invalidate_descendants(&mut next, &id)?
        } else {
            0
        };

        *entries = next;
        drop(entries);

        self.log.debug(
            TARGET,
            LogEntry::mapping([
                ("event", Value::from(if replaced { "redefined" } else { "registered" })),
                ("schema", Value::from(id.as_str())),
                ("fields", Value::from(model.fields().len())),
                ("invalidated", Value::from(invalidated)),
            ]),
        );

        Ok(model)
    }

    fn report(
        &self,
        id: &SchemaId,
        operation: &str,
        result: &Result<Arc<SchemaModel>, SchemaDefinitionError>,
    ) {
        if let Err(err) = result {
            self.warn(id, operation, err);
        }
    }

    fn warn(&self, id: &SchemaId, operation: &str, err: &SchemaDefinitionError) {
        self.log.warn(
            TARGET,
            LogEntry::mapping([
                ("event", Value::from("rejected")),
                ("operation", Value::from(operation)),
                ("schema", Value::from(id.as_str())),
                ("error", Value::from(err.to_string())),
            ]),
        );
    }

    fn construction_failed(&self, id: &SchemaId, err: &Error) {
        self.log.debug(
            "fgr::record",
            LogEntry::mapping([
                ("event", Value::from("construct_failed")),
                ("schema", Value::from(id.as_str())),
                ("error", Value::from(err.to_string())),
            ]),
        );
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ancestor_defs
// borrow each heritage member's definition out of the entry table
fn ancestor_defs<'a>(
    entries: &'a Entries,
    heritage: &'a [SchemaId],
) -> BTreeMap<&'a SchemaId, &'a SchemaDef> {
    heritage
        .iter()
        .filter_map(|id| entries.get(id).map(|entry| (id, &entry.def)))
        .collect()
}

// invalidate_descendants
// every schema whose heritage mentions `id` gets a fresh entry; the closest
// descendants are rebuilt first so deeper ones see their new heritage
fn invalidate_descendants(
    entries: &mut Entries,
    id: &SchemaId,
) -> Result<usize, SchemaDefinitionError> {
    let mut descendants: Vec<(SchemaId, usize)> = entries
        .iter()
        .filter(|(_, entry)| entry.heritage.contains(id))
        .map(|(child, entry)| (child.clone(), entry.heritage.len()))
        .collect();
    descendants.sort_by_key(|(_, depth)| *depth);
    let count = descendants.len();

    for (child, _) in descendants {
        let Some(old) = entries.get(&child).cloned() else {
            continue;
        };

        let heritage = aggregate::heritage(&old.def, |parent| {
            entries.get(parent).map(|entry| entry.heritage.as_slice())
        })?;

        entries.insert(child, Arc::new(Entry::new(old.def.clone(), heritage)));
    }

    Ok(count)
}

fn validate_schema_id(id: &SchemaId) -> Result<(), SchemaDefinitionError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '-'));

    if valid {
        Ok(())
    } else {
        Err(SchemaDefinitionError::InvalidSchemaId {
            schema: id.to_string(),
        })
    }
}
