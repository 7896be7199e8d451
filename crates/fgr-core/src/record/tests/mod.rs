
use super::*;
use crate::{
    error::SchemaDefinitionError,
    field::FieldDescriptor,
    naming::NamingConvention,
    obs::{LogEntry, LogLevel, MemorySink},
    schema::SchemaDef,
    value::{TypeSpec, ValueType},
};
use fgr_config::FgrConfig;
use serde_json::json;
use std::sync::atomic::{AtomicI64, Ordering};

static TICKETS: AtomicI64 = AtomicI64::new(0);

fn next_ticket() -> Value {
    Value::Int(TICKETS.fetch_add(1, Ordering::SeqCst))
}

fn empty_tags() -> Value {
    Value::List(Vec::new())
}

fn field(name: &str, ty: impl Into<TypeSpec>) -> FieldDescriptor {
    FieldDescriptor::new(name, ty).describe(format!("{name} field"))
}

fn id(s: &str) -> SchemaId {
    SchemaId::new(s)
}

fn user_registry() -> SchemaRegistry {
    let registry = SchemaRegistry::new();

    registry
        .register(
            SchemaDef::new("user")
                .field(field("id", TypeSpec::int()).hashable().immutable())
                .field(field("display_name", TypeSpec::text()).naming(NamingConvention::Camel))
                .field(field("role", TypeSpec::text()).enumeration(["admin", "member"]).default_value("member"))
                .field(field("tags", TypeSpec::list_of(TypeSpec::text())).default_with(empty_tags))
                .field(field("avatar", TypeSpec::bytes()).nullable())
                .field(field("score", TypeSpec::float()).default_value(0.0)),
        )
        .unwrap();

    registry
}

fn user(registry: &SchemaRegistry, user_id: i64, name: &str) -> Record {
    registry
        .construct(&id("user"), [("id", Value::Int(user_id)), ("display_name", name.into())])
        .unwrap()
}

//
// Construction
//

#[test]
fn omitted_fields_take_their_defaults() {
    let registry = user_registry();
    let record = user(&registry, 1, "Ada");

    assert_eq!(record.get("role"), Some(&Value::from("member")));
    assert_eq!(record.get("tags"), Some(&Value::List(Vec::new())));
    assert_eq!(record.get("avatar"), Some(&Value::Null));
    assert_eq!(record.get("missing"), None);
}

#[test]
fn fields_iterate_in_aggregated_order() {
    let registry = user_registry();
    let record = user(&registry, 1, "Ada");

    let names: Vec<_> = record.fields().map(|(name, _)| name).collect();
    assert_eq!(names, ["id", "display_name", "role", "tags", "avatar", "score"]);
}

#[test]
fn type_violation_yields_no_record() {
    let registry = user_registry();
    let model = registry.model(&id("user")).unwrap();

    let err = Record::construct(&model, [("id", Value::from("one")), ("display_name", "x".into())])
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::TypeMismatch {
            field: "id".into(),
            expected: TypeSpec::int(),
            received: Value::from("one"),
        }
    );
}

#[test]
fn missing_required_field_is_rejected() {
    let registry = user_registry();
    let model = registry.model(&id("user")).unwrap();

    let err = Record::construct(&model, [("id", 1)]).unwrap_err();
    assert_eq!(err.field(), "display_name");
}

#[test]
fn unknown_keys_are_rejected_before_validation() {
    let registry = user_registry();
    let model = registry.model(&id("user")).unwrap();

    let err = Record::construct(&model, [("id", Value::from("bad")), ("nickname", "x".into())])
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::UnknownField {
            schema: id("user"),
            field: "nickname".into()
        }
    );
}

#[test]
fn factory_defaults_run_per_instance() {
    let registry = SchemaRegistry::new();
    registry
        .register(
            SchemaDef::new("ticket")
                .field(field("serial", TypeSpec::int()).default_with(next_ticket))
                .field(field("tags", TypeSpec::list_of(TypeSpec::text())).default_with(empty_tags)),
        )
        .unwrap();

    let mut a = registry.construct(&id("ticket"), Vec::<(String, Value)>::new()).unwrap();
    let b = registry.construct(&id("ticket"), Vec::<(String, Value)>::new()).unwrap();

    assert_ne!(a.get("serial"), b.get("serial"));

    a.set("tags", Value::list(["x"])).unwrap();
    assert_eq!(b.get("tags"), Some(&Value::List(Vec::new())));
}

//
// Mutation
//

#[test]
fn set_revalidates_and_applies() {
    let registry = user_registry();
    let mut record = user(&registry, 1, "Ada");

    record.set("role", "admin").unwrap();
    assert_eq!(record.get("role"), Some(&Value::from("admin")));
}

#[test]
fn rejected_set_leaves_record_unchanged() {
    let registry = user_registry();
    let mut record = user(&registry, 1, "Ada");
    let before = record.to_primitive();

    assert!(matches!(
        record.set("role", "owner"),
        Err(ValidationError::EnumerationViolation { .. })
    ));
    assert!(matches!(
        record.set("id", 2),
        Err(ValidationError::ImmutableField { .. })
    ));
    assert!(matches!(
        record.set("nope", 2),
        Err(ValidationError::UnknownField { .. })
    ));
    assert_eq!(record.to_primitive(), before);
}

//
// Identity
//

#[test]
fn equality_uses_hash_fields() {
    let registry = user_registry();

    let a = user(&registry, 7, "Ada");
    let b = user(&registry, 7, "Grace");
    let c = user(&registry, 8, "Ada");

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_ne!(a.fingerprint(), c.fingerprint());
}

#[test]
fn equality_without_hash_fields_uses_every_field() {
    let registry = SchemaRegistry::new();
    registry
        .register(SchemaDef::new("point").field(field("x", TypeSpec::int())).field(field("y", TypeSpec::int())))
        .unwrap();
    registry
        .register(SchemaDef::new("other").field(field("x", TypeSpec::int())).field(field("y", TypeSpec::int())))
        .unwrap();

    let p = |schema: &str, x: i64, y: i64| {
        registry.construct(&id(schema), [("x", x), ("y", y)]).unwrap()
    };

    assert_eq!(p("point", 1, 2), p("point", 1, 2));
    assert_ne!(p("point", 1, 2), p("point", 1, 3));
    assert_ne!(p("point", 1, 2), p("other", 1, 2), "schema id is part of identity");
}

//
// Primitive conversion
//

#[test]
fn to_primitive_renders_keys_and_bytes() {
    let registry = user_registry();
    let mut record = user(&registry, 1, "Ada");
    record.set("avatar", Value::bytes(vec![1_u8, 2])).unwrap();
    record.set("score", 0.25).unwrap();

    assert_eq!(
        serde_json::Value::Object(record.to_primitive()),
        json!({
            "id": 1,
            "displayName": "Ada",
            "role": "member",
            "tags": [],
            "avatar": [1, 2],
            "score": 0.25,
        })
    );
}

#[test]
fn non_finite_floats_are_rejected() {
    let registry = user_registry();
    let mut record = user(&registry, 1, "Ada");

    for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        assert!(matches!(
            record.set("score", bad),
            Err(ValidationError::TypeMismatch { ref field, .. }) if field == "score"
        ));
    }
    assert_eq!(record.get("score"), Some(&Value::Float(0.0)));
}

#[test]
fn serialize_matches_to_primitive() {
    let registry = user_registry();
    let record = user(&registry, 3, "Lin");

    assert_eq!(
        serde_json::to_value(&record).unwrap(),
        serde_json::Value::Object(record.to_primitive())
    );
}

#[test]
fn primitive_round_trip() {
    let registry = user_registry();
    let mut record = user(&registry, 5, "Ada");
    record.set("tags", Value::list(["a", "b"])).unwrap();
    record.set("avatar", Value::bytes(vec![0_u8, 255])).unwrap();
    record.set("score", 2.5).unwrap();

    let decoded = registry
        .from_primitive(&id("user"), &record.to_primitive())
        .unwrap();

    assert_eq!(decoded, record);
    assert_eq!(decoded.to_primitive(), record.to_primitive());
}

#[test]
fn from_primitive_normalizes_keys() {
    let registry = user_registry();

    let map = json!({ "id": 1, "display_name": "snake", "Role": "admin" });
    let record = registry
        .from_primitive(&id("user"), map.as_object().unwrap())
        .unwrap();

    assert_eq!(record.get("display_name"), Some(&Value::from("snake")));
    assert_eq!(record.get("role"), Some(&Value::from("admin")));
}

#[test]
fn from_primitive_rejects_undecodable_values() {
    let registry = user_registry();

    let map = json!({ "id": 1.5, "displayName": "x" });
    let err = registry
        .from_primitive(&id("user"), map.as_object().unwrap())
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Validation(ValidationError::Decode { ref field, .. }) if field == "id"
    ));
}

#[test]
fn from_primitive_rejects_unknown_keys() {
    let registry = user_registry();

    let map = json!({ "id": 1, "displayName": "x", "extra": true });
    let err = registry
        .from_primitive(&id("user"), map.as_object().unwrap())
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Validation(ValidationError::UnknownField { .. })
    ));
}

#[test]
fn union_members_decode_in_declared_order() {
    let registry = SchemaRegistry::new();
    registry
        .register(
            SchemaDef::new("reading")
                .field(field("value", TypeSpec::int().or(ValueType::Float).or(ValueType::Text))),
        )
        .unwrap();

    let decode = |raw: serde_json::Value| {
        let map = json!({ "value": raw });
        registry
            .from_primitive(&id("reading"), map.as_object().unwrap())
            .unwrap()
            .get("value")
            .cloned()
            .unwrap()
    };

    assert_eq!(decode(json!(3)), Value::Int(3));
    assert_eq!(decode(json!(3.5)), Value::Float(3.5));
    assert_eq!(decode(json!("3")), Value::from("3"));
}

#[test]
fn nested_records_decode_through_the_registry() {
    let registry = user_registry();
    registry
        .register(
            SchemaDef::new("team")
                .field(field("lead", TypeSpec::record("user")))
                .field(field("members", TypeSpec::list_of(TypeSpec::record("user"))).default_with(empty_tags)),
        )
        .unwrap();

    let lead = user(&registry, 1, "Ada");
    let team = registry
        .construct(
            &id("team"),
            [
                ("lead", Value::from(lead.clone())),
                ("members", Value::list([lead.clone(), user(&registry, 2, "Lin")])),
            ],
        )
        .unwrap();

    let primitive = team.to_primitive();
    assert_eq!(primitive["lead"]["$schema"], json!("user"));

    let decoded = registry.from_primitive(&id("team"), &primitive).unwrap();
    assert_eq!(decoded.get("lead").and_then(Value::as_record), Some(&lead));
    assert_eq!(decoded.to_primitive(), primitive);

    let broken = json!({ "lead": { "id": "x", "displayName": "y" } });
    let err = registry
        .from_primitive(&id("team"), broken.as_object().unwrap())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::Decode { ref field, .. }) if field == "id"
    ));
}

#[test]
fn construction_failures_are_logged_at_debug() {
    let sink = Arc::new(MemorySink::new());
    let mut config = FgrConfig::default();
    config.log.level = LogLevel::Debug;
    let registry = SchemaRegistry::with_config(&config, sink.clone());
    registry
        .register(SchemaDef::new("s").field(field("n", TypeSpec::int())))
        .unwrap();
    sink.clear();

    registry.construct(&id("s"), [("n", "x")]).unwrap_err();

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].target, "fgr::record");
    let LogEntry::Mapping(entry) = &events[0].entry else {
        panic!("expected a mapping entry");
    };
    assert_eq!(entry.get("event"), Some(&Value::from("construct_failed")));
}

fn heritage_registry() -> SchemaRegistry {
    let registry = SchemaRegistry::new();
    registry
        .register(SchemaDef::new("base").field(field("x", TypeSpec::int())))
        .unwrap();
    registry
        .register(SchemaDef::new("same").extends("base"))
        .unwrap();
    registry
        .register(
            SchemaDef::new("child")
                .extends("base")
                .field(field("y", TypeSpec::text())),
        )
        .unwrap();
    registry
        .register(SchemaDef::new("holder").field(field("item", TypeSpec::record("base"))))
        .unwrap();

    registry
}

#[test]
fn descendant_records_decode_as_their_own_schema() {
    let registry = heritage_registry();

    for (schema, values) in [
        ("child", vec![("x", Value::Int(1)), ("y", Value::from("extra"))]),
        ("same", vec![("x", Value::Int(2))]),
        ("base", vec![("x", Value::Int(3))]),
    ] {
        let item = registry.construct(&id(schema), values).unwrap();
        let holder = registry
            .construct(&id("holder"), [("item", Value::from(item))])
            .unwrap();

        let back = registry
            .from_primitive(&id("holder"), &holder.to_primitive())
            .unwrap();
        let nested = back.get("item").and_then(Value::as_record).unwrap();

        assert_eq!(nested.schema(), &id(schema));
        assert_eq!(back, holder);
        assert_eq!(back.to_primitive(), holder.to_primitive());
    }
}

#[test]
fn schema_tag_must_name_a_descendant() {
    let registry = heritage_registry();
    registry
        .register(SchemaDef::new("stranger").field(field("x", TypeSpec::int())))
        .unwrap();

    let foreign = json!({ "item": { "$schema": "stranger", "x": 1 } });
    let err = registry
        .from_primitive(&id("holder"), foreign.as_object().unwrap())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::Decode { ref field, .. }) if field == "item"
    ));

    let missing = json!({ "item": { "$schema": "ghost", "x": 1 } });
    let err = registry
        .from_primitive(&id("holder"), missing.as_object().unwrap())
        .unwrap_err();
    assert!(matches!(err, Error::Schema(SchemaDefinitionError::UnknownSchema { .. })));

    let untagged = json!({ "item": { "x": 4 } });
    let record = registry
        .from_primitive(&id("holder"), untagged.as_object().unwrap())
        .unwrap();
    let nested = record.get("item").and_then(Value::as_record).unwrap();
    assert_eq!(nested.schema(), &id("base"));
}

#[test]
fn any_fields_refuse_values_they_cannot_restore() {
    let registry = SchemaRegistry::new();
    registry
        .register(SchemaDef::new("blob").field(field("data", TypeSpec::any())))
        .unwrap();
    let model = registry.model(&id("blob")).unwrap();

    let err = Record::construct(&model, [("data", Value::bytes(vec![1_u8, 2]))]).unwrap_err();
    assert!(matches!(err, ValidationError::TypeMismatch { .. }));

    let nested = Value::map([("k", Value::list([Value::Float(0.5), Value::Null]))]);
    let record = Record::construct(&model, [("data", nested)]).unwrap();
    let back = registry
        .from_primitive(&id("blob"), &record.to_primitive())
        .unwrap();
    assert_eq!(back.to_primitive(), record.to_primitive());
    assert_eq!(back.get("data"), record.get("data"));
}

#[test]
fn duplicate_keys_are_rejected() {
    let registry = user_registry();
    let model = registry.model(&id("user")).unwrap();

    let err = Record::construct(
        &model,
        [
            ("id", Value::Int(1)),
            ("display_name", "a".into()),
            ("id", Value::Int(2)),
        ],
    )
    .unwrap_err();
    assert_eq!(
        err,
        ValidationError::DuplicateKey {
            field: "id".into(),
            key: "id".into()
        }
    );

    let map = json!({ "id": 1, "displayName": "camel", "display_name": "snake" });
    let err = registry
        .from_primitive(&id("user"), map.as_object().unwrap())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::DuplicateKey { ref field, .. }) if field == "display_name"
    ));
}
