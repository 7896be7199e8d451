
use crate::{
    field::FieldDescriptor,
    query::{
        CompareOp, Condition, Predicate, PredicateVisitor, Query, QueryError, SortDirection,
    },
    schema::{SchemaDef, SchemaId, SchemaModel, SchemaRegistry},
    value::{TypeSpec, Value},
};
use serde_json::json;
use std::sync::Arc;

fn field(name: &str, ty: TypeSpec) -> FieldDescriptor {
    FieldDescriptor::new(name, ty).describe(format!("{name} field"))
}

fn article() -> (SchemaRegistry, Arc<SchemaModel>) {
    let registry = SchemaRegistry::new();
    let model = registry
        .register(
            SchemaDef::new("article")
                .field(field("title", TypeSpec::text()))
                .field(field("views", TypeSpec::int()))
                .field(field("tags", TypeSpec::list_of(TypeSpec::text()))),
        )
        .unwrap();

    (registry, model)
}

///
/// Counter
/// Visitor that tallies leaves and combinators.
///

#[derive(Default)]
struct Counter {
    leaves: Vec<String>,
    entered: usize,
    left: usize,
}

impl PredicateVisitor for Counter {
    fn condition(&mut self, condition: &Condition) {
        self.leaves.push(condition.field.clone());
    }

    fn enter(&mut self, _: &Predicate) {
        self.entered += 1;
    }

    fn leave(&mut self, _: &Predicate) {
        self.left += 1;
    }
}

//
// Tree construction
//

#[test]
fn chained_and_builds_a_binary_tree() {
    let a = Predicate::eq("a", 1);
    let b = Predicate::eq("b", 2);
    let c = Predicate::eq("c", 3);

    let tree = a.clone() & b.clone() & c.clone();
    assert_eq!(tree, Predicate::and(Predicate::and(a, b), c));

    let mut counter = Counter::default();
    tree.walk(&mut counter);
    assert_eq!(counter.leaves, ["a", "b", "c"]);
    assert_eq!(counter.entered, 2);
    assert_eq!(counter.left, 2);
}

#[test]
fn not_wraps_without_distributing() {
    let inner = Predicate::eq("a", 1) | Predicate::eq("b", 2);
    let negated = !inner.clone();

    assert_eq!(negated, Predicate::Not(Box::new(inner)));
    assert_eq!(negated.conditions().len(), 2);
}

#[test]
fn borrowed_operators_clone_their_operands() {
    let a = Predicate::gt("a", 1);
    let b = Predicate::lt("b", 2);

    assert_eq!(&a & &b, Predicate::and(a.clone(), b.clone()));
    assert_eq!(&a | &b, Predicate::or(a.clone(), b.clone()));
    assert_eq!(!&a, Predicate::not(a));
}

#[test]
fn conditions_do_not_check_operand_types() {
    let (registry, _) = article();
    let views = registry.field_ref(&SchemaId::new("article"), "views").unwrap();

    let predicate = views.contains("1");
    let [condition] = predicate.conditions()[..] else {
        panic!("expected one condition");
    };
    assert_eq!(condition.op, CompareOp::Contains);
    assert_eq!(condition.value, Value::from("1"));
}

//
// Bridge
//

#[test]
fn field_ref_builds_every_operator() {
    let (_, model) = article();
    let views = model.field_ref("views").unwrap();

    let ops: Vec<_> = [
        views.eq(1),
        views.ne(1),
        views.lt(1),
        views.le(1),
        views.gt(1),
        views.ge(1),
        views.contains(1),
        views.similar(1),
    ]
    .iter()
    .map(|p| p.conditions()[0].op)
    .collect();

    assert_eq!(
        ops,
        [
            CompareOp::Eq,
            CompareOp::Ne,
            CompareOp::Lt,
            CompareOp::Le,
            CompareOp::Gt,
            CompareOp::Ge,
            CompareOp::Contains,
            CompareOp::Similar,
        ]
    );
}

#[test]
fn rem_operator_builds_similar_conditions() {
    let (_, model) = article();
    let title = model.field_ref("title").unwrap();

    assert_eq!(&title % ("x", 0.8), Predicate::similar("title", "x", Some(0.8)));
    assert_eq!(&title % "x", Predicate::similar("title", "x", None));
    assert_eq!(title.similar_with("x", 0.5), Predicate::similar("title", "x", Some(0.5)));
}

#[test]
fn shl_operator_builds_contains() {
    let (_, model) = article();
    let tags = model.field_ref("tags").unwrap();

    assert_eq!(&tags << "rust", Predicate::contains("tags", "rust"));
    assert_eq!(tags << "rust", Predicate::contains("tags", "rust"));
}

#[test]
fn similar_value_checks_operand_shape() {
    let (_, model) = article();
    let title = model.field_ref("title").unwrap();

    assert_eq!(
        title.similar_value(Value::from("x")).unwrap(),
        Predicate::similar("title", "x", None)
    );
    assert_eq!(
        title
            .similar_value(Value::List(vec![Value::from("x"), Value::Float(0.7)]))
            .unwrap(),
        Predicate::similar("title", "x", Some(0.7))
    );
    assert_eq!(
        title
            .similar_value(Value::List(vec![Value::from("x"), Value::Int(1)]))
            .unwrap(),
        Predicate::similar("title", "x", Some(1.0))
    );

    let rejected = [
        Value::List(vec![Value::from("x")]),
        Value::List(vec![Value::from("x"), Value::Float(0.1), Value::Float(0.2)]),
        Value::List(vec![Value::from("x"), Value::from("high")]),
        Value::List(vec![Value::list(["x"]), Value::Float(0.5)]),
        Value::map([("x", 1)]),
    ];
    for operand in rejected {
        assert!(
            matches!(
                title.similar_value(operand.clone()),
                Err(QueryError::InvalidOperand { .. })
            ),
            "{operand} should be rejected"
        );
    }
}

#[test]
fn model_field_ref_rejects_undeclared_names() {
    let (_, model) = article();

    assert!(matches!(
        model.field_ref("body"),
        Err(QueryError::UnknownField { .. })
    ));
}

//
// Query
//

#[test]
fn limit_must_be_non_negative() {
    assert_eq!(
        Query::new().with_limit(-1).unwrap_err(),
        QueryError::InvalidLimit { limit: -1 }
    );

    let query = Query::new().with_limit(0).unwrap();
    assert_eq!(query.limit(), Some(0));
}

#[test]
fn sorting_appends_and_keeps_duplicates() {
    let query = Query::new()
        .with_sort("views", SortDirection::Desc)
        .with_sort("title", SortDirection::Asc)
        .with_sort("views", SortDirection::Asc);

    let fields: Vec<_> = query.sorting().iter().map(|s| s.field.as_str()).collect();
    assert_eq!(fields, ["views", "title", "views"]);
    assert_eq!(query.sorting()[0].direction, SortDirection::Desc);
}

#[test]
fn filter_ands_successive_predicates() {
    let query = Query::new()
        .filter(Predicate::eq("a", 1))
        .filter(Predicate::eq("b", 2));

    assert_eq!(
        query.predicate(),
        Some(&Predicate::and(Predicate::eq("a", 1), Predicate::eq("b", 2)))
    );
}

#[test]
fn combined_queries_start_without_sorting_or_limit() {
    let left = Query::from(Predicate::eq("a", 1))
        .with_sort("a", SortDirection::Asc)
        .with_limit(5)
        .unwrap();
    let right = Query::from(Predicate::eq("b", 2))
        .with_sort("b", SortDirection::Desc)
        .with_limit(9)
        .unwrap();

    let both = left.clone() & right.clone();
    assert_eq!(
        both.predicate(),
        Some(&Predicate::and(Predicate::eq("a", 1), Predicate::eq("b", 2)))
    );
    assert_eq!(both.limit(), None);
    assert!(both.sorting().is_empty());

    let either = right | left.clone();
    assert_eq!(either.limit(), None);
    assert!(either.sorting().is_empty());

    let negated = !left;
    assert_eq!(negated.limit(), None);
    assert!(negated.sorting().is_empty());
}

#[test]
fn combining_with_an_empty_query_keeps_the_other_predicate() {
    let only = Query::from(Predicate::eq("a", 1));

    assert_eq!(Query::new().and(only.clone()).predicate(), only.predicate());
    assert_eq!(only.clone().or(Query::new()).predicate(), only.predicate());
    assert_eq!((!Query::new()).predicate(), None);
    assert_eq!(
        (!only).predicate(),
        Some(&Predicate::not(Predicate::eq("a", 1)))
    );
}

#[test]
fn validate_checks_condition_and_sort_fields() {
    let (_, model) = article();

    let ok = Query::from(Predicate::eq("title", 1) | !Predicate::contains("tags", "x"))
        .with_sort("views", SortDirection::Asc);
    assert!(ok.validate(&model).is_ok());

    let bad_filter = Query::from(Predicate::eq("body", "x"));
    let bad_sort = Query::new().with_sort("rank", SortDirection::Asc);

    for (query, field) in [(bad_filter, "body"), (bad_sort, "rank")] {
        assert_eq!(
            query.validate(&model).unwrap_err(),
            QueryError::UnknownField {
                schema: SchemaId::new("article"),
                field: field.into()
            }
        );
    }
}

#[test]
fn fingerprint_covers_sorting_and_limit() {
    let base = Query::from(Predicate::eq("a", 1));
    let sorted = base.clone().with_sort("a", SortDirection::Asc);
    let limited = base.clone().with_limit(1).unwrap();
    let thresholded = Query::from(Predicate::similar("a", 1, Some(0.5)));
    let bare = Query::from(Predicate::similar("a", 1, None));

    assert_eq!(base.fingerprint(), base.clone().fingerprint());
    assert_ne!(base.fingerprint(), sorted.fingerprint());
    assert_ne!(base.fingerprint(), limited.fingerprint());
    assert_ne!(thresholded.fingerprint(), bare.fingerprint());
}

#[test]
fn queries_serialize_as_tagged_trees() {
    let query = Query::from(Predicate::eq("a", 1) & !Predicate::similar("b", "x", Some(0.5)))
        .with_sort("a", SortDirection::Desc);

    assert_eq!(
        serde_json::to_value(&query).unwrap(),
        json!({
            "predicate": {
                "and": [
                    { "condition": { "field": "a", "op": "eq", "value": 1 } },
                    { "not": { "condition": {
                        "field": "b", "op": "similar", "value": "x", "threshold": 0.5
                    } } }
                ]
            },
            "sorting": [{ "field": "a", "direction": "desc" }],
            "limit": null,
        })
    );
}
