//! Individual rewrites, checked through the default optimizer

use crate::fixtures::{PARTNER, USERS, catalog, cond, entity, optimize, optimize_on, search, set};
use chrono::NaiveDate;
use domain_syntax::{Condition, ConditionValue, Domain, NaryKind, OptLevel, Operator, SubQuery, ValueSet};
use model::core::{field_type::FieldType, value::Value};
use planner::{
    MergeRule, MergeScope, Optimizer, OptimizerConfig, PassContext, PassRegistry, PlannerError,
    optimizer::passes::assertion::assert_sql_ready,
};
use tracing_test::traced_test;

fn ts(day: u32, hour: u32) -> Value {
    Value::Timestamp(
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap(),
    )
}

#[test]
fn test_legacy_operators() {
    let catalog = catalog();

    let optimized = optimize(&catalog, cond("name", "==", "Acme"), OptLevel::Basic).unwrap();
    assert_eq!(optimized.domain(), &cond("name", "in", set(["Acme"])));

    let optimized = optimize(&catalog, cond("name", "=?", false), OptLevel::Basic).unwrap();
    assert_eq!(optimized.domain(), &Domain::TRUE);

    let optimized = optimize(&catalog, cond("color", "=?", 4), OptLevel::Basic).unwrap();
    assert_eq!(optimized.domain(), &cond("color", "in", set([4])));
}

#[test]
fn test_scalar_membership_and_subdomain_membership() {
    let catalog = catalog();

    let optimized = optimize(&catalog, cond("name", "in", "Acme"), OptLevel::Basic).unwrap();
    assert_eq!(optimized.domain(), &cond("name", "in", set(["Acme"])));

    let optimized = optimize(&catalog, cond("name", "not in", ValueSet::new()), OptLevel::Basic).unwrap();
    assert_eq!(optimized.domain(), &Domain::TRUE);

    let domain = cond("country_id", "in", cond("code", "=", "BE"));
    let optimized = optimize(&catalog, domain, OptLevel::Basic).unwrap();
    assert_eq!(
        optimized.domain(),
        &cond("country_id", "any", cond("code", "in", set(["BE"])))
    );
}

#[test]
fn test_pattern_values() {
    let catalog = catalog();

    let optimized = optimize(&catalog, cond("name", "=like", ""), OptLevel::Basic).unwrap();
    assert_eq!(optimized.domain(), &cond("name", "in", set([Value::Null])));

    let optimized = optimize(&catalog, cond("name", "ilike", false), OptLevel::Basic).unwrap();
    assert_eq!(optimized.domain(), &Domain::TRUE);

    let optimized = optimize(&catalog, cond("name", "not like", ""), OptLevel::Basic).unwrap();
    assert_eq!(optimized.domain(), &Domain::FALSE);

    let err = optimize(&catalog, cond("name", "like", 5), OptLevel::Basic).unwrap_err();
    assert!(matches!(err, PlannerError::TypeMismatch { .. }), "{err}");
}

#[test]
fn test_relational_label_search() {
    let catalog = catalog();

    let domain = cond("country_id", "in", vec![Value::Int(2), Value::from("Belgium")]);
    let optimized = optimize(&catalog, domain, OptLevel::Basic).unwrap();
    assert_eq!(
        optimized.domain(),
        &Domain::or([
            cond("country_id", "in", set([2])),
            cond("country_id", "any", cond("name", "in", set(["Belgium"]))),
        ])
    );

    let optimized = optimize(&catalog, cond("country_id", "not ilike", "bel"), OptLevel::Basic).unwrap();
    assert_eq!(
        optimized.domain(),
        &cond("country_id", "not any", cond("name", "ilike", "bel"))
    );
}

#[test]
fn test_x2many_membership() {
    let catalog = catalog();

    let domain = cond("category_ids", "in", vec![Value::Int(1), Value::Null]);
    let optimized = optimize(&catalog, domain, OptLevel::Basic).unwrap();
    assert_eq!(
        optimized.domain(),
        &Domain::or([
            cond("category_ids", "any", cond("id", "in", set([1]))),
            cond("category_ids", "not any", Domain::TRUE),
        ])
    );
}

#[test]
fn test_traversal_with_constant_subdomain() {
    let catalog = catalog();

    let optimized = optimize(&catalog, cond("country_id", "any", Domain::TRUE), OptLevel::Basic).unwrap();
    assert_eq!(optimized.domain(), &cond("country_id", "not in", set([Value::Null])));

    let optimized = optimize(&catalog, cond("country_id", "not any", Domain::TRUE), OptLevel::Basic).unwrap();
    assert_eq!(optimized.domain(), &cond("country_id", "in", set([Value::Null])));

    let domain = cond("child_ids", "any", cond("name", "in", ValueSet::new()));
    let optimized = optimize(&catalog, domain, OptLevel::Basic).unwrap();
    assert_eq!(optimized.domain(), &Domain::FALSE);

    let domain = cond("child_ids", "not any", Domain::FALSE);
    let optimized = optimize(&catalog, domain, OptLevel::Basic).unwrap();
    assert_eq!(optimized.domain(), &Domain::TRUE);

    let err = optimize(&catalog, cond("country_id", "any", 3), OptLevel::Basic).unwrap_err();
    assert!(matches!(err, PlannerError::TypeMismatch { .. }), "{err}");
}

#[test]
fn test_opaque_query_is_kept() {
    let catalog = catalog();
    let query = SubQuery::new("SELECT id FROM res_country WHERE code = %s", vec![Value::from("BE")]);

    let optimized = optimize(&catalog, cond("country_id", "in", query.clone()), OptLevel::ToSql).unwrap();
    assert_eq!(optimized.domain(), &cond("country_id", "any", query));
}

#[test]
fn test_boolean_values() {
    let catalog = catalog();

    let optimized = optimize(&catalog, cond("active", "=", false), OptLevel::Basic).unwrap();
    assert_eq!(optimized.domain(), &cond("active", "not in", set([true])));

    let optimized = optimize(&catalog, cond("active", "in", vec!["1", "0"]), OptLevel::Basic).unwrap();
    assert_eq!(optimized.domain(), &cond("active", "in", set([true, false])));

    let optimized = optimize(&catalog, cond("active", "in", vec![true, false]), OptLevel::SearchAndAccess).unwrap();
    assert_eq!(optimized.domain(), &Domain::TRUE);

    let err = optimize(&catalog, cond("active", "=", "maybe"), OptLevel::Basic).unwrap_err();
    assert!(matches!(err, PlannerError::TypeMismatch { .. }), "{err}");
}

#[test]
fn test_date_values() {
    let catalog = catalog();
    let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

    let optimized = optimize(&catalog, cond("birthday", "<=", "2024-03-01"), OptLevel::Basic).unwrap();
    assert_eq!(optimized.domain(), &cond("birthday", "<=", Value::Date(day)));

    let optimized = optimize(&catalog, cond("birthday", ">", Value::Null), OptLevel::Basic).unwrap();
    assert_eq!(optimized.domain(), &Domain::FALSE);

    let err = optimize(&catalog, cond("birthday", "=", "someday"), OptLevel::Basic).unwrap_err();
    assert!(matches!(err, PlannerError::TypeMismatch { .. }), "{err}");
}

#[test]
fn test_datetime_day_bounds() {
    let catalog = catalog();

    let optimized = optimize(&catalog, cond("create_date", "<=", "2024-03-01"), OptLevel::Basic).unwrap();
    assert_eq!(optimized.domain(), &cond("create_date", "<", ts(2, 0)));

    let optimized = optimize(&catalog, cond("create_date", ">", "2024-03-01"), OptLevel::Basic).unwrap();
    assert_eq!(optimized.domain(), &cond("create_date", ">=", ts(2, 0)));

    let optimized = optimize(&catalog, cond("create_date", ">", "2024-03-01 10:00:00"), OptLevel::Basic).unwrap();
    assert_eq!(optimized.domain(), &cond("create_date", ">", ts(1, 10)));

    let optimized = optimize(&catalog, cond("create_date", "=", "2024-03-01"), OptLevel::Basic).unwrap();
    assert_eq!(
        optimized.domain(),
        &Domain::and([cond("create_date", "<", ts(2, 0)), cond("create_date", ">=", ts(1, 0))])
    );
}

// Scenario: `!=` against a whole day on a column no partner has set.
// Expected Outcome: the interval is negated and NULL rows are kept, as for
// any other negative membership.
#[test]
fn test_datetime_day_negation_keeps_unset() {
    let catalog = catalog();

    let optimized = optimize(&catalog, cond("create_date", "!=", "2024-03-01"), OptLevel::Basic).unwrap();
    let children = optimized.domain().children();
    assert_eq!(children.len(), 3, "{}", optimized.domain());
    assert!(children.contains(&cond("create_date", "in", set([Value::Null]))));
    assert!(children.contains(&cond("create_date", "<", ts(1, 0))));
    assert!(children.contains(&cond("create_date", ">=", ts(2, 0))));
    assert_eq!(search(&catalog, PARTNER, optimized.into_domain()), vec![1, 2, 3, 4, 7, 8]);

    let optimized = optimize(&catalog, cond("create_date", "!=", "2024-03-01 10:00:00"), OptLevel::Basic).unwrap();
    assert_eq!(search(&catalog, PARTNER, optimized.into_domain()), vec![1, 2, 3, 4, 7, 8]);

    // with null excluded explicitly, unset rows stay out
    let domain = cond("create_date", "not in", vec![Value::from("2024-03-01"), Value::Null]);
    let optimized = optimize(&catalog, domain, OptLevel::Basic).unwrap();
    assert!(search(&catalog, PARTNER, optimized.into_domain()).is_empty());
}

#[test]
fn test_numeric_strings() {
    let catalog = catalog();

    let optimized = optimize(&catalog, cond("color", "=", "3"), OptLevel::Basic).unwrap();
    assert_eq!(optimized.domain(), &cond("color", "in", set([3])));

    let optimized = optimize(&catalog, cond("credit_limit", ">", "10.5"), OptLevel::Basic).unwrap();
    assert_eq!(optimized.domain(), &cond("credit_limit", ">", Value::Float(10.5)));

    let err = optimize(&catalog, cond("color", "<", "lots"), OptLevel::Basic).unwrap_err();
    assert!(matches!(err, PlannerError::TypeMismatch { .. }), "{err}");
}

#[test]
fn test_field_resolution_errors() {
    let catalog = catalog();

    let err = optimize(&catalog, cond("nickname", "=", "x"), OptLevel::Basic).unwrap_err();
    assert!(
        matches!(err, PlannerError::UnknownField { ref field, .. } if field == "nickname"),
        "{err}"
    );

    let err = optimize(&catalog, cond("name.first", "=", "x"), OptLevel::Basic).unwrap_err();
    assert!(matches!(err, PlannerError::InvalidCondition { .. }), "{err}");

    let err = optimize(&catalog, cond("country_id.nope", "=", "x"), OptLevel::Basic).unwrap_err();
    assert!(
        matches!(err, PlannerError::UnknownField { ref entity, .. } if entity == "res.country"),
        "{err}"
    );
}

#[test]
fn test_json_path_is_kept() {
    let catalog = catalog();
    let optimized = optimize(&catalog, cond("props.color", "=", "red"), OptLevel::ToSql).unwrap();
    assert_eq!(optimized.domain(), &cond("props.color", "in", set(["red"])));
}

#[test]
fn test_computed_field_uses_search_hook() {
    let catalog = catalog();

    let optimized = optimize(&catalog, cond("display_name", "ilike", "acme"), OptLevel::Basic).unwrap();
    assert_eq!(optimized.domain(), &cond("display_name", "ilike", "acme"));

    let optimized = optimize(&catalog, cond("display_name", "ilike", "acme"), OptLevel::SearchAndAccess).unwrap();
    assert_eq!(optimized.domain(), &cond("name", "ilike", "acme"));
}

#[test]
fn test_delegated_field_goes_through_link() {
    let catalog = catalog();
    let optimized = optimize_on(&catalog, USERS, cond("name", "=", "Bob"), OptLevel::SearchAndAccess).unwrap();
    assert_eq!(
        optimized.domain(),
        &cond("partner_id", "any", cond("name", "in", set(["Bob"])))
    );
}

#[test]
fn test_search_evaluates_optimized_domain() {
    let catalog = catalog();
    let search = |domain| crate::fixtures::search(&catalog, PARTNER, domain);

    assert_eq!(search(cond("active", "=", false)), vec![4, 8]);
    assert_eq!(search(cond("parent_id.name", "=", "Acme")), vec![2, 7]);
    assert_eq!(search(cond("child_ids.name", "ilike", "sales")), vec![1]);
    assert_eq!(search(cond("country_id", "=", Value::Null)), vec![4, 8]);
    assert_eq!(search(cond("country_id", "!=", "Belgium")), vec![3, 4, 7, 8]);
    assert_eq!(search(cond("display_name", "=like", "Gamma%")), vec![7, 8]);
    assert_eq!(search(cond("email", "not ilike", "acme")), vec![2, 3, 4, 7, 8]);
}

#[test]
fn test_iteration_cap() {
    let catalog = catalog();
    let optimizer = Optimizer::with_config(
        PassRegistry::default(),
        OptimizerConfig::default().with_max_iterations(1),
    );

    let err = optimizer
        .optimize(cond("name", "==", "x"), entity(&catalog, PARTNER), &catalog, OptLevel::Basic)
        .unwrap_err();
    assert!(matches!(err, PlannerError::OptimizationDiverged(1)), "{err}");
}

// Scenario: an OR of 1100 equality conditions on one field.
// Expected Outcome: every leaf is rewritten once and merged into a single
// set, well within the per-node rewrite cap.
#[test]
fn test_large_domain_stays_under_cap() {
    let catalog = catalog();
    let domain = Domain::or((0..1100).map(|i| cond("color", "=", i)));

    let optimized = optimize(&catalog, domain, OptLevel::Basic).unwrap();
    let Domain::Condition(merged) = optimized.domain() else {
        panic!("expected one condition, got {}", optimized.domain());
    };
    assert_eq!(merged.operator, Operator::In);
    let ConditionValue::Set(values) = &merged.value else {
        panic!("expected a set, got {}", merged.value.kind());
    };
    assert_eq!(values.len(), 1100);
    assert!(values.contains(&Value::Int(1099)));
}

fn reverse_children(
    _kind: NaryKind,
    mut children: Vec<Domain>,
    _ctx: &PassContext<'_>,
) -> Result<Vec<Domain>, PlannerError> {
    children.reverse();
    Ok(children)
}

// Scenario: a registered merge pass reorders children without merging any.
// Expected Outcome: the node settles after one extra round instead of
// cycling until the rewrite cap.
#[traced_test]
#[test]
fn test_merge_without_shrinking_settles() {
    let catalog = catalog();
    let mut registry = PassRegistry::default();
    registry.register_merge(MergeRule {
        name: "reverse_children",
        level: OptLevel::Basic,
        scope: MergeScope::Children,
        pass: reverse_children,
    });
    let optimizer = Optimizer::new(registry);
    let domain = cond("color", "=", 1) | cond("name", "=", "x");

    let optimized = optimizer
        .optimize(domain.clone(), entity(&catalog, PARTNER), &catalog, OptLevel::Basic)
        .unwrap();
    let expected = optimize(&catalog, domain, OptLevel::Basic).unwrap();
    assert_eq!(optimized.domain(), expected.domain());
    assert!(logs_contain("without shrinking it"));
}

#[test]
fn test_sql_assertion_rejects_leftovers() {
    let catalog = catalog();
    let mut registry = PassRegistry::empty();
    registry.register_generic(OptLevel::ToSql, "assert_sql_ready", assert_sql_ready);
    let optimizer = Optimizer::new(registry);
    let partner = entity(&catalog, PARTNER);

    let err = optimizer
        .optimize(cond("name", "==", "x"), partner, &catalog, OptLevel::ToSql)
        .unwrap_err();
    assert!(matches!(err, PlannerError::InvalidCondition { .. }), "{err}");

    let err = optimizer
        .optimize(cond("name", "in", "x"), partner, &catalog, OptLevel::ToSql)
        .unwrap_err();
    assert!(matches!(err, PlannerError::TypeMismatch { .. }), "{err}");

    let err = optimizer
        .optimize(cond("color", "any", Domain::TRUE), partner, &catalog, OptLevel::ToSql)
        .unwrap_err();
    assert!(matches!(err, PlannerError::InvalidCondition { .. }), "{err}");

    let err = optimizer
        .optimize(cond("commercial_name", "in", vec!["x"]), partner, &catalog, OptLevel::ToSql)
        .unwrap_err();
    assert!(matches!(err, PlannerError::InvalidCondition { .. }), "{err}");
}

fn upper_state(condition: &Condition, _ctx: &PassContext<'_>) -> Result<Option<Domain>, PlannerError> {
    let Some(set) = condition.value.as_set() else {
        return Ok(None);
    };
    let upper = set
        .iter()
        .map(|v| match v.as_str() {
            Some(s) => Value::from(s.to_uppercase()),
            None => v.clone(),
        })
        .collect::<ValueSet>();
    if &upper == set {
        return Ok(None);
    }
    Ok(Some(Domain::Condition(condition.with_value(upper))))
}

#[test]
fn test_registry_accepts_custom_passes() {
    let catalog = catalog();
    let mut registry = PassRegistry::default();
    registry.register_types(OptLevel::Basic, &[FieldType::Selection], "upper_state", upper_state);
    let optimizer = Optimizer::new(registry);

    let optimized = optimizer
        .optimize(cond("state", "=", "draft"), entity(&catalog, PARTNER), &catalog, OptLevel::Basic)
        .unwrap();
    assert_eq!(optimized.domain(), &cond("state", "in", set(["DRAFT"])));

    let names: Vec<&str> = optimizer
        .registry()
        .condition_passes(OptLevel::Basic, Operator::In, Some(FieldType::Selection))
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names.last(), Some(&"upper_state"));
}
