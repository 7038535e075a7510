//! End-to-end optimization scenarios

use crate::fixtures::{USERS, catalog, cond, optimize, optimize_on, set};
use domain_syntax::{Condition, Domain, FlatTerm, OptLevel, ValueSet, from_flat};
use planner::{Postgres, to_sql};
use model::core::value::Value;
use tracing_test::traced_test;

// Scenario: two implicit-AND equality leaves in flat form.
// Expected Outcome: both become singleton memberships, sorted by field, and
// lower to one conjunction of equalities.
#[test]
fn test_implicit_and_of_equalities() {
    let catalog = catalog();
    let terms = vec![
        FlatTerm::Leaf(Condition::parse("color", "=", 1).unwrap()),
        FlatTerm::Leaf(Condition::parse("name", "=", "Acme").unwrap()),
    ];
    let domain = from_flat(&terms).unwrap();

    let optimized = optimize(&catalog, domain, OptLevel::ToSql).unwrap();
    assert_eq!(
        optimized.domain(),
        &Domain::and([cond("color", "in", set([1])), cond("name", "in", set(["Acme"]))])
    );

    let (sql, params) = to_sql(&optimized, &catalog, &Postgres, None).unwrap();
    assert_eq!(
        sql,
        r#"("res_partner"."color" = $1 AND "res_partner"."name" = $2)"#
    );
    assert_eq!(params, vec![Value::Int(1), Value::from("Acme")]);
}

// Scenario: a negated disjunction of equalities.
// Expected Outcome: De Morgan yields a conjunction of inequalities, which
// the optimizer turns into exclusions.
#[test]
fn test_negated_or_of_equalities() {
    let catalog = catalog();
    let domain = !(cond("color", "=", 1) | cond("name", "=", "Acme"));
    assert_eq!(
        domain,
        Domain::and([cond("color", "!=", 1), cond("name", "!=", "Acme")])
    );

    let optimized = optimize(&catalog, domain, OptLevel::Basic).unwrap();
    assert_eq!(
        optimized.domain(),
        &Domain::and([
            cond("color", "not in", set([1])),
            cond("name", "not in", set(["Acme"]))
        ])
    );
}

// Scenario: two paths through the same many2one.
// Expected Outcome: they merge into a single traversal whose sub-domain is
// the conjunction of both conditions.
#[test]
fn test_paths_through_many2one_merge() {
    let catalog = catalog();
    let domain = cond("country_id.code", "=", "BE") & cond("country_id.name", "=", "Belgium");

    let optimized = optimize(&catalog, domain, OptLevel::Basic).unwrap();
    assert_eq!(
        optimized.domain(),
        &cond(
            "country_id",
            "any",
            Domain::and([cond("code", "in", set(["BE"])), cond("name", "in", set(["Belgium"]))])
        )
    );
}

// Scenario: child_of on a many2one whose comodel keeps materialized paths.
// Expected Outcome: a prefix match on the path of record 7.
#[test]
fn test_child_of_uses_materialized_path() {
    let catalog = catalog();
    let domain = cond("partner_id", "child_of", vec![7]);

    let optimized = optimize_on(&catalog, USERS, domain, OptLevel::SearchAndAccess).unwrap();
    assert_eq!(
        optimized.domain(),
        &cond("partner_id", "any", cond("parent_path", "=like", "1/7/%"))
    );
}

// Scenario: equality against an empty collection.
// Expected Outcome: the compatibility warning is logged and the domain
// can never match.
#[traced_test]
#[test]
fn test_equality_with_empty_collection() {
    let catalog = catalog();
    let domain = cond("state", "=", ValueSet::new());

    let optimized = optimize(&catalog, domain, OptLevel::Basic).unwrap();
    assert_eq!(optimized.domain(), &Domain::FALSE);
    assert!(logs_contain("should use the 'in' operator"));
}

#[test]
fn test_optimization_is_idempotent() {
    let catalog = catalog();
    let domains = vec![
        cond("name", "==", "Acme") | cond("color", "<>", 3),
        cond("country_id.code", "=", "BE") & cond("category_ids", "=", 1),
        !(cond("active", "=", false) & cond("create_date", "<=", "2024-03-01")),
        cond("child_ids.name", "ilike", "bob") | cond("parent_id", "in", vec!["Acme"]),
        cond("display_name", "like", "Ac") & cond("props.color", "=", "red"),
    ];

    for level in OptLevel::ALL {
        for domain in &domains {
            let once = optimize(&catalog, domain.clone(), level).unwrap();
            let again = optimize(&catalog, once.domain().clone(), level).unwrap();
            assert_eq!(once.domain(), again.domain(), "Marked domain changed at {level}");

            // Without marks the passes must reach the same fixed point.
            let reparsed = Domain::parse(once.domain().to_flat()).unwrap();
            let fresh = optimize(&catalog, reparsed, level).unwrap();
            assert_eq!(once.domain(), fresh.domain(), "Re-optimizing {domain} changed at {level}");
        }
    }
}
