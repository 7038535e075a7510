//! `child_of` / `parent_of` resolution

use crate::fixtures::{CATEGORY, PARTNER, catalog, cond, optimize, optimize_on, search, set};
use domain_syntax::{Domain, OptLevel};
use model::core::value::Value;
use planner::{Postgres, to_sql};

#[test]
fn test_child_of_walks_parent_field() {
    let catalog = catalog();
    let domain = cond("category_ids", "child_of", "Retail");

    let optimized = optimize(&catalog, domain, OptLevel::SearchAndAccess).unwrap();
    assert_eq!(
        optimized.domain(),
        &cond("category_ids", "any", cond("id", "in", set([1, 2, 4])))
    );
    assert_eq!(search(&catalog, PARTNER, optimized.into_domain()), vec![1, 2, 7]);
}

#[test]
fn test_parent_of_reads_materialized_path() {
    let catalog = catalog();

    let optimized = optimize(&catalog, cond("id", "parent_of", 3), OptLevel::SearchAndAccess).unwrap();
    assert_eq!(optimized.domain(), &cond("id", "in", set([1, 2, 3])));
}

#[test]
fn test_parent_of_walks_parent_field() {
    let catalog = catalog();
    let domain = cond("category_ids", "parent_of", vec![4]);

    let optimized = optimize(&catalog, domain, OptLevel::SearchAndAccess).unwrap();
    assert_eq!(
        optimized.domain(),
        &cond("category_ids", "any", cond("id", "in", set([4, 2, 1])))
    );
}

#[test]
fn test_unknown_label_matches_nothing() {
    let catalog = catalog();
    let domain = cond("category_ids", "child_of", "Wholesale");

    let optimized = optimize(&catalog, domain, OptLevel::SearchAndAccess).unwrap();
    assert_eq!(optimized.domain(), &Domain::FALSE);
}

// Scenario: categories 5 and 6 are each other's parent.
// Expected Outcome: the walk stops once every record was seen.
#[test]
fn test_cycle_terminates() {
    let catalog = catalog();

    let optimized = optimize(&catalog, cond("category_ids", "child_of", 5), OptLevel::SearchAndAccess).unwrap();
    assert_eq!(
        optimized.domain(),
        &cond("category_ids", "any", cond("id", "in", set([5, 6])))
    );

    let optimized = optimize(&catalog, cond("category_ids", "parent_of", 6), OptLevel::SearchAndAccess).unwrap();
    assert_eq!(
        optimized.domain(),
        &cond("category_ids", "any", cond("id", "in", set([6, 5])))
    );
}

#[test]
fn test_hierarchy_is_left_alone_at_basic_level() {
    let catalog = catalog();
    let domain = cond("id", "child_of", 1);

    let optimized = optimize(&catalog, domain.clone(), OptLevel::Basic).unwrap();
    assert_eq!(optimized.domain(), &domain);
}

#[test]
fn test_child_of_lowers_to_prefix_match() {
    let catalog = catalog();

    let optimized = optimize(&catalog, cond("id", "child_of", 1), OptLevel::ToSql).unwrap();
    assert_eq!(optimized.domain(), &cond("parent_path", "=like", "1/%"));

    let (sql, params) = to_sql(&optimized, &catalog, &Postgres, None).unwrap();
    assert_eq!(sql, r#""res_partner"."parent_path" LIKE $1"#);
    assert_eq!(params, vec![Value::from("1/%")]);
    assert_eq!(search(&catalog, PARTNER, optimized.into_domain()), vec![1, 2, 3, 7, 8]);
}

// Scenario: `parent_id` points back to the partner entity itself.
// Expected Outcome: the subtree is resolved on the partners, seed included,
// instead of matching records whose parent lies in the subtree.
#[test]
fn test_child_of_on_recursive_parent_field() {
    let catalog = catalog();

    let optimized = optimize(&catalog, cond("parent_id", "child_of", 1), OptLevel::SearchAndAccess).unwrap();
    assert_eq!(optimized.domain(), &cond("parent_path", "=like", "1/%"));
    assert_eq!(search(&catalog, PARTNER, optimized.into_domain()), vec![1, 2, 3, 7, 8]);

    let optimized = optimize(&catalog, cond("parent_id", "parent_of", 3), OptLevel::SearchAndAccess).unwrap();
    assert_eq!(optimized.domain(), &cond("id", "in", set([1, 2, 3])));
}

// Scenario: categories keep no materialized path.
// Expected Outcome: the walk follows `parent_id` and yields ids directly.
#[test]
fn test_child_of_on_recursive_field_without_path() {
    let catalog = catalog();

    let optimized =
        optimize_on(&catalog, CATEGORY, cond("parent_id", "child_of", 1), OptLevel::SearchAndAccess).unwrap();
    assert_eq!(optimized.domain(), &cond("id", "in", set([1, 2, 4])));
    assert_eq!(search(&catalog, CATEGORY, optimized.into_domain()), vec![1, 2, 4]);
}
