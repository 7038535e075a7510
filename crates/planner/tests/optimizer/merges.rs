//! Merging of sibling conditions on the same field

use crate::fixtures::{PARTNER, catalog, cond, optimize, search, set};
use domain_syntax::{Domain, OptLevel};

#[test]
fn test_membership_sets_merge() {
    let catalog = catalog();

    // in & in intersects, not in & not in unites
    let domain = cond("color", "in", vec![1, 2, 3]) & cond("color", "in", vec![2, 3, 4]);
    let optimized = optimize(&catalog, domain, OptLevel::Basic).unwrap();
    assert_eq!(optimized.domain(), &cond("color", "in", set([2, 3])));

    let domain = cond("color", "not in", vec![1]) & cond("color", "!=", 2);
    let optimized = optimize(&catalog, domain, OptLevel::Basic).unwrap();
    assert_eq!(optimized.domain(), &cond("color", "not in", set([1, 2])));

    // mixed polarity under OR keeps what is excluded by every branch
    let domain = cond("color", "not in", vec![1, 2]) | cond("color", "in", vec![2]);
    let optimized = optimize(&catalog, domain, OptLevel::Basic).unwrap();
    assert_eq!(optimized.domain(), &cond("color", "not in", set([1])));
}

#[test]
fn test_disjoint_sets_fold_to_false() {
    let catalog = catalog();
    let domain = cond("color", "=", 1) & cond("color", "=", 2);

    let optimized = optimize(&catalog, domain, OptLevel::Basic).unwrap();
    assert_eq!(optimized.domain(), &Domain::FALSE);
}

#[test]
fn test_duplicates_collapse() {
    let catalog = catalog();
    let a = cond("name", "ilike", "acme");
    let domain = Domain::or([a.clone(), cond("email", "like", "@"), a.clone()]);

    let optimized = optimize(&catalog, domain, OptLevel::Basic).unwrap();
    assert_eq!(
        optimized.domain(),
        &Domain::or([cond("email", "like", "@"), a])
    );
}

#[test]
fn test_any_under_or_merges_for_every_relation() {
    let catalog = catalog();
    let domain = cond("category_ids.name", "=", "Retail") | cond("category_ids.name", "=", "B2B");

    let optimized = optimize(&catalog, domain, OptLevel::Basic).unwrap();
    assert_eq!(
        optimized.domain(),
        &cond("category_ids", "any", cond("name", "in", set(["Retail", "B2B"])))
    );
}

#[test]
fn test_any_under_and_only_merges_single_valued() {
    let catalog = catalog();

    // Two different categories may satisfy each side.
    let domain = cond("category_ids.name", "=", "Retail") & cond("category_ids.name", "=", "B2B");
    let optimized = optimize(&catalog, domain, OptLevel::Basic).unwrap();
    assert_eq!(optimized.domain().children().len(), 2);
    assert_eq!(search(&catalog, PARTNER, optimized.into_domain()), vec![1]);

    let domain = cond("country_id.code", "=", "BE") & cond("country_id.name", "ilike", "bel");
    let optimized = optimize(&catalog, domain, OptLevel::Basic).unwrap();
    assert_eq!(
        optimized.domain(),
        &cond(
            "country_id",
            "any",
            Domain::and([cond("code", "in", set(["BE"])), cond("name", "ilike", "bel")])
        )
    );
}

// Scenario: `not any` siblings, on a many2many and on a many2one, under
// both connectives.
// Expected Outcome: under AND the sub-domains are OR-ed for every relation;
// under OR they are AND-ed, on the many2one only. The merged forms select
// the same records as the conditions taken one by one.
#[test]
fn test_not_any_merge_asymmetry() {
    let catalog = catalog();
    let retail = || cond("category_ids", "not any", cond("name", "=", "Retail"));
    let b2b = || cond("category_ids", "not any", cond("name", "=", "B2B"));

    let both = optimize(&catalog, retail() & b2b(), OptLevel::Basic).unwrap();
    assert_eq!(
        both.domain(),
        &cond("category_ids", "not any", cond("name", "in", set(["Retail", "B2B"])))
    );
    // Partners with neither category: 2 (Online), 3 and 8 (none).
    assert_eq!(search(&catalog, PARTNER, both.into_domain()), vec![2, 3, 8]);

    let either = optimize(&catalog, retail() | b2b(), OptLevel::Basic).unwrap();
    assert_eq!(either.domain().children().len(), 2);
    // Only partner 1 has both categories.
    assert_eq!(
        search(&catalog, PARTNER, either.into_domain()),
        vec![2, 3, 4, 7, 8]
    );

    let belgian = || cond("country_id", "not any", cond("code", "=", "BE"));
    let chilean = || cond("country_id", "not any", cond("name", "=", "Chile"));
    let either = optimize(&catalog, belgian() | chilean(), OptLevel::Basic).unwrap();
    assert_eq!(
        either.domain(),
        &cond(
            "country_id",
            "not any",
            Domain::and([cond("code", "in", set(["BE"])), cond("name", "in", set(["Chile"]))])
        )
    );
    // No country is both, so every partner matches, including those without one.
    assert_eq!(
        search(&catalog, PARTNER, either.into_domain()),
        vec![1, 2, 3, 4, 7, 8]
    );
}
