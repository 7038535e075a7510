//! Property tests over randomly built domains

use domain_syntax::{Domain, Operator, from_flat, parse_json, to_json};
use proptest::prelude::*;

const FIELDS: [&str; 4] = ["a", "b", "c", "partner_id.name"];

fn arb_field() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(FIELDS[0].to_string()),
        Just(FIELDS[1].to_string()),
        Just(FIELDS[2].to_string()),
        Just(FIELDS[3].to_string()),
    ]
}

fn arb_operator() -> impl Strategy<Value = Operator> {
    prop_oneof![
        Just(Operator::Equal),
        Just(Operator::NotEqual),
        Just(Operator::LessThan),
        Just(Operator::GreaterOrEqual),
        Just(Operator::Like),
        Just(Operator::EqualIfSet),
    ]
}

fn arb_leaf() -> impl Strategy<Value = Domain> {
    prop_oneof![
        1 => Just(Domain::TRUE),
        1 => Just(Domain::FALSE),
        8 => (arb_field(), arb_operator(), -5i64..5).prop_map(|(field, op, value)| {
            Domain::condition(field, op.as_str(), value).unwrap()
        }),
        2 => (arb_field(), prop::collection::vec(-3i64..3, 0..4)).prop_map(|(field, values)| {
            Domain::condition(field, "in", values).unwrap()
        }),
    ]
}

fn arb_domain() -> impl Strategy<Value = Domain> {
    arb_leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Domain::and),
            prop::collection::vec(inner.clone(), 0..4).prop_map(Domain::or),
            inner.prop_map(|d| !d),
        ]
    })
}

fn has_constant_child(domain: &Domain) -> bool {
    domain
        .children()
        .iter()
        .any(|c| c.is_true() || c.is_false() || has_constant_child(c))
}

proptest! {
    #[test]
    fn double_negation(domain in arb_domain()) {
        prop_assert_eq!(!!domain.clone(), domain);
    }

    #[test]
    fn de_morgan(a in arb_domain(), b in arb_domain()) {
        prop_assert_eq!(!(a.clone() & b.clone()), !a.clone() | !b.clone());
        prop_assert_eq!(!(a.clone() | b.clone()), !a & !b);
    }

    #[test]
    fn identity_and_absorption(domain in arb_domain()) {
        prop_assert_eq!(domain.clone() & Domain::TRUE, domain.clone());
        prop_assert_eq!(domain.clone() | Domain::FALSE, domain.clone());
        prop_assert_eq!(domain.clone() & Domain::FALSE, Domain::FALSE);
        prop_assert_eq!(domain | Domain::TRUE, Domain::TRUE);
    }

    #[test]
    fn no_constants_below_nary_nodes(domain in arb_domain()) {
        prop_assert!(!has_constant_child(&domain));
    }

    #[test]
    fn flat_round_trip(domain in arb_domain()) {
        let parsed = from_flat(&domain.to_flat());
        prop_assert!(parsed.is_ok(), "Failed to parse: {:?}", parsed.err());
        prop_assert_eq!(parsed.unwrap(), domain);
    }

    #[test]
    fn json_round_trip(domain in arb_domain()) {
        let parsed = parse_json(&to_json(&domain));
        prop_assert!(parsed.is_ok(), "Failed to parse: {:?}", parsed.err());
        prop_assert_eq!(parsed.unwrap(), domain);
    }
}
