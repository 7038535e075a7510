//! Hand-written cases for the algebra laws

use domain_syntax::{Domain, NaryKind, Operator};

fn cond(field: &str, op: &str, value: i64) -> Domain {
    Domain::condition(field, op, value).unwrap()
}

#[test]
fn test_and_or_nesting_preserved() {
    let (a, b, c) = (cond("a", "=", 1), cond("b", "=", 2), cond("c", "=", 3));
    let domain = a.clone() & (b.clone() | c.clone());

    assert_eq!(domain.nary_kind(), Some(NaryKind::And));
    assert_eq!(domain.children()[0], a);
    assert_eq!(domain.children()[1], b | c);
}

#[test]
fn test_every_standard_inverse_round_trips() {
    for op in Operator::STANDARD {
        if let Some(inverse) = op.inverse() {
            assert_eq!(inverse.inverse(), Some(op), "Inverse of {op} is not symmetric");
        }
    }
}

#[test]
fn test_negated_any_becomes_not_any() {
    let sub = cond("name", "=", 1);
    let any = Domain::condition("partner_id", "any", sub.clone()).unwrap();
    let expected = Domain::condition("partner_id", "not any", sub).unwrap();

    assert_eq!(!any, expected);
}

#[test]
fn test_constants_collapse_through_negation() {
    assert_eq!(!Domain::TRUE, Domain::FALSE);
    assert_eq!(!(cond("a", "=", 1) & Domain::FALSE), Domain::TRUE);
}

#[test]
fn test_display_is_prefix_notation() {
    let domain = cond("a", "=", 1) | cond("b", "<", 2);
    assert_eq!(domain.to_string(), "['|', ('a', '=', 1), ('b', '<', 2)]");
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_domain_types_are_send_sync() {
    assert_send_sync::<Domain>();
    assert_send_sync::<domain_syntax::Condition>();
    assert_send_sync::<domain_syntax::ConditionValue>();
    assert_send_sync::<domain_syntax::OptMark>();
}
