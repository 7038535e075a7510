//! Built-in optimization passes.

use crate::optimizer::registry::{MergeRule, MergeScope, PassRegistry};
use domain_syntax::{OptLevel, Operator};
use model::core::field_type::FieldType;

pub mod assertion;
pub mod binary;
pub mod boolean;
pub mod fields;
pub mod hierarchy;
pub mod merge;
pub mod numeric;
pub mod operators;
pub mod pattern;
pub mod relational;
pub mod temporal;

const PATTERN_OPERATORS: [Operator; 6] = [
    Operator::Like,
    Operator::NotLike,
    Operator::ILike,
    Operator::NotILike,
    Operator::EqLike,
    Operator::EqILike,
];

const MEMBERSHIP_OPERATORS: [Operator; 2] = [Operator::In, Operator::NotIn];

pub(crate) fn register_builtin(registry: &mut PassRegistry) {
    use OptLevel::*;

    registry
        .register_generic(Basic, "resolve_field", fields::resolve_field)
        .register_operators(
            Basic,
            &[Operator::DoubleEqual, Operator::LessGreater, Operator::EqualIfSet],
            "legacy_operator",
            operators::legacy_operator,
        )
        .register_operators(
            Basic,
            &[Operator::Equal, Operator::NotEqual],
            "equality_to_membership",
            operators::equality_to_membership,
        )
        .register_operators(
            Basic,
            &MEMBERSHIP_OPERATORS,
            "membership_value",
            operators::membership_value,
        )
        .register_operators(
            Basic,
            &PATTERN_OPERATORS,
            "validate_pattern",
            pattern::validate_pattern,
        )
        .register_operators(
            Basic,
            &[MEMBERSHIP_OPERATORS.as_slice(), PATTERN_OPERATORS.as_slice()].concat(),
            "search_by_label",
            relational::search_by_label,
        )
        .register_operators(
            Basic,
            &[Operator::Any, Operator::NotAny],
            "traverse_relation",
            relational::traverse_relation,
        )
        .register_types(
            Basic,
            &[FieldType::One2many, FieldType::Many2many],
            "x2many_membership",
            relational::x2many_membership,
        )
        .register_types(
            Basic,
            &[FieldType::Boolean],
            "normalize_boolean",
            boolean::normalize_boolean,
        )
        .register_types(
            Basic,
            &[FieldType::Date],
            "normalize_date",
            temporal::normalize_date,
        )
        .register_types(
            Basic,
            &[FieldType::Datetime],
            "normalize_datetime",
            temporal::normalize_datetime,
        )
        .register_types(
            Basic,
            &[FieldType::Integer, FieldType::Float, FieldType::Monetary],
            "coerce_numeric",
            numeric::coerce_numeric,
        )
        .register_types(
            Basic,
            &[FieldType::Binary],
            "restrict_attachment",
            binary::restrict_attachment,
        );

    registry
        .register_generic(SearchAndAccess, "delegated_field", fields::delegated_field)
        .register_generic(SearchAndAccess, "non_stored_field", fields::non_stored_field)
        .register_operators(
            SearchAndAccess,
            &[Operator::ChildOf, Operator::ParentOf],
            "resolve_hierarchy",
            hierarchy::resolve_hierarchy,
        )
        .register_types(
            SearchAndAccess,
            &[FieldType::Boolean],
            "collapse_boolean",
            boolean::collapse_boolean,
        );

    registry.register_generic(ToSql, "assert_sql_ready", assertion::assert_sql_ready);

    registry
        .register_merge(MergeRule {
            name: "merge_duplicates",
            level: Basic,
            scope: MergeScope::Children,
            pass: merge::merge_duplicates,
        })
        .register_merge(MergeRule {
            name: "merge_sets",
            level: Basic,
            scope: MergeScope::FieldRun {
                operators: MEMBERSHIP_OPERATORS.to_vec(),
                field_types: None,
            },
            pass: merge::merge_sets,
        })
        .register_merge(MergeRule {
            name: "merge_any",
            level: Basic,
            scope: MergeScope::FieldRun {
                operators: vec![Operator::Any, Operator::NotAny],
                // Integer covers traversals over `id`.
                field_types: Some(vec![
                    FieldType::Integer,
                    FieldType::Many2one,
                    FieldType::One2many,
                    FieldType::Many2many,
                ]),
            },
            pass: merge::merge_any,
        });
}
