//! Operator and value-shape normalization.

use crate::{error::PlannerError, optimizer::context::PassContext};
use domain_syntax::{Condition, ConditionValue, Domain, Operator, ValueSet};
use tracing::{debug, warn};

/// `==` and `<>` become `=` and `!=`; `=?` is `=` unless the value is unset.
pub fn legacy_operator(
    condition: &Condition,
    _ctx: &PassContext<'_>,
) -> Result<Option<Domain>, PlannerError> {
    let operator = match condition.operator {
        Operator::DoubleEqual => Operator::Equal,
        Operator::LessGreater => Operator::NotEqual,
        Operator::EqualIfSet if condition.value.is_falsy() => return Ok(Some(Domain::TRUE)),
        Operator::EqualIfSet => Operator::Equal,
        _ => return Ok(None),
    };

    debug!(
        "Operator '{}' is deprecated, use '{}' in {}",
        condition.operator, operator, condition
    );
    Ok(Some(Domain::Condition(condition.with_operator(operator))))
}

/// `=`/`!=` are expressed as `in`/`not in`.
pub fn equality_to_membership(
    condition: &Condition,
    _ctx: &PassContext<'_>,
) -> Result<Option<Domain>, PlannerError> {
    let operator = if condition.operator == Operator::Equal {
        Operator::In
    } else {
        Operator::NotIn
    };

    let value = match &condition.value {
        ConditionValue::Scalar(v) => ConditionValue::Set(ValueSet::singleton(v.clone())),
        other => {
            warn!(
                "The domain condition {} should use the '{}' operator",
                condition, operator
            );
            other.clone()
        }
    };

    Ok(Some(Domain::Condition(condition.with_parts(
        condition.field_expr.clone(),
        operator,
        value,
    ))))
}

/// Gives `in`/`not in` a set value; sub-domains and queries turn them into
/// `any`/`not any`; empty sets fold to a constant.
pub fn membership_value(
    condition: &Condition,
    _ctx: &PassContext<'_>,
) -> Result<Option<Domain>, PlannerError> {
    let positive = condition.operator == Operator::In;

    match &condition.value {
        ConditionValue::Set(set) if set.is_empty() => Ok(Some(Domain::Constant(!positive))),
        ConditionValue::Set(_) => Ok(None),
        ConditionValue::Scalar(v) => {
            debug!("The domain condition {} should have a list value", condition);
            Ok(Some(Domain::Condition(
                condition.with_value(ValueSet::singleton(v.clone())),
            )))
        }
        ConditionValue::SubDomain(_) | ConditionValue::Query(_) => {
            let operator = if positive {
                Operator::Any
            } else {
                Operator::NotAny
            };
            Ok(Some(Domain::Condition(condition.with_operator(operator))))
        }
    }
}
