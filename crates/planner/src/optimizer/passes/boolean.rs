use crate::{error::PlannerError, optimizer::context::PassContext};
use domain_syntax::{Condition, ConditionValue, Domain, Operator, ValueSet};
use model::core::value::Value;

/// Coerces membership values on boolean fields to real booleans.
///
/// Null counts as false, and since a boolean column may hold null,
/// `in [false]` is rewritten to `not in [true]`.
pub fn normalize_boolean(
    condition: &Condition,
    _ctx: &PassContext<'_>,
) -> Result<Option<Domain>, PlannerError> {
    let (Operator::In | Operator::NotIn, ConditionValue::Set(set)) =
        (condition.operator, &condition.value)
    else {
        return Ok(None);
    };

    let coerced = set
        .iter()
        .map(|v| {
            if v.is_null() {
                return Ok(Value::Boolean(false));
            }
            v.as_bool().map(Value::Boolean).ok_or_else(|| {
                PlannerError::type_mismatch(condition, format!("{v} is not a boolean"))
            })
        })
        .collect::<Result<ValueSet, _>>()?;

    if coerced == ValueSet::singleton(Value::Boolean(false)) {
        let operator = if condition.operator == Operator::In {
            Operator::NotIn
        } else {
            Operator::In
        };
        return Ok(Some(Domain::Condition(condition.with_parts(
            condition.field_expr.clone(),
            operator,
            ValueSet::singleton(Value::Boolean(true)),
        ))));
    }

    if &coerced == set {
        return Ok(None);
    }
    Ok(Some(Domain::Condition(condition.with_value(coerced))))
}

/// A set holding both booleans makes the condition constant.
///
/// Only done from the search level on: before that, the condition still
/// tells whether the field is set.
pub fn collapse_boolean(
    condition: &Condition,
    _ctx: &PassContext<'_>,
) -> Result<Option<Domain>, PlannerError> {
    let (Operator::In | Operator::NotIn, ConditionValue::Set(set)) =
        (condition.operator, &condition.value)
    else {
        return Ok(None);
    };

    if set.contains(&Value::Boolean(true)) && set.contains(&Value::Boolean(false)) {
        return Ok(Some(Domain::Constant(condition.operator == Operator::In)));
    }
    Ok(None)
}
