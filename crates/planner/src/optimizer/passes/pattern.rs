use crate::{error::PlannerError, optimizer::context::PassContext};
use domain_syntax::{Condition, ConditionValue, Domain, Operator, ValueSet};
use model::core::value::Value;

/// Pattern operators need a string. An empty pattern matches everything,
/// except for `=like`/`=ilike` where it means "not set".
pub fn validate_pattern(
    condition: &Condition,
    _ctx: &PassContext<'_>,
) -> Result<Option<Domain>, PlannerError> {
    match &condition.value {
        ConditionValue::Scalar(v) if v.is_falsy() => Ok(Some(match condition.operator {
            Operator::EqLike | Operator::EqILike => Domain::Condition(condition.with_parts(
                condition.field_expr.clone(),
                Operator::In,
                ValueSet::singleton(Value::Null),
            )),
            Operator::NotLike | Operator::NotILike => Domain::FALSE,
            _ => Domain::TRUE,
        })),
        ConditionValue::Scalar(Value::String(_)) => Ok(None),
        other => Err(PlannerError::type_mismatch(
            condition,
            format!(
                "operator '{}' expects a string, got {} {}",
                condition.operator,
                other.kind(),
                other
            ),
        )),
    }
}
