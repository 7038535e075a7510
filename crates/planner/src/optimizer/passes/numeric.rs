use crate::{error::PlannerError, optimizer::context::PassContext};
use domain_syntax::{Condition, ConditionValue, Domain, Operator};
use model::core::{field_type::FieldType, value::Value};

/// Numeric fields accept numbers given as strings; `false` means unset.
pub fn coerce_numeric(
    condition: &Condition,
    ctx: &PassContext<'_>,
) -> Result<Option<Domain>, PlannerError> {
    if condition.is_dotted()
        || !(condition.operator.is_ordering()
            || matches!(condition.operator, Operator::In | Operator::NotIn))
    {
        return Ok(None);
    }

    let integer = ctx.field(condition)?.field_type == FieldType::Integer;
    let coerce = |v: &Value| -> Result<Value, PlannerError> {
        match v {
            Value::Null | Value::Int(_) | Value::Float(_) => Ok(v.clone()),
            Value::Boolean(false) => Ok(Value::Null),
            Value::String(raw) => {
                let raw = raw.trim();
                let parsed = if integer {
                    raw.parse::<i64>().map(Value::Int).ok()
                } else {
                    None
                };
                parsed
                    .or_else(|| raw.parse::<f64>().ok().map(Value::Float))
                    .ok_or_else(|| {
                        PlannerError::type_mismatch(condition, format!("'{raw}' is not a number"))
                    })
            }
            other => Err(PlannerError::type_mismatch(
                condition,
                format!("{other} is not a number"),
            )),
        }
    };

    let coerced = match &condition.value {
        ConditionValue::Scalar(Value::Null) if condition.operator.is_ordering() => {
            return Ok(Some(Domain::FALSE));
        }
        ConditionValue::Scalar(v) => ConditionValue::Scalar(coerce(v)?),
        ConditionValue::Set(set) => {
            ConditionValue::Set(set.iter().map(coerce).collect::<Result<_, _>>()?)
        }
        _ => return Ok(None),
    };

    if coerced == condition.value {
        return Ok(None);
    }
    Ok(Some(Domain::Condition(condition.with_value(coerced))))
}
