//! Date and datetime value normalization.

use crate::{error::PlannerError, optimizer::context::PassContext};
use chrono::{NaiveDate, NaiveDateTime};
use domain_syntax::{Condition, ConditionValue, Domain, Operator, ValueSet};
use model::core::{
    utils::{parse_date, parse_datetime, start_of_day, start_of_next_day},
    value::Value,
};
use tracing::debug;

fn applies(condition: &Condition) -> bool {
    !condition.is_dotted()
        && (condition.operator.is_ordering()
            || matches!(condition.operator, Operator::In | Operator::NotIn))
}

fn coerce_set(
    set: &ValueSet,
    coerce: impl Fn(&Value) -> Result<Value, PlannerError>,
) -> Result<ValueSet, PlannerError> {
    set.iter().map(coerce).collect()
}

/// Ordering against an unset value matches nothing.
fn ordering_null(condition: &Condition) -> Option<Domain> {
    match &condition.value {
        ConditionValue::Scalar(Value::Null) if condition.operator.is_ordering() => {
            debug!("Comparing {} with an unset value", condition);
            Some(Domain::FALSE)
        }
        _ => None,
    }
}

fn to_date(condition: &Condition, value: &Value) -> Result<Value, PlannerError> {
    match value {
        Value::Null | Value::Boolean(false) => Ok(Value::Null),
        Value::Date(_) => Ok(value.clone()),
        Value::Timestamp(ts) => Ok(Value::Date(ts.date())),
        Value::String(raw) => parse_date(raw)
            .or_else(|| parse_datetime(raw).map(|ts| ts.date()))
            .map(Value::Date)
            .ok_or_else(|| {
                PlannerError::type_mismatch(condition, format!("'{raw}' is not a valid date"))
            }),
        other => Err(PlannerError::type_mismatch(
            condition,
            format!("{other} is not a valid date"),
        )),
    }
}

/// Coerces a value for a datetime field. Days given without a time stay
/// dates so that they can be widened into intervals.
fn to_datetime(condition: &Condition, value: &Value) -> Result<Value, PlannerError> {
    match value {
        Value::Null | Value::Boolean(false) => Ok(Value::Null),
        Value::Date(_) | Value::Timestamp(_) => Ok(value.clone()),
        Value::String(raw) => parse_datetime(raw)
            .map(Value::Timestamp)
            .or_else(|| parse_date(raw).map(Value::Date))
            .ok_or_else(|| {
                PlannerError::type_mismatch(condition, format!("'{raw}' is not a valid datetime"))
            }),
        other => Err(PlannerError::type_mismatch(
            condition,
            format!("{other} is not a valid datetime"),
        )),
    }
}

pub fn normalize_date(
    condition: &Condition,
    _ctx: &PassContext<'_>,
) -> Result<Option<Domain>, PlannerError> {
    if !applies(condition) {
        return Ok(None);
    }
    if let Some(domain) = ordering_null(condition) {
        return Ok(Some(domain));
    }

    let coerced = match &condition.value {
        ConditionValue::Scalar(v) => ConditionValue::Scalar(to_date(condition, v)?),
        ConditionValue::Set(set) => ConditionValue::Set(coerce_set(set, |v| to_date(condition, v))?),
        _ => return Ok(None),
    };

    if coerced == condition.value {
        return Ok(None);
    }
    Ok(Some(Domain::Condition(condition.with_value(coerced))))
}

/// Coerces values for datetime fields and turns whole days into
/// half-open intervals: `<= d` is `< d+1`, `> d` is `>= d+1`, and
/// `in [d]` is `>= d & < d+1`.
pub fn normalize_datetime(
    condition: &Condition,
    _ctx: &PassContext<'_>,
) -> Result<Option<Domain>, PlannerError> {
    if !applies(condition) {
        return Ok(None);
    }
    if let Some(domain) = ordering_null(condition) {
        return Ok(Some(domain));
    }

    match &condition.value {
        ConditionValue::Scalar(v) => match to_datetime(condition, v)? {
            Value::Date(day) => Ok(Some(day_bound(condition, day))),
            coerced if coerced == *v => Ok(None),
            coerced => Ok(Some(Domain::Condition(condition.with_value(coerced)))),
        },
        ConditionValue::Set(set) => {
            let coerced = coerce_set(set, |v| to_datetime(condition, v))?;
            let (days, rest): (Vec<Value>, Vec<Value>) = coerced
                .iter()
                .cloned()
                .partition(|v| matches!(v, Value::Date(_)));

            if days.is_empty() {
                if &coerced == set {
                    return Ok(None);
                }
                return Ok(Some(Domain::Condition(condition.with_value(coerced))));
            }

            let mut parts: Vec<Domain> = days
                .iter()
                .filter_map(|v| match v {
                    Value::Date(day) => Some(whole_day(condition, *day)),
                    _ => None,
                })
                .collect();
            if !rest.is_empty() {
                parts.push(Domain::Condition(condition.with_parts(
                    condition.field_expr.clone(),
                    Operator::In,
                    rest.into_iter().collect::<ValueSet>(),
                )));
            }

            let domain = Domain::or(parts);
            if condition.operator == Operator::In {
                return Ok(Some(domain));
            }
            if coerced.contains_null() {
                return Ok(Some(!domain));
            }
            // The interval bounds never match NULL, which `not in` selects.
            let unset = Domain::Condition(condition.with_parts(
                condition.field_expr.clone(),
                Operator::In,
                ValueSet::from_iter([Value::Null]),
            ));
            Ok(Some(!domain | unset))
        }
        _ => Ok(None),
    }
}

fn compare(condition: &Condition, operator: Operator, at: NaiveDateTime) -> Domain {
    Domain::Condition(condition.with_parts(
        condition.field_expr.clone(),
        operator,
        Value::Timestamp(at),
    ))
}

/// Ordering comparison against a whole day.
fn day_bound(condition: &Condition, day: NaiveDate) -> Domain {
    match condition.operator {
        Operator::LessThan | Operator::GreaterOrEqual => {
            compare(condition, condition.operator, start_of_day(day))
        }
        Operator::LessOrEqual => match start_of_next_day(day) {
            Some(next) => compare(condition, Operator::LessThan, next),
            None => Domain::TRUE,
        },
        _ => match start_of_next_day(day) {
            Some(next) => compare(condition, Operator::GreaterOrEqual, next),
            None => Domain::FALSE,
        },
    }
}

fn whole_day(condition: &Condition, day: NaiveDate) -> Domain {
    let from = compare(condition, Operator::GreaterOrEqual, start_of_day(day));
    match start_of_next_day(day) {
        Some(next) => from & compare(condition, Operator::LessThan, next),
        None => from,
    }
}
