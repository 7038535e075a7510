//! Passes for conditions on relational fields.

use crate::{error::PlannerError, optimizer::context::PassContext, schema::entity::ID};
use domain_syntax::{Condition, ConditionValue, Domain, Operator, ValueSet};
use model::core::{field_type::FieldType, value::Value};

/// Optimizes the sub-domain of `any`/`not any` against the related entity.
///
/// A sub-domain that can never match decides the condition; on a many2one
/// a sub-domain that always matches is a null check.
pub fn traverse_relation(
    condition: &Condition,
    ctx: &PassContext<'_>,
) -> Result<Option<Domain>, PlannerError> {
    let field = ctx.field(condition)?;
    let target = ctx.target(condition, field)?;
    let positive = condition.operator == Operator::Any;

    let sub = match &condition.value {
        ConditionValue::SubDomain(sub) => sub,
        ConditionValue::Query(_) => return Ok(None),
        other => {
            return Err(PlannerError::type_mismatch(
                condition,
                format!(
                    "operator '{}' expects a domain, got {}",
                    condition.operator,
                    other.kind()
                ),
            ));
        }
    };

    let optimized = ctx.optimize_nested((**sub).clone(), target)?;

    if optimized.is_false() {
        return Ok(Some(Domain::Constant(!positive)));
    }
    if optimized.is_true() && field.field_type == FieldType::Many2one {
        let operator = if positive {
            Operator::NotIn
        } else {
            Operator::In
        };
        return Ok(Some(Domain::Condition(condition.with_parts(
            field.name.clone(),
            operator,
            ValueSet::singleton(Value::Null),
        ))));
    }
    if optimized == **sub {
        return Ok(None);
    }

    Ok(Some(Domain::Condition(condition.with_value(optimized))))
}

/// Relational values given as labels are searched on the related
/// entity's `rec_name`.
///
/// `f in [3, 'Acme']` becomes `f any (name in ['Acme']) | f in [3]`, and
/// `f ilike 'ac'` becomes `f any (name ilike 'ac')`.
pub fn search_by_label(
    condition: &Condition,
    ctx: &PassContext<'_>,
) -> Result<Option<Domain>, PlannerError> {
    let field = ctx.field(condition)?;
    if !field.is_relational() || condition.is_dotted() {
        return Ok(None);
    }

    match (condition.operator, &condition.value) {
        (Operator::In | Operator::NotIn, ConditionValue::Set(set)) => {
            let (labels, ids): (Vec<Value>, Vec<Value>) = set
                .iter()
                .cloned()
                .partition(|v| matches!(v, Value::String(_)));
            if labels.is_empty() {
                return Ok(None);
            }

            let comodel = ctx.comodel(condition, field)?;
            let by_label = Domain::Condition(condition.with_parts(
                comodel.rec_name.clone(),
                Operator::In,
                labels.into_iter().collect::<ValueSet>(),
            ));
            let mut domain = Domain::Condition(condition.with_parts(
                field.name.clone(),
                Operator::Any,
                by_label,
            ));
            if !ids.is_empty() {
                domain = domain
                    | Domain::Condition(condition.with_parts(
                        field.name.clone(),
                        Operator::In,
                        ids.into_iter().collect::<ValueSet>(),
                    ));
            }

            Ok(Some(if condition.operator == Operator::In {
                domain
            } else {
                !domain
            }))
        }
        (op, ConditionValue::Scalar(Value::String(_))) if op.is_pattern() => {
            let comodel = ctx.comodel(condition, field)?;
            let traversal = if op.is_negative() {
                Operator::NotAny
            } else {
                Operator::Any
            };
            let nested = condition.with_parts(
                comodel.rec_name.clone(),
                op.positive(),
                condition.value.clone(),
            );
            Ok(Some(Domain::Condition(condition.with_parts(
                field.name.clone(),
                traversal,
                Domain::Condition(nested),
            ))))
        }
        _ => Ok(None),
    }
}

/// Membership on one2many/many2many fields is a traversal over the ids of
/// the related records. A null in the set stands for "no related record".
pub fn x2many_membership(
    condition: &Condition,
    _ctx: &PassContext<'_>,
) -> Result<Option<Domain>, PlannerError> {
    if condition.is_dotted() {
        return Ok(None);
    }
    let (Operator::In | Operator::NotIn, ConditionValue::Set(set)) =
        (condition.operator, &condition.value)
    else {
        return Ok(None);
    };

    let ids: ValueSet = set.iter().filter(|v| !v.is_null()).cloned().collect();
    let mut parts = Vec::with_capacity(2);
    if !ids.is_empty() {
        let by_id = Domain::Condition(condition.with_parts(ID, Operator::In, ids));
        parts.push(Domain::Condition(condition.with_parts(
            condition.field_expr.clone(),
            Operator::Any,
            by_id,
        )));
    }
    if set.contains_null() {
        parts.push(Domain::Condition(condition.with_parts(
            condition.field_expr.clone(),
            Operator::NotAny,
            Domain::TRUE,
        )));
    }

    let domain = Domain::or(parts);
    Ok(Some(if condition.operator == Operator::In {
        domain
    } else {
        !domain
    }))
}
