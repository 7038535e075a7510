use crate::{error::PlannerError, optimizer::context::PassContext, schema::entity::ID};
use domain_syntax::{Condition, ConditionValue, Domain, Operator};
use model::core::field_type::FieldType;

/// Last check before lowering: the condition only uses the standard
/// vocabulary and can be turned into SQL as it is.
pub fn assert_sql_ready(
    condition: &Condition,
    ctx: &PassContext<'_>,
) -> Result<Option<Domain>, PlannerError> {
    if !condition.operator.is_standard() {
        return Err(PlannerError::invalid(
            condition,
            format!("operator '{}' was not rewritten", condition.operator),
        ));
    }

    let field = ctx.field(condition)?;
    let json_path = field.field_type == FieldType::Json && condition.is_dotted();
    if condition.is_dotted() && !json_path {
        return Err(PlannerError::invalid(
            condition,
            "path was not decomposed into a traversal",
        ));
    }

    let traversal = matches!(condition.operator, Operator::Any | Operator::NotAny);
    if traversal && !(field.is_relational() || field.name == ID) {
        return Err(PlannerError::invalid(
            condition,
            format!("'{}' cannot be traversed", field.name),
        ));
    }

    let shape_ok = match (&condition.value, condition.operator) {
        (ConditionValue::SubDomain(_) | ConditionValue::Query(_), op) => {
            matches!(op, Operator::Any | Operator::NotAny)
        }
        (ConditionValue::Set(_), op) => matches!(op, Operator::In | Operator::NotIn),
        (ConditionValue::Scalar(_), op) => {
            !matches!(op, Operator::Any | Operator::NotAny | Operator::In | Operator::NotIn)
        }
    };
    if !shape_ok {
        return Err(PlannerError::type_mismatch(
            condition,
            format!(
                "operator '{}' does not accept {}",
                condition.operator,
                condition.value.kind()
            ),
        ));
    }

    if field.name != ID && !field.is_searchable() {
        return Err(PlannerError::invalid(
            condition,
            format!("'{}' is not stored and has no SQL", field.name),
        ));
    }

    Ok(None)
}
