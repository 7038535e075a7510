use crate::{error::PlannerError, optimizer::context::PassContext};
use domain_syntax::{Condition, ConditionValue, Domain, Operator, ValueSet};
use model::core::value::Value;
use tracing::error;

/// Binary fields stored as attachments only support "is set" checks.
///
/// Any other condition is logged and treated as always true.
pub fn restrict_attachment(
    condition: &Condition,
    ctx: &PassContext<'_>,
) -> Result<Option<Domain>, PlannerError> {
    let field = ctx.field(condition)?;
    if !field.attachment {
        return Ok(None);
    }

    if let (Operator::In | Operator::NotIn, ConditionValue::Set(set)) =
        (condition.operator, &condition.value)
        && set.iter().all(Value::is_falsy)
    {
        let unset = ValueSet::singleton(Value::Null);
        if *set == unset {
            return Ok(None);
        }
        return Ok(Some(Domain::Condition(condition.with_value(unset))));
    }

    error!(
        "Binary field {}.{} is stored as an attachment and only supports existence checks, ignoring condition {}",
        ctx.entity.name, field.name, condition
    );
    Ok(Some(Domain::TRUE))
}
