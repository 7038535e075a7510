//! Field resolution and access passes.

use crate::{error::PlannerError, optimizer::context::PassContext, schema::entity::ID};
use domain_syntax::{Condition, Domain, Operator};
use model::core::field_type::FieldType;
use tracing::{debug, error};

/// Checks the field exists and turns a path through a relation into a
/// traversal: `partner_id.name = x` becomes `partner_id any (name = x)`.
pub fn resolve_field(
    condition: &Condition,
    ctx: &PassContext<'_>,
) -> Result<Option<Domain>, PlannerError> {
    let field = ctx.field(condition)?;
    let (_, Some(rest)) = condition.split_path() else {
        return Ok(None);
    };

    if field.is_relational() {
        let nested = condition.with_parts(rest, condition.operator, condition.value.clone());
        return Ok(Some(Domain::Condition(condition.with_parts(
            field.name.clone(),
            Operator::Any,
            Domain::Condition(nested),
        ))));
    }

    if field.field_type == FieldType::Json {
        return Ok(None);
    }

    Err(PlannerError::invalid(
        condition,
        format!(
            "path crosses '{}', which is neither relational nor json",
            field.name
        ),
    ))
}

/// Redirects an inherited field through the many2one to its owner.
pub fn delegated_field(
    condition: &Condition,
    ctx: &PassContext<'_>,
) -> Result<Option<Domain>, PlannerError> {
    let field = ctx.field(condition)?;
    let Some(link) = &field.delegated_via else {
        return Ok(None);
    };

    debug!(
        "Field {}.{} is inherited through '{}'",
        ctx.entity.name, field.name, link
    );
    let nested = condition.with_parts(
        condition.field_expr.clone(),
        condition.operator,
        condition.value.clone(),
    );
    Ok(Some(Domain::Condition(condition.with_parts(
        link.clone(),
        Operator::Any,
        Domain::Condition(nested),
    ))))
}

/// Replaces a condition on a computed field by its search hook's domain.
///
/// Fields lowered by their own SQL are left alone. Without either hook the
/// condition cannot be searched; it is logged and treated as always true.
pub fn non_stored_field(
    condition: &Condition,
    ctx: &PassContext<'_>,
) -> Result<Option<Domain>, PlannerError> {
    let field = ctx.field(condition)?;
    if field.stored || field.sql.is_some() || field.name == ID || field.delegated_via.is_some() {
        return Ok(None);
    }

    match &field.search {
        Some(hook) => hook
            .call(ctx.entity, condition.operator, &condition.value)
            .map(Some),
        None => {
            error!(
                "Non-stored field {}.{} cannot be searched, ignoring condition {}",
                ctx.entity.name, field.name, condition
            );
            Ok(Some(Domain::TRUE))
        }
    }
}
