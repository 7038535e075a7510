use crate::{
    error::PlannerError,
    optimizer::driver::Optimizer,
    schema::{
        catalog::Catalog,
        entity::{Entity, ID},
        field::Field,
    },
};
use domain_syntax::{Condition, Domain, OptLevel, OptMark};

/// What a pass sees besides the condition itself.
pub struct PassContext<'a> {
    pub entity: &'a Entity,
    pub level: OptLevel,
    pub catalog: &'a dyn Catalog,
    optimizer: &'a Optimizer,
}

impl<'a> PassContext<'a> {
    pub(crate) fn new(
        optimizer: &'a Optimizer,
        entity: &'a Entity,
        catalog: &'a dyn Catalog,
        level: OptLevel,
    ) -> Self {
        Self {
            entity,
            level,
            catalog,
            optimizer,
        }
    }

    pub(crate) fn max_iterations(&self) -> usize {
        self.optimizer.config().max_iterations
    }

    /// The mark put on nodes optimized in this context.
    pub fn mark(&self) -> OptMark {
        OptMark::new(self.entity.name.clone(), self.level)
    }

    /// Field the condition's expression starts with.
    pub fn field(&self, condition: &Condition) -> Result<&'a Field, PlannerError> {
        self.entity.condition_field(condition)
    }

    pub fn comodel(&self, condition: &Condition, field: &Field) -> Result<&'a Entity, PlannerError> {
        let name = field
            .comodel
            .as_ref()
            .ok_or_else(|| PlannerError::invalid(condition, format!("'{}' has no related entity", field.name)))?;
        self.catalog.require_entity(name)
    }

    /// Entity a traversal over `field` lands on: the entity itself for `id`.
    pub fn target(&self, condition: &Condition, field: &Field) -> Result<&'a Entity, PlannerError> {
        if field.name == ID {
            Ok(self.entity)
        } else if field.is_relational() {
            self.comodel(condition, field)
        } else {
            Err(PlannerError::invalid(
                condition,
                format!("'{}' is not a relational field", field.name),
            ))
        }
    }

    /// The same context for another entity.
    pub fn for_entity(&self, entity: &'a Entity) -> PassContext<'a> {
        PassContext {
            entity,
            level: self.level,
            catalog: self.catalog,
            optimizer: self.optimizer,
        }
    }

    /// Optimizes a nested domain against `entity` at the current level.
    pub fn optimize_nested(&self, domain: Domain, entity: &'a Entity) -> Result<Domain, PlannerError> {
        self.optimizer.optimize_node(domain, &self.for_entity(entity))
    }
}
