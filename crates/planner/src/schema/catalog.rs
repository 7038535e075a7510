use crate::{error::PlannerError, schema::entity::Entity};
use domain_syntax::Domain;
use model::core::{
    identifiers::{EntityName, RecordId},
    value::Value,
};

/// Entity metadata and record access used by the optimizer.
///
/// `search` and `read` are only called by passes at the search level
/// (hierarchy resolution); a catalog used solely for basic optimization
/// can return errors from both.
pub trait Catalog: Send + Sync {
    fn entity(&self, name: &EntityName) -> Option<&Entity>;

    /// Identifiers of the records of `entity` matching `domain`.
    fn search(&self, entity: &Entity, domain: &Domain) -> Result<Vec<RecordId>, PlannerError>;

    /// Values of `field` for the given records. Missing records are skipped.
    fn read(
        &self,
        entity: &Entity,
        ids: &[RecordId],
        field: &str,
    ) -> Result<Vec<(RecordId, Value)>, PlannerError>;

    fn require_entity(&self, name: &EntityName) -> Result<&Entity, PlannerError> {
        self.entity(name)
            .ok_or_else(|| PlannerError::UnknownEntity(name.to_string()))
    }
}
