use crate::errors::LatticeResult;
use crate::models::Entity;

/// Entity extraction collaborator. The extraction algorithm lives outside
/// this workspace; the engine only caches its output.
pub trait IEntityExtractor: Send + Sync {
    fn extract(&self, text: &str) -> LatticeResult<Vec<Entity>>;

    /// Name/version tag, part of the entity cache key.
    fn name(&self) -> &str;
}
