use crate::algorithm::{Algorithm, CatalogStats};
use crate::error::RecurResult;
use crate::theorem::Case;

pub trait AlgorithmCatalog {
    // CRUD
    fn add(&self, algorithm: Algorithm) -> RecurResult<String>;
    fn get(&self, id: &str) -> RecurResult<Option<Algorithm>>;
    fn get_by_name(&self, name: &str) -> RecurResult<Option<Algorithm>>;
    fn update(&self, algorithm: &Algorithm) -> RecurResult<()>;
    fn delete(&self, id: &str) -> RecurResult<()>;

    // Listing, in creation order
    fn list(&self) -> RecurResult<Vec<Algorithm>>;
    fn list_by_case(&self, case: Case) -> RecurResult<Vec<Algorithm>>;

    // Stats
    fn count(&self) -> RecurResult<usize>;
    fn stats(&self) -> RecurResult<CatalogStats>;

    /// Look up by id first, then by name.
    fn resolve(&self, id_or_name: &str) -> RecurResult<Option<Algorithm>> {
        match self.get(id_or_name)? {
            Some(algo) => Ok(Some(algo)),
            None => self.get_by_name(id_or_name),
        }
    }
}
