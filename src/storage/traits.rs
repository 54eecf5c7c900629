use crate::domain::InstalledService;
use crate::errors::ServiceResult;

#[cfg_attr(test, mockall::automock)]
pub trait InstalledServiceRepository: Send + Sync {
    /// Insert or wholesale-replace a service. Returns true when it replaced one.
    fn upsert(&self, service: &InstalledService) -> ServiceResult<bool>;
    /// Returns true when something was removed.
    fn remove(&self, id: &str) -> ServiceResult<bool>;
    fn get_all(&self) -> ServiceResult<Vec<InstalledService>>;
    fn get_by_id(&self, id: &str) -> ServiceResult<Option<InstalledService>>;
    fn exists(&self, id: &str) -> ServiceResult<bool>;
}
