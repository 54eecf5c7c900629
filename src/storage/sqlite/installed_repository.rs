use rusqlite::Row;

use crate::domain::InstalledService;
use crate::errors::{ServiceError, ServiceResult};
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::InstalledServiceRepository;

const EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM installed_services WHERE id = ?1)";

pub struct SqliteInstalledServiceRepository {
    storage: SqliteStorage,
}

impl SqliteInstalledServiceRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<InstalledService> {
        Ok(InstalledService {
            id: row.get(0)?,
            document: row.get(1)?,
            installed_at: row.get(2)?,
        })
    }
}

impl InstalledServiceRepository for SqliteInstalledServiceRepository {
    fn upsert(&self, service: &InstalledService) -> ServiceResult<bool> {
        let conn = self.storage.connection()?;

        // Check within the same connection to avoid deadlock
        let mut stmt = conn.prepare(EXISTS_SQL)?;
        let existed: bool = stmt.query_row([&service.id], |row| row.get(0))?;
        drop(stmt);

        conn.execute(
            "INSERT INTO installed_services (id, document) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE
             SET document = excluded.document, installed_at = datetime('now')",
            (&service.id, &service.document),
        )?;

        Ok(existed)
    }

    fn remove(&self, id: &str) -> ServiceResult<bool> {
        let conn = self.storage.connection()?;
        let removed = conn.execute("DELETE FROM installed_services WHERE id = ?1", [id])?;
        Ok(removed > 0)
    }

    fn get_all(&self) -> ServiceResult<Vec<InstalledService>> {
        let conn = self.storage.connection()?;
        let mut stmt =
            conn.prepare("SELECT id, document, installed_at FROM installed_services ORDER BY id")?;

        let services = stmt.query_map([], Self::from_row)?;

        services
            .collect::<Result<Vec<_>, _>>()
            .map_err(ServiceError::from)
    }

    fn get_by_id(&self, id: &str) -> ServiceResult<Option<InstalledService>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, document, installed_at FROM installed_services WHERE id = ?1",
        )?;

        match stmt.query_row([id], Self::from_row) {
            Ok(service) => Ok(Some(service)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(ServiceError::from(e)),
        }
    }

    fn exists(&self, id: &str) -> ServiceResult<bool> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(EXISTS_SQL)?;
        let exists: bool = stmt.query_row([id], |row| row.get(0))?;
        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_repo() -> SqliteInstalledServiceRepository {
        let storage = SqliteStorage::in_memory().unwrap();
        SqliteInstalledServiceRepository::new(storage)
    }

    fn service(id: &str, name: &str) -> InstalledService {
        InstalledService::new(id, format!(r#"{{"id": "{}", "name": "{}"}}"#, id, name))
    }

    #[test]
    fn test_upsert_and_get() {
        let repo = setup_repo();

        let replaced = repo.upsert(&service("me.service", "MyService")).unwrap();
        assert!(!replaced);

        let stored = repo.get_by_id("me.service").unwrap().unwrap();
        assert!(stored.document.contains("MyService"));
        assert!(stored.installed_at.is_some());
    }

    #[test]
    fn test_reinstall_replaces_document() {
        let repo = setup_repo();

        repo.upsert(&service("me.service", "Old")).unwrap();
        let replaced = repo.upsert(&service("me.service", "New")).unwrap();

        assert!(replaced);
        let all = repo.get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].document.contains("New"));
    }

    #[test]
    fn test_remove() {
        let repo = setup_repo();
        repo.upsert(&service("a", "A")).unwrap();

        assert!(repo.remove("a").unwrap());
        assert!(!repo.remove("a").unwrap());
        assert!(repo.get_by_id("a").unwrap().is_none());
    }

    #[test]
    fn test_get_all_sorted_by_id() {
        let repo = setup_repo();
        repo.upsert(&service("zeta", "Z")).unwrap();
        repo.upsert(&service("alpha", "A")).unwrap();

        let ids: Vec<String> = repo.get_all().unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_exists() {
        let repo = setup_repo();

        assert!(!repo.exists("a").unwrap());
        repo.upsert(&service("a", "A")).unwrap();
        assert!(repo.exists("a").unwrap());
    }
}
