mod connection;
mod installed_repository;

pub use connection::SqliteStorage;
pub use installed_repository::SqliteInstalledServiceRepository;
