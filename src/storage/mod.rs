pub mod traits;
pub mod sqlite;

pub use traits::InstalledServiceRepository;
pub use sqlite::{SqliteInstalledServiceRepository, SqliteStorage};
