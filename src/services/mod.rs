pub mod enrich;
pub mod fetch_service;
pub mod install_service;

pub use enrich::{Branding, PostView, UserView};
pub use fetch_service::FetchService;
pub use install_service::{InstallOutcome, InstallService};
