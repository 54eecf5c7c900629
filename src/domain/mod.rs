pub mod installed;
pub mod manifest;
pub mod post;
pub mod user;

pub use installed::InstalledService;
pub use manifest::ServiceManifest;
pub use post::{Comment, Post, PostIdentity};
pub use user::User;
