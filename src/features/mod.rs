pub mod paging;
pub mod post;
pub mod result;
pub mod set;
pub mod user;

pub use paging::{Page, PageKey};
pub use post::{CommentsRequest, FetchPostRequest, FreshListRequest, PostFeature};
pub use result::{ErrorInfo, ErrorKind, FetchResult, Outcome};
pub use set::{FeatureKind, FeatureRef, FeatureSet};
pub use user::{UserByIdRequest, UserFeature, UserPostsRequest};
