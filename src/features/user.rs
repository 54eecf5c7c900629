use serde::{Deserialize, Serialize};

use crate::domain::{Post, User};
use crate::errors::ServiceError;

use super::paging::{Page, PageKey};
use super::result::Outcome;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserByIdRequest {
    pub user_id: String,
}

impl UserByIdRequest {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPostsRequest {
    pub user_id: String,
    pub page_key: Option<PageKey>,
}

impl UserPostsRequest {
    pub fn new(user_id: impl Into<String>, page_key: Option<PageKey>) -> Self {
        Self {
            user_id: user_id.into(),
            page_key,
        }
    }
}

/// User profile capability.
#[cfg_attr(test, mockall::automock)]
pub trait UserFeature: Send + Sync {
    fn fetch_by_id(&self, request: &UserByIdRequest) -> Outcome<User>;

    /// Fetch a page of posts authored by a user.
    fn fetch_posts(&self, _request: &UserPostsRequest) -> Outcome<Page<Post>> {
        Err(ServiceError::NotImplemented("user.fetch_posts"))
    }
}
