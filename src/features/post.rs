use serde::{Deserialize, Serialize};

use crate::domain::{Comment, Post};
use crate::errors::ServiceError;

use super::paging::{Page, PageKey};
use super::result::Outcome;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreshListRequest {
    pub page_key: Option<PageKey>,
}

impl FreshListRequest {
    /// Request the freshest page.
    pub fn first() -> Self {
        Self { page_key: None }
    }

    pub fn after(page_key: Option<PageKey>) -> Self {
        Self { page_key }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchPostRequest {
    pub url: String,
}

impl FetchPostRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentsRequest {
    pub post_url: String,
    pub page_key: Option<PageKey>,
}

impl CommentsRequest {
    pub fn new(post_url: impl Into<String>, page_key: Option<PageKey>) -> Self {
        Self {
            post_url: post_url.into(),
            page_key,
        }
    }
}

/// Post feed capability.
#[cfg_attr(test, mockall::automock)]
pub trait PostFeature: Send + Sync {
    /// Fetch a page of the service's fresh feed.
    fn fetch_fresh_list(&self, request: &FreshListRequest) -> Outcome<Page<Post>>;

    /// Fetch a single post by its url.
    fn fetch_post(&self, _request: &FetchPostRequest) -> Outcome<Post> {
        Err(ServiceError::NotImplemented("post.fetch_post"))
    }

    /// Fetch a page of comments on a post.
    fn fetch_comments(&self, _request: &CommentsRequest) -> Outcome<Page<Comment>> {
        Err(ServiceError::NotImplemented("post.fetch_comments"))
    }
}
