use std::collections::HashSet;

use crate::domain::{Post, User};
use crate::errors::ServiceResult;
use crate::features::{
    FeatureKind, FetchPostRequest, FetchResult, FreshListRequest, Outcome, Page, PageKey,
    UserByIdRequest,
};
use crate::registry::ServiceRegistry;
use crate::service::{AnyService, ServiceConfig};

/// Dispatches feature calls to registered services.
pub struct FetchService<'a> {
    registry: &'a ServiceRegistry,
}

impl<'a> FetchService<'a> {
    pub fn new(registry: &'a ServiceRegistry) -> Self {
        Self { registry }
    }

    /// Run `f` against the default instance, or a fresh one when configs are given.
    fn with_service<T>(
        &self,
        id: &str,
        configs: ServiceConfig,
        f: impl FnOnce(&AnyService) -> ServiceResult<T>,
    ) -> ServiceResult<T> {
        if configs.is_empty() {
            if let Some(service) = self.registry.get(id) {
                return f(service);
            }
        }

        let service = self.registry.instantiate(id, configs)?;
        f(&service)
    }

    /// Fetch one page of a service's fresh feed
    pub fn fetch_fresh(
        &self,
        id: &str,
        configs: ServiceConfig,
        page_key: Option<PageKey>,
    ) -> Outcome<Page<Post>> {
        tracing::debug!(id, has_key = page_key.is_some(), "fetching fresh list");
        self.with_service(id, configs, |service| {
            service
                .features()
                .post()?
                .fetch_fresh_list(&FreshListRequest::after(page_key))
        })
    }

    pub fn fetch_post(&self, id: &str, configs: ServiceConfig, url: &str) -> Outcome<Post> {
        self.with_service(id, configs, |service| {
            service.features().post()?.fetch_post(&FetchPostRequest::new(url))
        })
    }

    pub fn fetch_user(&self, id: &str, configs: ServiceConfig, user_id: &str) -> Outcome<User> {
        tracing::debug!(id, user_id, "fetching user");
        self.with_service(id, configs, |service| {
            service
                .features()
                .user()?
                .fetch_by_id(&UserByIdRequest::new(user_id))
        })
    }

    /// Fetch the first page of every service that declares a post feed.
    /// A failing service is logged and skipped; the others still return.
    pub fn fetch_all_fresh(&self) -> Vec<(String, Page<Post>)> {
        let mut results = Vec::new();

        for service in self.registry.supporting(FeatureKind::Post) {
            let outcome = service
                .features()
                .post()
                .and_then(|feature| feature.fetch_fresh_list(&FreshListRequest::first()));

            match outcome {
                Ok(FetchResult::Success(page)) if !page.is_empty() => {
                    results.push((service.id().to_string(), page));
                }
                Ok(FetchResult::Success(_)) => {
                    // Nothing fresh
                }
                Ok(FetchResult::Failure(e)) => {
                    tracing::warn!(id = service.id(), error = %e, "fresh list fetch failed");
                }
                Err(e) => {
                    tracing::warn!(id = service.id(), error = %e, "fresh list unavailable");
                }
            }
        }

        results
    }

    /// Walk a service's fresh feed from `start`, following cursors for at
    /// most `max_pages` pages.
    ///
    /// Posts are deduplicated by identity. The walk stops when the service
    /// returns no cursor or hands back the cursor it was just given. A
    /// failure on the first page is returned; a later failure ends the walk
    /// with what was collected so far.
    pub fn collect_pages(
        &self,
        id: &str,
        configs: ServiceConfig,
        start: Option<PageKey>,
        max_pages: usize,
    ) -> Outcome<Page<Post>> {
        self.with_service(id, configs, |service| {
            let feature = service.features().post()?;

            let mut seen = HashSet::new();
            let mut posts = Vec::new();
            let mut key = start;

            for page_number in 0..max_pages {
                let request = FreshListRequest::after(key.clone());
                let page = match feature.fetch_fresh_list(&request)? {
                    FetchResult::Success(page) => page,
                    FetchResult::Failure(e) if page_number == 0 => return Ok(FetchResult::fail(e)),
                    FetchResult::Failure(e) => {
                        tracing::warn!(
                            id,
                            page = page_number + 1,
                            error = %e,
                            "stopping page walk"
                        );
                        return Ok(FetchResult::ok(Page::new(posts, key)));
                    }
                };

                let next = page.next_key.clone();
                for post in page {
                    if seen.insert(post.identity()) {
                        posts.push(post);
                    }
                }

                match next {
                    Some(next) if key.as_ref() != Some(&next) => key = Some(next),
                    Some(_) => {
                        tracing::debug!(id, "service repeated its cursor");
                        return Ok(FetchResult::ok(Page::last(posts)));
                    }
                    None => return Ok(FetchResult::ok(Page::last(posts))),
                }
            }

            Ok(FetchResult::ok(Page::new(posts, key)))
        })
    }
}
