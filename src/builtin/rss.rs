use std::sync::Arc;

use feed_rs::parser;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::{Post, User};
use crate::errors::ServiceResult;
use crate::features::{
    ErrorInfo, FeatureSet, FetchPostRequest, FetchResult, FreshListRequest, Outcome, Page,
    PageKey, PostFeature,
};
use crate::net::{HttpClient, HttpRequest, Method};
use crate::service::ServiceContext;

pub const DEFAULT_PAGE_SIZE: usize = 20;

const FEED_ACCEPT: &str = concat!(
    "application/rss+xml, application/atom+xml, application/feed+json, ",
    "application/xml;q=0.9, */*;q=0.8"
);

/// Common feed URL patterns to try when the configured URL is not a feed
const FEED_PATTERNS: &[&str] = &[
    "/feed/",               // WordPress
    "/index.xml",           // Hugo
    "/atom.xml",            // Hugo/Jekyll Atom
    "/rss.xml",             // Generic RSS
    "/feed.xml",            // Generic feed
    "/rss",                 // Some sites
    "/feed",                // Some sites
    "/feeds/posts/default", // Blogger
    "/.rss",                // Some static generators
];

/// Cursor state; only this service reads it.
///
/// Holds the id of the last entry served so new entries at the top of the
/// feed do not shift the next page.
#[derive(Debug, Serialize, Deserialize)]
struct Cursor {
    after: String,
}

/// Exposes any RSS, Atom or JSON feed as a post feed.
///
/// Configs: `url` (site or feed URL, required when fetching) and optional
/// `pageSize`.
pub struct RssFeed {
    service_id: String,
    url: Option<String>,
    page_size: usize,
    http: Arc<dyn HttpClient>,
}

impl RssFeed {
    pub fn new(context: &ServiceContext) -> Self {
        let page_size = context
            .configs
            .get_u64("pageSize")
            .map(|n| n as usize)
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE);

        Self {
            service_id: context.manifest.id.clone(),
            url: context.configs.get_str("url").map(str::to_string),
            page_size,
            http: Arc::clone(&context.http),
        }
    }

    fn configured_url(&self) -> Result<&str, ErrorInfo> {
        self.url
            .as_deref()
            .ok_or_else(|| ErrorInfo::invalid_request("the rss service needs a `url` config"))
    }

    fn fetch_and_parse(&self, url: &str) -> Result<feed_rs::model::Feed, ErrorInfo> {
        let request = HttpRequest::get(url).with_header("Accept", FEED_ACCEPT);
        let response = self.http.execute(&request)?.error_for_status(url)?;
        Self::parse_bytes(response.body.as_bytes())
    }

    fn parse_bytes(bytes: &[u8]) -> Result<feed_rs::model::Feed, ErrorInfo> {
        parser::parse(bytes).map_err(|e| ErrorInfo::parse(e.to_string()))
    }

    /// Try the URL as-is, then each common feed location on its host
    fn discover(&self, url: &str) -> Result<(String, feed_rs::model::Feed), ErrorInfo> {
        let mut last_error = match self.fetch_and_parse(url) {
            Ok(feed) => return Ok((url.to_string(), feed)),
            Err(e) => e,
        };

        let parsed = Url::parse(url).map_err(|e| ErrorInfo::invalid_request(e.to_string()))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| ErrorInfo::invalid_request("Missing host"))?;
        let base_url = format!("{}://{}", parsed.scheme(), host);

        for pattern in FEED_PATTERNS {
            let feed_url = format!("{}{}", base_url, pattern);

            let head = HttpRequest {
                method: Method::Head,
                ..HttpRequest::get(feed_url.as_str())
            };
            match self.http.execute(&head) {
                Ok(response) if response.is_success() => match self.fetch_and_parse(&feed_url) {
                    Ok(feed) => return Ok((feed_url, feed)),
                    Err(e) => last_error = e,
                },
                Ok(_) => continue,
                Err(_) => continue,
            }
        }

        Err(last_error)
    }

    fn posts_from_feed(&self, feed_url: &str, feed: feed_rs::model::Feed) -> Vec<Post> {
        let base = Url::parse(feed_url).ok();

        feed.entries
            .into_iter()
            .map(|entry| {
                let link = entry
                    .links
                    .first()
                    .map(|l| resolve(base.as_ref(), &l.href))
                    .unwrap_or_else(|| entry.id.clone());

                let title = entry.title.map(|t| t.content).filter(|t| !t.is_empty());

                let content = entry
                    .content
                    .and_then(|c| c.body)
                    .or_else(|| entry.summary.map(|s| s.content));

                let media: Vec<String> = entry
                    .media
                    .iter()
                    .flat_map(|m| m.content.iter())
                    .filter_map(|c| c.url.as_ref().map(|u| u.to_string()))
                    .collect();

                let author = entry.authors.into_iter().next().map(|person| {
                    let user = User::new(person.name.clone(), person.name);
                    match person.uri {
                        Some(uri) => user.with_url(uri),
                        None => user,
                    }
                });

                Post::new(self.service_id.clone(), link, entry.id)
                    .with_title(title)
                    .with_content(content)
                    .with_media(media)
                    .with_author(author)
                    .with_published(entry.published.or(entry.updated))
            })
            .collect()
    }

    fn load_page(&self, request: &FreshListRequest) -> Result<Page<Post>, ErrorInfo> {
        let cursor = match &request.page_key {
            Some(key) => Some(key.decode::<Cursor>()?),
            None => None,
        };

        let (feed_url, feed) = self.discover(self.configured_url()?)?;
        let posts = self.posts_from_feed(&feed_url, feed);

        let start = match cursor {
            Some(cursor) => {
                let position = posts
                    .iter()
                    .position(|p| p.id == cursor.after)
                    .ok_or_else(|| {
                        ErrorInfo::invalid_request(format!(
                            "page key refers to entry '{}' which is no longer in the feed",
                            cursor.after
                        ))
                    })?;
                position + 1
            }
            None => 0,
        };

        let items: Vec<Post> = posts.iter().skip(start).take(self.page_size).cloned().collect();
        let served = start + items.len();

        let next_key = match items.last() {
            Some(last) if served < posts.len() => Some(PageKey::new(&Cursor {
                after: last.id.clone(),
            })?),
            _ => None,
        };

        Ok(Page::new(items, next_key))
    }

    fn load_post(&self, request: &FetchPostRequest) -> Result<Post, ErrorInfo> {
        let (feed_url, feed) = self.discover(self.configured_url()?)?;

        self.posts_from_feed(&feed_url, feed)
            .into_iter()
            .find(|p| p.url == request.url)
            .ok_or_else(|| ErrorInfo::not_found(format!("{} is not in the feed", request.url)))
    }
}

fn resolve(base: Option<&Url>, href: &str) -> String {
    match base.map(|b| b.join(href)) {
        Some(Ok(url)) => url.to_string(),
        _ => href.to_string(),
    }
}

impl PostFeature for RssFeed {
    fn fetch_fresh_list(&self, request: &FreshListRequest) -> Outcome<Page<Post>> {
        Ok(FetchResult::from(self.load_page(request)))
    }

    fn fetch_post(&self, request: &FetchPostRequest) -> Outcome<Post> {
        Ok(FetchResult::from(self.load_post(request)))
    }
}

/// Factory registered in the built-in catalog.
pub fn create(context: &ServiceContext) -> ServiceResult<FeatureSet> {
    Ok(FeatureSet::new().with_post(RssFeed::new(context)))
}
