//! The synchronous network primitive handed to every service instance.
//!
//! Services never build their own clients; the host injects an
//! `HttpClient` through the service context so tests can swap in fixtures.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

use crate::features::ErrorInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body.into()),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Fail with a `status` error unless the response is 2xx.
    pub fn error_for_status(self, url: &str) -> Result<Self, ErrorInfo> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ErrorInfo::status(self.status, url))
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ErrorInfo> {
        serde_json::from_str(&self.body).map_err(ErrorInfo::from)
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait HttpClient: Send + Sync {
    /// Perform a blocking request. Transport failures are runtime errors.
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ErrorInfo>;

    fn get(&self, url: &str) -> Result<HttpResponse, ErrorInfo> {
        self.execute(&HttpRequest::get(url))
    }
}

/// Blocking reqwest-backed client used by the binary.
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .user_agent(concat!("servicehub/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl HttpClient for ReqwestClient {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ErrorInfo> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Head => self.client.head(&request.url),
            Method::Post => self.client.post(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_status_helpers() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(404, "").is_success());

        let err = HttpResponse::new(500, "boom")
            .error_for_status("https://x")
            .unwrap_err();
        assert_eq!(err.kind, crate::features::ErrorKind::Status);
    }

    #[test]
    fn test_response_json() {
        let response = HttpResponse::new(200, r#"{"name": "Ramotion"}"#);
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["name"], "Ramotion");

        let err = HttpResponse::new(200, "<html>").json::<serde_json::Value>().unwrap_err();
        assert_eq!(err.kind, crate::features::ErrorKind::Parse);
    }

    #[test]
    fn test_default_get_goes_through_execute() {
        struct Echo;

        impl HttpClient for Echo {
            fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ErrorInfo> {
                assert_eq!(request.method, Method::Get);
                Ok(HttpResponse::new(200, request.url.clone()))
            }
        }

        let response = Echo.get("https://x/feed").unwrap();
        assert_eq!(response.body, "https://x/feed");
    }

    #[test]
    fn test_post_with_headers_reaches_client() {
        use std::sync::Mutex;

        struct Recorder(Mutex<Vec<HttpRequest>>);

        impl HttpClient for Recorder {
            fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ErrorInfo> {
                self.0.lock().unwrap().push(request.clone());
                Ok(HttpResponse::new(201, ""))
            }
        }

        let recorder = Recorder(Mutex::new(Vec::new()));
        let request = HttpRequest::post("https://x/api", r#"{"q": 1}"#)
            .with_header("Content-Type", "application/json")
            .with_header("X-Trace", "abc");

        let response = recorder.execute(&request).unwrap();
        assert_eq!(response.status, 201);

        let seen = recorder.0.lock().unwrap();
        assert_eq!(seen[0].method, Method::Post);
        assert_eq!(seen[0].body.as_deref(), Some(r#"{"q": 1}"#));
        assert_eq!(
            seen[0].headers,
            vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("X-Trace".to_string(), "abc".to_string()),
            ]
        );
    }
}
