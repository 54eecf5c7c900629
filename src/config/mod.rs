use std::time::Duration;

use crate::errors::{ServiceError, ServiceResult};
use crate::registry::MergePolicy;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub merge_policy: MergePolicy,
    pub http_timeout: Duration,
    pub log_filter: String,
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<std::path::PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    pub fn from_env() -> ServiceResult<Self> {
        let exe_dir = Self::exe_dir();

        // Try to load .env from executable's directory first
        if let Some(ref dir) = exe_dir {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        // Fall back to current directory
        dotenvy::dotenv().ok();

        // Default db_path is relative to executable directory
        let db_path = std::env::var("SERVICEHUB_DB_PATH").unwrap_or_else(|_| {
            exe_dir
                .map(|d| d.join("servicehub.db").to_string_lossy().into_owned())
                .unwrap_or_else(|| "./servicehub.db".to_string())
        });

        let merge_policy = match std::env::var("SERVICEHUB_MERGE_POLICY") {
            Ok(value) => value.parse::<MergePolicy>().map_err(ServiceError::Config)?,
            Err(_) => MergePolicy::default(),
        };

        let http_timeout = match std::env::var("SERVICEHUB_HTTP_TIMEOUT") {
            Ok(value) => Self::parse_timeout(&value)?,
            Err(_) => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        let log_filter =
            std::env::var("SERVICEHUB_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            db_path,
            merge_policy,
            http_timeout,
            log_filter,
        })
    }

    fn parse_timeout(value: &str) -> ServiceResult<Duration> {
        let secs: u64 = value.trim().parse().map_err(|_| {
            ServiceError::Config(format!(
                "SERVICEHUB_HTTP_TIMEOUT must be a whole number of seconds, got '{}'",
                value
            ))
        })?;

        if secs == 0 {
            return Err(ServiceError::Config(
                "SERVICEHUB_HTTP_TIMEOUT must be greater than zero".to_string(),
            ));
        }

        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timeout() {
        assert_eq!(Config::parse_timeout("45").unwrap(), Duration::from_secs(45));
        assert_eq!(Config::parse_timeout(" 5 ").unwrap(), Duration::from_secs(5));
    }

    #[test]
    fn test_parse_timeout_rejects_bad_values() {
        assert!(matches!(Config::parse_timeout("0"), Err(ServiceError::Config(_))));
        assert!(matches!(Config::parse_timeout("soon"), Err(ServiceError::Config(_))));
    }
}
