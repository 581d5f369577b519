//! Central module for application-wide configuration settings.
//!
//! This module loads the listen address, database and search-engine locations,
//! token settings and page size from the environment (after `.env` has been
//! read by `dotenvy`). Unset backends fall back to their in-memory versions.

use std::net::SocketAddr;

use anyhow::{Context, Result};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_ACQUIRE_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_SEARCH_INDEX: &str = "knowledge_base";
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 24 * 60;
pub const DEFAULT_ARTICLES_PER_PAGE: u32 = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database: Option<DatabaseConfig>,
    pub search: SearchConfig,
    pub auth: AuthConfig,
    pub articles_per_page: u32,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_ms: u64,
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Elasticsearch base URL; `None` selects the in-memory index.
    pub url: Option<String>,
    pub index: String,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .finish()
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().with_context(|| format!("parse {key}")),
        None => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok().filter(|v| !v.trim().is_empty()))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind_addr = lookup("HELPDESK_BIND")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .with_context(|| "parse HELPDESK_BIND")?;

        let database = match lookup("DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: parse_or(
                    &lookup,
                    "DATABASE_MAX_CONNECTIONS",
                    DEFAULT_MAX_CONNECTIONS,
                )?,
                acquire_timeout_ms: parse_or(
                    &lookup,
                    "DATABASE_ACQUIRE_TIMEOUT_MS",
                    DEFAULT_ACQUIRE_TIMEOUT_MS,
                )?,
            }),
            None => None,
        };

        let search = SearchConfig {
            url: lookup("ELASTICSEARCH_URL"),
            index: lookup("KB_SEARCH_INDEX").unwrap_or_else(|| DEFAULT_SEARCH_INDEX.to_string()),
        };

        let jwt_secret = match lookup("JWT_SECRET_KEY") {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET_KEY not set; tokens will not survive a restart");
                uuid::Uuid::new_v4().simple().to_string()
            }
        };
        let auth = AuthConfig {
            jwt_secret,
            token_ttl_minutes: parse_or(&lookup, "JWT_TTL_MINUTES", DEFAULT_TOKEN_TTL_MINUTES)?,
        };

        let articles_per_page =
            parse_or(&lookup, "ARTICLES_PER_PAGE", DEFAULT_ARTICLES_PER_PAGE)?;
        if articles_per_page == 0 {
            anyhow::bail!("ARTICLES_PER_PAGE must be at least 1");
        }

        Ok(Self {
            bind_addr,
            database,
            search,
            auth,
            articles_per_page,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_select_in_memory_backends() {
        let config = AppConfig::from_lookup(lookup(&[])).expect("config");
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR.parse::<SocketAddr>().unwrap());
        assert!(config.database.is_none());
        assert!(config.search.url.is_none());
        assert_eq!(config.search.index, "knowledge_base");
        assert_eq!(config.articles_per_page, 10);
        assert_eq!(config.auth.token_ttl_minutes, DEFAULT_TOKEN_TTL_MINUTES);
        assert!(!config.auth.jwt_secret.is_empty());
    }

    #[test]
    fn reads_every_setting() {
        let config = AppConfig::from_lookup(lookup(&[
            ("HELPDESK_BIND", "127.0.0.1:8080"),
            ("DATABASE_URL", "postgres://localhost/helpdesk"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("ELASTICSEARCH_URL", "http://localhost:9200"),
            ("KB_SEARCH_INDEX", "kb_test"),
            ("JWT_SECRET_KEY", "s3cret"),
            ("JWT_TTL_MINUTES", "30"),
            ("ARTICLES_PER_PAGE", "25"),
        ]))
        .expect("config");
        let database = config.database.expect("database");
        assert_eq!(database.url, "postgres://localhost/helpdesk");
        assert_eq!(database.max_connections, 12);
        assert_eq!(database.acquire_timeout_ms, DEFAULT_ACQUIRE_TIMEOUT_MS);
        assert_eq!(config.search.url.as_deref(), Some("http://localhost:9200"));
        assert_eq!(config.search.index, "kb_test");
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.auth.token_ttl_minutes, 30);
        assert_eq!(config.articles_per_page, 25);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(AppConfig::from_lookup(lookup(&[("HELPDESK_BIND", "nope")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("ARTICLES_PER_PAGE", "0")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("JWT_TTL_MINUTES", "soon")])).is_err());
    }

    #[test]
    fn debug_output_redacts_secret() {
        let config = AppConfig::from_lookup(lookup(&[("JWT_SECRET_KEY", "s3cret")])).unwrap();
        assert!(!format!("{:?}", config.auth).contains("s3cret"));
    }
}
