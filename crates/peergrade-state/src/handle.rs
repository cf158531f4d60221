//! SurrealDB handle and store selection.
//!
//! [`StoreConfig`] says where peergrade keeps its data; [`SurrealHandle::connect`]
//! opens it, selects the namespace/database and applies the schema.

use std::path::{Path, PathBuf};

use crate::error::StateError;
use crate::migrations;
use crate::Result;
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::{Database, Root};
use surrealdb::Surreal;
use tracing::{info, instrument};

const DEFAULT_NAMESPACE: &str = "peergrade";
const DEFAULT_DATABASE: &str = "main";

/// Where the data lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreTarget {
    /// Process-local, lost on exit.
    Memory,
    /// SurrealKV files under this directory, created if missing.
    Local(PathBuf),
    /// Any SurrealDB URL, no sign-in.
    Url(String),
    /// A SurrealDB server that requires credentials.
    Remote {
        endpoint: String,
        username: String,
        password: String,
        /// Sign in as a root user instead of a database user.
        root: bool,
    },
}

impl StoreTarget {
    fn describe(&self) -> String {
        match self {
            StoreTarget::Memory => "memory".to_string(),
            StoreTarget::Local(path) => format!("local:{}", path.display()),
            StoreTarget::Url(url) => url.clone(),
            StoreTarget::Remote { endpoint, .. } => endpoint.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub target: StoreTarget,
    pub namespace: String,
    pub database: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(StoreTarget::Memory)
    }
}

impl StoreConfig {
    pub fn new(target: StoreTarget) -> Self {
        Self {
            target,
            namespace: DEFAULT_NAMESPACE.to_string(),
            database: DEFAULT_DATABASE.to_string(),
        }
    }

    pub fn with_namespace(mut self, ns: impl Into<String>) -> Self {
        self.namespace = ns.into();
        self
    }

    pub fn with_database(mut self, db: impl Into<String>) -> Self {
        self.database = db.into();
        self
    }

    /// Resolve the store from process environment variables.
    ///
    /// See [`StoreConfig::from_lookup`] for the variables and their precedence.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve the store from a variable lookup.
    ///
    /// First match wins:
    /// 1. `SURREALDB_ENDPOINT`: remote server; `SURREALDB_USERNAME` and
    ///    `SURREALDB_PASSWORD` are then required, `SURREALDB_ROOT=true` signs
    ///    in as root.
    /// 2. `SURREALDB_URL`: unauthenticated connection to that URL.
    /// 3. `SURREALDB_PATH`: local SurrealKV directory.
    /// 4. In-memory.
    ///
    /// `SURREALDB_NAMESPACE` and `SURREALDB_DATABASE` apply to every target.
    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &str| {
            var(name).ok_or_else(|| {
                StateError::Connection(format!("SURREALDB_ENDPOINT is set but {name} is not"))
            })
        };

        let target = if let Some(endpoint) = var("SURREALDB_ENDPOINT") {
            StoreTarget::Remote {
                endpoint,
                username: required("SURREALDB_USERNAME")?,
                password: required("SURREALDB_PASSWORD")?,
                root: var("SURREALDB_ROOT").is_some_and(|v| v.eq_ignore_ascii_case("true")),
            }
        } else if let Some(url) = var("SURREALDB_URL") {
            StoreTarget::Url(url)
        } else if let Some(path) = var("SURREALDB_PATH") {
            StoreTarget::Local(PathBuf::from(path))
        } else {
            StoreTarget::Memory
        };

        let mut config = Self::new(target);
        if let Some(ns) = var("SURREALDB_NAMESPACE") {
            config.namespace = ns;
        }
        if let Some(db) = var("SURREALDB_DATABASE") {
            config.database = db;
        }
        Ok(config)
    }
}

/// SurrealDB connection handle shared by the peergrade stores
#[derive(Clone)]
pub struct SurrealHandle {
    db: Surreal<Any>,
}

impl SurrealHandle {
    /// Open the configured store and apply the schema.
    #[instrument(skip(config), fields(target = %config.target.describe(), namespace = %config.namespace, database = %config.database))]
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let db = match &config.target {
            StoreTarget::Memory => open("mem://").await?,
            StoreTarget::Local(path) => {
                std::fs::create_dir_all(path).map_err(|e| {
                    StateError::Connection(format!(
                        "Failed to create database directory {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                open(&format!("surrealkv://{}", path.display())).await?
            }
            StoreTarget::Url(url) => open(url).await?,
            StoreTarget::Remote {
                endpoint,
                username,
                password,
                root,
            } => {
                let db = open(endpoint).await?;
                let signed_in = if *root {
                    db.signin(Root {
                        username: username.as_str(),
                        password: password.as_str(),
                    })
                    .await
                    .map(|_| ())
                } else {
                    db.signin(Database {
                        namespace: &config.namespace,
                        database: &config.database,
                        username: username.as_str(),
                        password: password.as_str(),
                    })
                    .await
                    .map(|_| ())
                };
                signed_in.map_err(|e| {
                    StateError::Connection(format!("Authentication to {endpoint} failed: {e}"))
                })?;
                db
            }
        };

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await
            .map_err(|e| {
                StateError::Connection(format!("Failed to select namespace/database: {}", e))
            })?;

        migrations::init_schema(&db).await?;

        info!("SurrealDB connected and schema initialized");
        Ok(SurrealHandle { db })
    }

    /// In-memory database with the default namespace.
    pub async fn setup_db() -> Result<Self> {
        Self::connect(&StoreConfig::default()).await
    }

    /// Open (or create) a local SurrealKV database under `path`.
    pub async fn setup_local(path: impl AsRef<Path>) -> Result<Self> {
        Self::connect(&StoreConfig::new(StoreTarget::Local(path.as_ref().to_path_buf()))).await
    }

    /// Resolve [`StoreConfig::from_env`] and connect.
    pub async fn setup_from_env() -> Result<Self> {
        Self::connect(&StoreConfig::from_env()?).await
    }

    /// Underlying client, for the store implementations
    pub(crate) fn db(&self) -> &Surreal<Any> {
        &self.db
    }
}

async fn open(url: &str) -> Result<Surreal<Any>> {
    surrealdb::engine::any::connect(url)
        .await
        .map_err(|e| StateError::Connection(format!("Failed to connect to {url}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn resolve(vars: &[(&str, &str)]) -> Result<StoreConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StoreConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[tokio::test]
    async fn test_surreal_connection_and_schema_creation() {
        let handle = SurrealHandle::setup_db().await;
        assert!(handle.is_ok(), "Failed to connect: {:?}", handle.err());
    }

    #[tokio::test]
    async fn test_schema_init_is_idempotent() {
        let handle = SurrealHandle::setup_db().await.unwrap();
        migrations::init_schema(handle.db()).await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_honours_namespace_and_database() {
        let config = StoreConfig::default()
            .with_namespace("school")
            .with_database("spring");
        let handle = SurrealHandle::connect(&config).await.unwrap();
        let mut res = handle
            .db()
            .query("RETURN [session::ns(), session::db()]")
            .await
            .unwrap();
        let selected: Option<Vec<String>> = Some(res.take::<Vec<String>>(0).unwrap());
        assert_eq!(selected, Some(vec!["school".to_string(), "spring".to_string()]));
    }

    #[test]
    fn test_nothing_set_is_memory_with_defaults() {
        let config = resolve(&[]).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.namespace, "peergrade");
        assert_eq!(config.database, "main");
    }

    #[test]
    fn test_path_selects_local_store() {
        let config = resolve(&[("SURREALDB_PATH", "/var/lib/peergrade")]).unwrap();
        assert_eq!(
            config.target,
            StoreTarget::Local(PathBuf::from("/var/lib/peergrade"))
        );
    }

    #[test]
    fn test_precedence_endpoint_then_url_then_path() {
        let config = resolve(&[
            ("SURREALDB_URL", "ws://db:8000"),
            ("SURREALDB_PATH", "/data"),
        ])
        .unwrap();
        assert_eq!(config.target, StoreTarget::Url("ws://db:8000".to_string()));

        let config = resolve(&[
            ("SURREALDB_ENDPOINT", "wss://cloud"),
            ("SURREALDB_USERNAME", "grader"),
            ("SURREALDB_PASSWORD", "secret"),
            ("SURREALDB_ROOT", "TRUE"),
            ("SURREALDB_URL", "ws://db:8000"),
            ("SURREALDB_NAMESPACE", "school"),
        ])
        .unwrap();
        assert_eq!(
            config.target,
            StoreTarget::Remote {
                endpoint: "wss://cloud".to_string(),
                username: "grader".to_string(),
                password: "secret".to_string(),
                root: true,
            }
        );
        assert_eq!(config.namespace, "school");
        assert_eq!(config.database, "main");
    }

    #[test]
    fn test_endpoint_without_credentials_is_an_error() {
        let err = resolve(&[("SURREALDB_ENDPOINT", "wss://cloud"), ("SURREALDB_USERNAME", "u")])
            .unwrap_err();
        assert!(err.to_string().contains("SURREALDB_PASSWORD"));
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = resolve(&[("SURREALDB_URL", "  "), ("SURREALDB_PATH", "/data")]).unwrap();
        assert_eq!(config.target, StoreTarget::Local(PathBuf::from("/data")));
    }
}
