use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use once_cell::sync::Lazy;
use std::{env, time::Duration};
use tracing::info;

pub static DATABASE_URL: Lazy<String> = Lazy::new(|| {
    // Load .env if present
    let _ = dotenvy::dotenv();
    env::var("DATABASE_URL").unwrap_or_else(|_| configs::DEFAULT_SQLITE_URL.to_string())
});

/// Pool settings resolved from `config.toml` or the environment.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub acquire_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
    pub sqlx_logging: bool,
}

impl DatabaseConfig {
    pub fn from_app(cfg: &configs::DatabaseConfig) -> Self {
        Self {
            url: cfg.url.clone(),
            max_connections: cfg.max_connections,
            min_connections: cfg.min_connections,
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            acquire_timeout: Duration::from_secs(cfg.acquire_timeout_secs),
            idle_timeout: Some(Duration::from_secs(cfg.idle_timeout_secs)),
            max_lifetime: Some(Duration::from_secs(cfg.max_lifetime_secs)),
            sqlx_logging: cfg.sqlx_logging,
        }
    }

    pub fn from_file() -> anyhow::Result<Self> {
        let mut cfg = configs::load_default()?.database;
        cfg.normalize_from_env();
        cfg.validate()?;
        Ok(Self::from_app(&cfg))
    }

    pub fn from_env() -> Self {
        let defaults = configs::DatabaseConfig::default();
        Self { url: DATABASE_URL.clone(), ..Self::from_app(&defaults) }
    }

    /// Single long-lived connection to a private in-memory SQLite database.
    /// Every pooled connection to `:memory:` opens a new empty database, so the
    /// pool is pinned to one connection that never idles out.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            acquire_timeout: Duration::from_secs(10),
            idle_timeout: None,
            max_lifetime: None,
            sqlx_logging: false,
        }
    }
}

pub async fn connect() -> anyhow::Result<DatabaseConnection> {
    let cfg = DatabaseConfig::from_file().unwrap_or_else(|_| DatabaseConfig::from_env());
    connect_with_config(&cfg).await
}

pub async fn connect_with_config(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let mut opt = ConnectOptions::new(cfg.url.clone());
    opt.max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(cfg.connect_timeout)
        .acquire_timeout(cfg.acquire_timeout)
        .sqlx_logging(cfg.sqlx_logging);
    if let Some(idle) = cfg.idle_timeout {
        opt.idle_timeout(idle);
    }
    if let Some(lifetime) = cfg.max_lifetime {
        opt.max_lifetime(lifetime);
    }
    let db = Database::connect(opt).await?;
    info!(backend = ?db.get_database_backend(), max_connections = cfg.max_connections, "database connected");
    Ok(db)
}
