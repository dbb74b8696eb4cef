use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub uploads: UploadsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 3333, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
    /// Run pending migrations when the server starts.
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
            run_migrations: true,
        }
    }
}

/// Where uploaded images live and how clients reach them.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadsConfig {
    #[serde(default = "default_uploads_dir")]
    pub dir: String,
    /// Public address prefixed to `/uploads/<file>` in responses.
    #[serde(default)]
    pub public_url: String,
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self { dir: default_uploads_dir(), public_url: String::new(), max_bytes: default_max_bytes() }
    }
}

pub const DEFAULT_SQLITE_URL: &str = "sqlite://ecoleta.sqlite?mode=rwc";

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_true() -> bool { true }
fn default_uploads_dir() -> String { "uploads".into() }
fn default_max_bytes() -> usize { 5 * 1024 * 1024 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Config file when present, otherwise defaults filled from env vars.
    pub fn load_or_env() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_file_or_env(&path)
    }

    /// Only a missing file falls back to env; unreadable or malformed files are errors.
    pub fn load_file_or_env(path: &str) -> Result<Self> {
        let mut cfg = match std::fs::read_to_string(path) {
            Ok(content) => load_from_str(&content).map_err(|e| anyhow!("{path} 解析失败: {e}"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::from_env(),
            Err(e) => return Err(anyhow!("无法读取 {path}: {e}")),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        if let Ok(dir) = std::env::var("UPLOADS_DIR") {
            cfg.uploads.dir = dir;
        }
        // 无配置文件时回退到本地 sqlite
        cfg.database.url = std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_SQLITE_URL.to_string());
        cfg
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        // 归一化 server
        self.server.normalize()?;
        // 归一化 database（支持从环境变量填充 URL）
        self.database.normalize_from_env();
        self.database.validate()?;
        let (host, port) = (self.server.host.clone(), self.server.port);
        self.uploads.normalize(&host, port)?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port 必须在 1..=65535 范围内"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        // 若 TOML 中未提供 URL，则尝试从环境变量填充
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url 为空；请在 config.toml 或环境变量 DATABASE_URL 中提供"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://") || lower.starts_with("sqlite:")) {
            return Err(anyhow!("database.url 必须以 postgresql://、postgres:// 或 sqlite: 开头"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections 必须 >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections 必须 >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database 超时配置必须为正整数秒"));
        }
        Ok(())
    }
}

impl UploadsConfig {
    fn normalize(&mut self, host: &str, port: u16) -> Result<()> {
        self.resolve(host, port, std::env::var("PUBLIC_URL").ok())
    }

    fn resolve(&mut self, host: &str, port: u16, env_public_url: Option<String>) -> Result<()> {
        if self.dir.trim().is_empty() {
            self.dir = default_uploads_dir();
        }
        if self.public_url.trim().is_empty() {
            self.public_url = match env_public_url.filter(|u| !u.trim().is_empty()) {
                Some(url) => url,
                // 通配地址无法被客户端访问，不能拼进 image_url
                None if is_wildcard_host(host) => {
                    return Err(anyhow!("server.host 为 {host} 时必须设置 uploads.public_url 或 PUBLIC_URL"));
                }
                None => format!("http://{}:{}", host, port),
            };
        }
        let lower = self.public_url.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("uploads.public_url 必须以 http:// 或 https:// 开头"));
        }
        self.public_url = self.public_url.trim_end_matches('/').to_string();
        if self.max_bytes == 0 {
            self.max_bytes = default_max_bytes();
        }
        Ok(())
    }
}

fn is_wildcard_host(host: &str) -> bool {
    matches!(host.trim().trim_start_matches('[').trim_end_matches(']'), "0.0.0.0" | "::" | "0:0:0:0:0:0:0:0")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_file() {
        let cfg = load_from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 3333
            worker_threads = 2

            [database]
            url = "sqlite::memory:"
            min_connections = 1
            max_connections = 1

            [uploads]
            dir = "data/uploads"
            public_url = "http://192.168.1.17:3333/"
            "#,
        )
        .unwrap();
        let mut cfg = cfg;
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.worker_threads, Some(2));
        assert_eq!(cfg.uploads.dir, "data/uploads");
        assert_eq!(cfg.uploads.public_url, "http://192.168.1.17:3333");
        assert!(cfg.database.run_migrations);
    }

    #[test]
    fn rejects_unknown_database_scheme() {
        let mut cfg = load_from_str("[database]\nurl = \"mysql://localhost/ecoleta\"\n").unwrap();
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn rejects_inverted_pool_bounds() {
        let db = DatabaseConfig {
            url: "postgres://localhost/ecoleta".into(),
            min_connections: 5,
            max_connections: 2,
            ..DatabaseConfig::default()
        };
        assert!(db.validate().is_err());
    }

    #[test]
    fn zero_worker_threads_falls_back() {
        let mut server = ServerConfig { worker_threads: Some(0), ..ServerConfig::default() };
        server.normalize().unwrap();
        assert_eq!(server.worker_threads, Some(4));
    }

    #[test]
    fn rejects_non_http_public_url() {
        let mut uploads = UploadsConfig { public_url: "ftp://files".into(), ..UploadsConfig::default() };
        assert!(uploads.normalize("127.0.0.1", 3333).is_err());
    }

    #[test]
    fn malformed_file_is_an_error_not_a_fallback() {
        let path = std::env::temp_dir().join(format!("ecoleta-config-{}.toml", std::process::id()));
        std::fs::write(&path, "[server]\nhost = \"127.0.0.1\"\nport = \"x\"\n").unwrap();
        let err = AppConfig::load_file_or_env(&path.to_string_lossy()).unwrap_err();
        assert!(err.to_string().contains("解析失败"), "{err}");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_falls_back_to_env_defaults() {
        let path = std::env::temp_dir().join(format!("ecoleta-missing-{}.toml", std::process::id()));
        let cfg = AppConfig::load_file_or_env(&path.to_string_lossy()).unwrap();
        assert!(!cfg.database.url.is_empty());
        assert!(cfg.uploads.public_url.starts_with("http"));
    }

    #[test]
    fn wildcard_host_requires_public_url() {
        let mut uploads = UploadsConfig::default();
        assert!(uploads.resolve("0.0.0.0", 3333, None).is_err());
        assert!(UploadsConfig::default().resolve("[::]", 3333, None).is_err());

        let mut uploads_with_env = UploadsConfig::default();
        uploads_with_env.resolve("0.0.0.0", 3333, Some("http://192.168.1.17:3333/".into())).unwrap();
        assert_eq!(uploads_with_env.public_url, "http://192.168.1.17:3333");

        let mut local = UploadsConfig::default();
        local.resolve("127.0.0.1", 3333, None).unwrap();
        assert_eq!(local.public_url, "http://127.0.0.1:3333");
    }
}
