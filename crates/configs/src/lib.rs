use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

/// Longest admin session a config may ask for (one year).
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub feedback: FeedbackConfig,
    #[serde(default)]
    pub admin: AdminConfig,
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
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: None }
    }
}

/// Where the record collection and the rate-limit marker live on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_records_file")]
    pub records_file: String,
    #[serde(default = "default_marker_file")]
    pub marker_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            records_file: default_records_file(),
            marker_file: default_marker_file(),
        }
    }
}

impl StorageConfig {
    pub fn records_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.data_dir).join(&self.records_file)
    }

    pub fn marker_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.data_dir).join(&self.marker_file)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackConfig {
    #[serde(default = "default_rate_limit_ms")]
    pub rate_limit_ms: u64,
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            rate_limit_ms: default_rate_limit_ms(),
            min_chars: default_min_chars(),
            max_chars: default_max_chars(),
        }
    }
}

/// Credentials for the single administrator account.
/// `password_hash` is an argon2 PHC string, never a plain password.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_username")]
    pub username: String,
    #[serde(default)]
    pub password_hash: String,
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: default_admin_username(),
            password_hash: String::new(),
            jwt_secret: String::new(),
            token_ttl_hours: default_token_ttl_hours(),
        }
    }
}

fn default_data_dir() -> String {
    "data".into()
}
fn default_records_file() -> String {
    "feedbacks.json".into()
}
fn default_marker_file() -> String {
    "last_submit.json".into()
}
fn default_rate_limit_ms() -> u64 {
    60_000
}
fn default_min_chars() -> usize {
    50
}
fn default_max_chars() -> usize {
    500
}
fn default_admin_username() -> String {
    "admin".into()
}
fn default_token_ttl_hours() -> i64 {
    12
}

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&config_path())
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
    /// Load `config.toml` (or `CONFIG_PATH`), falling back to env vars and
    /// defaults when the file is missing, then validate.
    pub fn load_and_validate() -> Result<Self> {
        let path = config_path();
        let mut cfg = if std::path::Path::new(&path).exists() {
            load_from_file(&path)?
        } else {
            AppConfig::default()
        };
        cfg.apply_env();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Env vars fill in anything the file left empty; host/port/data dir
    /// from env always win.
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Ok(dir) = std::env::var("DATA_DIR") {
            self.storage.data_dir = dir;
        }
        self.admin.normalize_from_env();
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.validate()?;
        self.feedback.validate()?;
        self.admin.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        if self.worker_threads == Some(0) {
            self.worker_threads = None;
        }
        Ok(())
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        if self.data_dir.trim().is_empty() {
            return Err(anyhow!("storage.data_dir is empty"));
        }
        if self.records_file.trim().is_empty() || self.marker_file.trim().is_empty() {
            return Err(anyhow!("storage file names must not be empty"));
        }
        if self.records_file == self.marker_file {
            return Err(anyhow!("storage.records_file and storage.marker_file must differ"));
        }
        Ok(())
    }
}

impl FeedbackConfig {
    fn validate(&self) -> Result<()> {
        if self.rate_limit_ms == 0 {
            return Err(anyhow!("feedback.rate_limit_ms must be > 0"));
        }
        if self.min_chars > self.max_chars {
            return Err(anyhow!("feedback.min_chars must be <= feedback.max_chars"));
        }
        Ok(())
    }
}

impl AdminConfig {
    pub fn normalize_from_env(&mut self) {
        if let Ok(user) = std::env::var("ADMIN_USERNAME") {
            self.username = user;
        }
        if self.password_hash.trim().is_empty() {
            if let Ok(hash) = std::env::var("ADMIN_PASSWORD_HASH") {
                self.password_hash = hash;
            }
        }
        if self.jwt_secret.trim().is_empty() {
            if let Ok(secret) = std::env::var("JWT_SECRET") {
                self.jwt_secret = secret;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(anyhow!("admin.username is empty"));
        }
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&self.token_ttl_hours) {
            return Err(anyhow!("admin.token_ttl_hours must be within 1..={MAX_TOKEN_TTL_HOURS}"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() -> Result<()> {
        let mut cfg = load_from_str("")?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.feedback.rate_limit_ms, 60_000);
        assert_eq!(cfg.feedback.min_chars, 50);
        assert_eq!(cfg.feedback.max_chars, 500);
        assert_eq!(cfg.admin.username, "admin");
        assert!(cfg.storage.records_path().ends_with("feedbacks.json"));
        Ok(())
    }

    #[test]
    fn partial_sections_keep_field_defaults() -> Result<()> {
        let cfg = load_from_str(
            r#"
            [feedback]
            rate_limit_ms = 1000

            [storage]
            data_dir = "/var/lib/feedback"
            "#,
        )?;
        assert_eq!(cfg.feedback.rate_limit_ms, 1000);
        assert_eq!(cfg.feedback.max_chars, 500);
        assert_eq!(
            cfg.storage.marker_path(),
            std::path::Path::new("/var/lib/feedback").join("last_submit.json")
        );
        Ok(())
    }

    #[test]
    fn rejects_inverted_length_bounds() -> Result<()> {
        let mut cfg = load_from_str("[feedback]\nmin_chars = 600\nmax_chars = 500\n")?;
        assert!(cfg.normalize_and_validate().is_err());
        Ok(())
    }

    #[test]
    fn rejects_zero_port_and_shared_files() -> Result<()> {
        let mut cfg = load_from_str("[server]\nhost = \"0.0.0.0\"\nport = 0\n")?;
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg =
            load_from_str("[storage]\nrecords_file = \"x.json\"\nmarker_file = \"x.json\"\n")?;
        assert!(cfg.normalize_and_validate().is_err());
        Ok(())
    }

    #[test]
    fn token_ttl_is_bounded() -> Result<()> {
        let mut cfg = load_from_str("[admin]\ntoken_ttl_hours = 10000000000000\n")?;
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = load_from_str("[admin]\ntoken_ttl_hours = 0\n")?;
        assert!(cfg.normalize_and_validate().is_err());

        let max = format!("[admin]\ntoken_ttl_hours = {MAX_TOKEN_TTL_HOURS}\n");
        let mut cfg = load_from_str(&max)?;
        cfg.normalize_and_validate()?;
        Ok(())
    }

    #[test]
    fn load_from_missing_file_errors() {
        let path = std::env::temp_dir().join(format!("missing_{}.toml", uuid::Uuid::new_v4()));
        assert!(load_from_file(&path.to_string_lossy()).is_err());
    }
}
