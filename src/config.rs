use crate::progress::DEFAULT_STORAGE_KEY;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressBackend {
    /// Durable, shared by every process using the same database
    Sqlite,
    /// Gone when the process exits
    Memory,
}

#[derive(Debug)]
pub struct Config {
    pub content_base_url: String,
    pub content_api_key: String,
    pub progress_backend: String,
    pub db_connection_string: String,
    pub progress_storage_key: String,
    pub bind_addr: String,
}

const DEFAULT_PROGRESS_BACKEND: &str = "sqlite";
const DEFAULT_DB_CONNECTION_STRING: &str = "sqlite://db.sqlite?mode=rwc";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

impl Config {
    pub fn load() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Config {
            content_base_url: lookup("CONTENT_BASE_URL").unwrap_or_default(),
            content_api_key: lookup("CONTENT_API_KEY").unwrap_or_default(),
            progress_backend: lookup("PROGRESS_BACKEND")
                .unwrap_or(DEFAULT_PROGRESS_BACKEND.into()),
            db_connection_string: lookup("DB_CONNECTION_STRING")
                .unwrap_or(DEFAULT_DB_CONNECTION_STRING.into()),
            progress_storage_key: lookup("PROGRESS_STORAGE_KEY")
                .unwrap_or(DEFAULT_STORAGE_KEY.into()),
            bind_addr: lookup("BIND_ADDR").unwrap_or(DEFAULT_BIND_ADDR.into()),
        }
    }

    pub fn backend(&self) -> Result<ProgressBackend, String> {
        match self.progress_backend.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(ProgressBackend::Sqlite),
            "memory" => Ok(ProgressBackend::Memory),
            other => Err(format!(
                "PROGRESS_BACKEND must be 'sqlite' or 'memory', got '{}'",
                other
            )),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.content_base_url.is_empty() {
            return Err("CONTENT_BASE_URL is missing".into());
        }
        if self.progress_storage_key.is_empty() {
            return Err("PROGRESS_STORAGE_KEY must not be empty".into());
        }
        self.backend()?;
        Ok(())
    }
}
