use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Root directory served under `static_url_prefix`. Images live in `images/` below it.
    pub storage_dir: PathBuf,
    pub static_url_prefix: String,
    pub max_upload_bytes: usize,
    /// Drop and recreate every table before serving.
    pub reset_db_on_startup: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://annotations.db?mode=rwc".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
            storage_dir: PathBuf::from("static"),
            static_url_prefix: "/static".to_string(),
            max_upload_bytes: 50 * 1024 * 1024,
            reset_db_on_startup: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let static_url_prefix = match lookup("STATIC_URL_PREFIX") {
            Some(value) => {
                let trimmed = value.trim().trim_matches('/');
                // Static files cannot be mounted at the root, the API lives there.
                if trimmed.is_empty() {
                    return Err(ConfigError::Invalid {
                        key: "STATIC_URL_PREFIX",
                        value,
                    });
                }
                format!("/{trimmed}")
            }
            None => defaults.static_url_prefix,
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "PORT", defaults.port)?,
            storage_dir: lookup("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            static_url_prefix,
            max_upload_bytes: parse_var(&lookup, "MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            reset_db_on_startup: parse_var(
                &lookup,
                "RESET_DB_ON_STARTUP",
                defaults.reset_db_on_startup,
            )?,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
