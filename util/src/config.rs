//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from environment variables. It provides
//! thread-safe access and mutation for testing or overrides in runtime environments.
//!
//! Free functions at the bottom of this module (`config::database_path()`, ...)
//! are the usual way the rest of the workspace reads a value.

use std::env;
use std::sync::{OnceLock, RwLock};

/// Secret used when `JWT_SECRET` is unset. Refused outside development.
pub const DEV_JWT_SECRET: &str = "anytask-dev-secret";

/// Represents the complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    /// `LOG_LEVEL`; each binary has its own default filter when unset.
    pub log_level: Option<String>,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub database_path: String,
    pub storage_root: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_duration_minutes: u64,
    pub login_url: String,
    pub history_language: String,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub s3_path_prefix: String,
    pub rb_url: Option<String>,
    pub rb_username: String,
    pub rb_password: String,
    pub status_transitions: Option<String>,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{key} has an invalid value: {raw}")),
        Err(_) => default,
    }
}

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// This method is used internally to populate the singleton. It panics
    /// if a variable is present but improperly formatted.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "anytask".into()),
            log_level: optional("LOG_LEVEL"),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "api.log".into()),
            log_to_stdout: env::var("LOG_TO_STDOUT").unwrap_or_else(|_| "false".into()) == "true",
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/anytask.db".into()),
            storage_root: env::var("STORAGE_ROOT").unwrap_or_else(|_| "data/media".into()),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port: parsed("PORT", 3000),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| DEV_JWT_SECRET.into()),
            jwt_duration_minutes: parsed("JWT_DURATION_MINUTES", 60),
            login_url: env::var("LOGIN_URL").unwrap_or_else(|_| "/accounts/login/".into()),
            history_language: env::var("HISTORY_LANGUAGE").unwrap_or_else(|_| "ru".into()),
            s3_bucket: optional("S3_BUCKET"),
            s3_region: optional("S3_REGION"),
            s3_endpoint: optional("S3_ENDPOINT"),
            s3_path_prefix: env::var("S3_PATH_PREFIX").unwrap_or_else(|_| "s3/".into()),
            rb_url: optional("RB_URL"),
            rb_username: env::var("RB_USERNAME").unwrap_or_default(),
            rb_password: env::var("RB_PASSWORD").unwrap_or_default(),
            status_transitions: optional("STATUS_TRANSITIONS"),
        }
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// # Panics
    /// Panics if the lock cannot be acquired.
    pub fn global() -> std::sync::RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Resets the configuration by reloading from environment variables.
    ///
    /// Useful in tests to clear overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = lock
                .write()
                .expect("Failed to acquire AppConfig write lock");
            *guard = AppConfig::from_env();
        }
    }

    /// Generic internal setter for any field in the config.
    ///
    /// Used by public per-field setter methods.
    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock
            .write()
            .expect("Failed to acquire AppConfig write lock");
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    /// Override `env` value.
    pub fn set_env(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.env = value.into());
    }

    pub fn set_log_level(value: Option<String>) {
        AppConfig::set_field(|cfg| cfg.log_level = value);
    }

    pub fn set_log_to_stdout(value: bool) {
        AppConfig::set_field(|cfg| cfg.log_to_stdout = value);
    }

    pub fn set_database_path(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.database_path = value.into());
    }

    pub fn set_storage_root(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.storage_root = value.into());
    }

    pub fn set_jwt_secret(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.jwt_secret = value.into());
    }

    pub fn set_jwt_duration_minutes(value: impl Into<u64>) {
        AppConfig::set_field(|cfg| cfg.jwt_duration_minutes = value.into());
    }

    pub fn set_login_url(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.login_url = value.into());
    }

    pub fn set_history_language(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.history_language = value.into());
    }

    pub fn set_s3_endpoint(value: Option<String>) {
        AppConfig::set_field(|cfg| cfg.s3_endpoint = value);
    }

    pub fn set_s3_bucket(value: Option<String>) {
        AppConfig::set_field(|cfg| cfg.s3_bucket = value);
    }

    pub fn set_s3_path_prefix(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.s3_path_prefix = value.into());
    }

    pub fn set_rb_url(value: Option<String>) {
        AppConfig::set_field(|cfg| cfg.rb_url = value);
    }

    pub fn set_status_transitions(value: Option<String>) {
        AppConfig::set_field(|cfg| cfg.status_transitions = value);
    }
}

// --- Accessors ---

pub fn env() -> String {
    AppConfig::global().env.clone()
}

pub fn project_name() -> String {
    AppConfig::global().project_name.clone()
}

pub fn log_level() -> Option<String> {
    AppConfig::global().log_level.clone()
}

pub fn log_file() -> String {
    AppConfig::global().log_file.clone()
}

pub fn log_to_stdout() -> bool {
    AppConfig::global().log_to_stdout
}

pub fn database_path() -> String {
    AppConfig::global().database_path.clone()
}

pub fn storage_root() -> String {
    AppConfig::global().storage_root.clone()
}

pub fn host() -> String {
    AppConfig::global().host.clone()
}

pub fn port() -> u16 {
    AppConfig::global().port
}

pub fn jwt_secret() -> String {
    AppConfig::global().jwt_secret.clone()
}

pub fn jwt_duration_minutes() -> u64 {
    AppConfig::global().jwt_duration_minutes
}

pub fn login_url() -> String {
    AppConfig::global().login_url.clone()
}

pub fn history_language() -> String {
    AppConfig::global().history_language.clone()
}

pub fn s3_bucket() -> Option<String> {
    AppConfig::global().s3_bucket.clone()
}

pub fn s3_region() -> Option<String> {
    AppConfig::global().s3_region.clone()
}

pub fn s3_endpoint() -> Option<String> {
    AppConfig::global().s3_endpoint.clone()
}

pub fn s3_path_prefix() -> String {
    AppConfig::global().s3_path_prefix.clone()
}

pub fn rb_url() -> Option<String> {
    AppConfig::global().rb_url.clone()
}

pub fn rb_username() -> String {
    AppConfig::global().rb_username.clone()
}

pub fn rb_password() -> String {
    AppConfig::global().rb_password.clone()
}

pub fn status_transitions() -> Option<String> {
    AppConfig::global().status_transitions.clone()
}
