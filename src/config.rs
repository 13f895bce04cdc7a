use crate::error::{Error, Result};
use crate::models::employer::EmployerTargets;
use crate::services::loader_service::LoadMode;
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;

pub const DEFAULT_HH_API_URL: &str = "https://api.hh.ru/vacancies";
pub const DEFAULT_USER_AGENT: &str = "hh-vacancies/0.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("expected `text` or `json`, got `{}`", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub hh_api_url: url::Url,
    pub hh_user_agent: String,
    pub http_timeout_secs: u64,
    pub snapshot_dir: PathBuf,
    pub employers: EmployerTargets,
    pub load_mode: LoadMode,
    pub db_max_connections: u32,
    pub log_format: LogFormat,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let hh_api_url = get_env_or("HH_API_URL", DEFAULT_HH_API_URL);
        let hh_api_url = url::Url::parse(&hh_api_url)
            .map_err(|e| Error::Config(format!("Invalid value for HH_API_URL: {}", e)))?;

        let employers = match env::var("EMPLOYERS_FILE") {
            Ok(path) => EmployerTargets::from_file(&path)?,
            Err(_) => EmployerTargets::default(),
        };

        Ok(Self {
            database_url: get_env("DATABASE_URL")?,
            hh_api_url,
            hh_user_agent: get_env_or("HH_USER_AGENT", DEFAULT_USER_AGENT),
            http_timeout_secs: get_env_parse_or("HTTP_TIMEOUT_SECS", 30)?,
            snapshot_dir: PathBuf::from(get_env_or("SNAPSHOT_DIR", "snapshots")),
            employers,
            load_mode: get_env_parse_or("LOAD_MODE", LoadMode::Append)?,
            db_max_connections: get_env_parse_or("DB_MAX_CONNECTIONS", 5)?,
            log_format: get_env_parse_or("LOG_FORMAT", LogFormat::Text)?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> Result<&'static Config> {
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("Configuration has not been initialized".to_string()))
}
