use config::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

const ENV_PREFIX: &str = "SANDCOMMENTS_";

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub security: SecuritySettings,
    pub sandbox: SandboxSettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
    pub static_dir: PathBuf,
}

#[derive(Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
}

#[derive(Deserialize, Clone)]
pub struct SecuritySettings {
    /// When unset the key is kept in the settings table.
    pub csrf_keyfile: Option<PathBuf>,
    pub csrf_token_ttl_secs: u64,
    /// Comma separated origins comment submissions may redirect to.
    /// Empty means redirect targets are not checked.
    pub allowed_redirect_origins: String,
}

#[derive(Deserialize, Clone)]
pub struct SandboxSettings {
    pub enabled: bool,
    pub permissions_header: String,
    pub user_id_header: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        let env_map = collect_env_vars();
        let under_sandstorm = std::env::var("SANDSTORM").map(|v| v == "1").unwrap_or(false);

        let s = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("server.cors_origins", "*")?
            .set_default("server.static_dir", "static")?
            .set_default("database.url", "sqlite://data/comments.db")?
            .set_default("security.csrf_token_ttl_secs", 86_400)?
            .set_default("security.allowed_redirect_origins", "")?
            .set_default("sandbox.enabled", under_sandstorm)?
            .set_default("sandbox.permissions_header", "X-Sandstorm-Permissions")?
            .set_default("sandbox.user_id_header", "X-Sandstorm-User-Id")?
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::File::with_name(&format!("config.{}", run_mode)).required(false))
            .add_source(config::File::from_str(
                &serde_json::to_string(&env_map)
                    .expect("Environment variables should serialize to JSON"),
                config::FileFormat::Json,
            ))
            .build()?;

        s.try_deserialize()
    }
}

fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with(ENV_PREFIX))
        .map(|(k, v)| {
            let new_key = k
                .trim_start_matches(ENV_PREFIX)
                .replace("__", ".")
                .to_lowercase();
            (new_key, v)
        })
        .collect()
}
