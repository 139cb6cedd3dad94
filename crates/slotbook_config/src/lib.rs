// --- File: crates/slotbook_config/src/lib.rs ---
use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub mod env_vars;
pub mod models;
pub use models::*;

/// Loads the application configuration.
///
/// Sources, later ones winning:
/// `{CONFIG_DIR}/default.*`, `{CONFIG_DIR}/{RUN_ENV}.*`, then `SLOTBOOK__*` environment
/// variables. `CONFIG_DIR` defaults to `config` and `RUN_ENV` to `debug`.
/// Secrets marked `"secret_from_env"` are injected last.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let config_dir = env::var("CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));

    load_config_from(&config_dir, &run_env)
}

/// Same as [`load_config`] but with an explicit directory and run environment,
/// and without touching the dotenv file.
pub fn load_config_from(config_dir: &Path, run_env: &str) -> Result<AppConfig, ConfigError> {
    let prefix = env_vars::get_config_prefix();

    let default_path = config_dir.join("default");
    let env_path = config_dir.join(run_env);
    debug!(
        "Loading configuration from {} and {}",
        default_path.display(),
        env_path.display()
    );

    let builder = Config::builder()
        .add_source(File::from(default_path).required(false))
        .add_source(File::from(env_path).required(false))
        .add_source(Environment::with_prefix(&prefix).separator(env_vars::CONFIG_SEPARATOR));

    let raw_config: AppConfig = builder.build()?.try_deserialize()?;
    apply_env_overrides_from_marker(raw_config)
}

/// Applies environment overrides based on "secret_from_env" markers in the serialized config.
///
/// An admin section whose reset code could not be resolved is dropped, which disables
/// the reset operation instead of accepting the marker itself as the code.
pub fn apply_env_overrides_from_marker(config: AppConfig) -> Result<AppConfig, ConfigError> {
    let mut json = serde_json::to_value(&config)
        .map_err(|e| ConfigError::Message(format!("AppConfig is not serializable: {}", e)))?;
    env_vars::inject_env_vars(&mut json);
    let mut config: AppConfig = serde_json::from_value(json)
        .map_err(|e| ConfigError::Message(format!("AppConfig is not deserializable: {}", e)))?;

    if config
        .admin
        .as_ref()
        .is_some_and(|admin| admin.reset_code == env_vars::SECRET_MARKER)
    {
        warn!("Admin reset code is not set; the reset operation is disabled");
        config.admin = None;
    }
    Ok(config)
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Ensures that the dotenv file is loaded into the environment variables, once per process.
///
/// `DOTENV_OVERRIDE` wins, then a first command line argument starting with `.env`,
/// then `.env`. Returns the path that was selected.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path_override = env::var("DOTENV_OVERRIDE").ok();
    let dotenv_path_arg = env::args().nth(1).filter(|s| s.starts_with(".env"));

    let dotenv_path = dotenv_path_override
        .or(dotenv_path_arg)
        .unwrap_or_else(|| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}
