//! Environment variable naming for the slotbook service.
//!
//! Plain settings are read by the `config` crate from `SLOTBOOK__<SECTION>__<KEY>`.
//! Secrets live in `SLOTBOOK_SECRET_<SECTION>_<KEY>` and are injected wherever the
//! configuration files carry the `"secret_from_env"` marker.

use serde_json::Value;
use std::env;
use tracing::warn;

/// The default prefix for configuration environment variables
pub const DEFAULT_PREFIX: &str = "SLOTBOOK";

/// The prefix for secret environment variables
pub const SECRET_PREFIX: &str = "SLOTBOOK_SECRET";

/// The separator for configuration environment variables
pub const CONFIG_SEPARATOR: &str = "__";

/// The separator for secret environment variables
pub const SECRET_SEPARATOR: &str = "_";

/// Marker value that asks for a secret to be read from the environment.
pub const SECRET_MARKER: &str = "secret_from_env";

/// Get the prefix for configuration environment variables
pub fn get_config_prefix() -> String {
    env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

/// Convert a configuration path (e.g. `server.port`) to its variable name
/// (e.g. `SLOTBOOK__SERVER__PORT`).
pub fn config_path_to_env_var(path: &str) -> String {
    let prefix = get_config_prefix();
    let path = path.replace('.', CONFIG_SEPARATOR);
    format!("{}{}{}", prefix, CONFIG_SEPARATOR, path).to_uppercase()
}

/// Convert a secret path (e.g. `admin.reset_code`) to its variable name
/// (e.g. `SLOTBOOK_SECRET_ADMIN_RESET_CODE`).
pub fn secret_path_to_env_var(path: &str) -> String {
    let path = path.replace('.', SECRET_SEPARATOR);
    format!("{}{}{}", SECRET_PREFIX, SECRET_SEPARATOR, path).to_uppercase()
}

/// Paths containing "secret", "code", "password", "token" or "key" are treated as secrets.
pub fn is_secret_path(path: &str) -> bool {
    let path_lower = path.to_lowercase();
    ["secret", "code", "password", "token", "key"]
        .iter()
        .any(|needle| path_lower.contains(needle))
}

/// Get the environment value for a path, using the secret naming scheme when the
/// path looks like a secret.
pub fn get_env_var(path: &str) -> Option<String> {
    let name = if is_secret_path(path) {
        secret_path_to_env_var(path)
    } else {
        config_path_to_env_var(path)
    };
    env::var(name).ok()
}

/// Replace every `"secret_from_env"` string in `value` with the matching
/// environment variable. Returns how many markers were replaced.
///
/// Markers without a matching variable are left in place and logged.
pub fn inject_env_vars(value: &mut Value) -> usize {
    fn walk(path: Vec<String>, obj: &mut Value) -> usize {
        let mut replaced = 0;
        match obj {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    let mut new_path = path.clone();
                    new_path.push(k.to_string());
                    replaced += walk(new_path, v);
                }
            }
            Value::String(s) if s == SECRET_MARKER => {
                let dotted = path.join(".");
                match get_env_var(&dotted) {
                    Some(env_val) => {
                        *obj = Value::String(env_val);
                        replaced += 1;
                    }
                    None => warn!(
                        "No environment value found for {} (expected {})",
                        dotted,
                        secret_path_to_env_var(&dotted)
                    ),
                }
            }
            _ => {}
        }

        replaced
    }

    walk(vec![], value)
}
