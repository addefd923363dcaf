use std::env;

use crate::Secret;

/// Parse a boolean flag from a string value, or return the given default value otherwise.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let value = match value {
        Some(v) => v,
        None => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Read a secret from the environment. Unset variables produce an empty secret, which downstream constructors reject.
pub fn read_secret_env(name: &str) -> Secret<String> {
    Secret::new(env::var(name).unwrap_or_default())
}
