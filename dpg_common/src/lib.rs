mod helpers;
mod secret;

pub use helpers::{parse_boolean_flag, read_secret_env};
pub use secret::Secret;
