use std::env;

use douyin_openapi::OpenApiConfig;
use dpg_common::parse_boolean_flag;
use log::*;

const DEFAULT_DPG_HOST: &str = "127.0.0.1";
const DEFAULT_DPG_PORT: u16 = 8370;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// If false, callbacks are accepted without checking `msg_signature`. **DANGER**
    pub check_signatures: bool,
    /// App credentials. The callback token is taken from here.
    pub openapi: OpenApiConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DPG_HOST.to_string(),
            port: DEFAULT_DPG_PORT,
            check_signatures: true,
            openapi: OpenApiConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("DPG_HOST").ok().unwrap_or_else(|| DEFAULT_DPG_HOST.into());
        let port = env::var("DPG_PORT").ok().map(|s| parse_port(&s)).unwrap_or(DEFAULT_DPG_PORT);
        let check_signatures = parse_boolean_flag(env::var("DPG_CALLBACK_SIGNATURE_CHECKS").ok(), true);
        if !check_signatures {
            warn!(
                "🚨️ DPG_CALLBACK_SIGNATURE_CHECKS is off. Anyone who can reach this server can forge payment \
                 callbacks."
            );
        }
        let openapi = OpenApiConfig::new_from_env_or_default();
        Self { host, port, check_signatures, openapi }
    }
}

fn parse_port(s: &str) -> u16 {
    s.parse::<u16>().unwrap_or_else(|e| {
        error!("🪛️ {s} is not a valid port for DPG_PORT. {e} Using the default, {DEFAULT_DPG_PORT}, instead.");
        DEFAULT_DPG_PORT
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8370);
        assert!(config.check_signatures);
        let config = ServerConfig::new("0.0.0.0", 9000);
        assert_eq!(config.port, 9000);
        assert!(config.check_signatures);
    }

    #[test]
    fn invalid_ports_fall_back_to_default() {
        assert_eq!(parse_port("8080"), 8080);
        assert_eq!(parse_port("eighty"), DEFAULT_DPG_PORT);
        assert_eq!(parse_port("70000"), DEFAULT_DPG_PORT);
    }
}
