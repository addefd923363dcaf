use std::env;

use dpg_common::{parse_boolean_flag, read_secret_env, Secret};
use log::*;

use crate::{callback::CallbackVerifier, signer::RequestSigner, OpenApiError};

pub const PRODUCTION_BASE_URL: &str = "https://developer.toutiao.com";
pub const SANDBOX_BASE_URL: &str = "https://open-sandbox.douyin.com";

/// Credentials for one mini-app integration. The salt signs outbound requests, the token verifies inbound callbacks.
/// The two are never interchangeable.
#[derive(Debug, Clone, Default)]
pub struct OpenApiConfig {
    pub app_id: String,
    pub app_secret: Secret<String>,
    pub salt: Secret<String>,
    pub token: Secret<String>,
    pub sandbox: bool,
}

impl OpenApiConfig {
    pub fn new_from_env_or_default() -> Self {
        let app_id = env::var("DPG_APP_ID").unwrap_or_else(|_| {
            warn!("🪛️ DPG_APP_ID not set. Signed requests will be rejected by the platform.");
            String::default()
        });
        let app_secret = read_secret_env("DPG_APP_SECRET");
        if app_secret.is_blank() {
            warn!("🪛️ DPG_APP_SECRET not set. code2session calls will fail.");
        }
        let salt = read_secret_env("DPG_SALT");
        if salt.is_blank() {
            warn!("🪛️ DPG_SALT not set. Requests cannot be signed until it is configured.");
        }
        let token = read_secret_env("DPG_TOKEN");
        if token.is_blank() {
            warn!("🪛️ DPG_TOKEN not set. Callback signatures cannot be verified until it is configured.");
        }
        let sandbox = parse_boolean_flag(env::var("DPG_SANDBOX").ok(), false);
        if sandbox {
            info!("🪛️ Using the sandbox environment at {SANDBOX_BASE_URL}");
        }
        Self { app_id, app_secret, salt, token, sandbox }
    }

    pub fn base_url(&self) -> &'static str {
        if self.sandbox {
            SANDBOX_BASE_URL
        } else {
            PRODUCTION_BASE_URL
        }
    }

    pub fn api_url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url())
    }

    pub fn request_signer(&self) -> Result<RequestSigner, OpenApiError> {
        RequestSigner::new(self.salt.clone())
    }

    pub fn callback_verifier(&self) -> Result<CallbackVerifier, OpenApiError> {
        CallbackVerifier::new(self.token.clone())
    }
}
