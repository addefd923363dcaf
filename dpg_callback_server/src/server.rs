use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use douyin_openapi::CallbackDecoder;
use log::*;

use crate::{config::ServerConfig, errors::ServerError, hooks::CallbackHooks, routes};

pub async fn run_server(config: ServerConfig, hooks: CallbackHooks) -> Result<(), ServerError> {
    let srv = create_server_instance(config, hooks)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, hooks: CallbackHooks) -> Result<Server, ServerError> {
    let decoder = CallbackDecoder::from_config(&config.openapi, config.check_signatures).map_err(|e| {
        error!("🔐️ Cannot verify callbacks with the current configuration. {e}");
        ServerError::InitializeError(e.to_string())
    })?;
    info!("💻️ Callback signature checks are {}", if decoder.checks_signatures() { "enabled" } else { "DISABLED" });
    let decoder = web::Data::new(decoder);
    let hooks = web::Data::new(hooks);
    let srv = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("dpg::access_log"))
            .app_data(decoder.clone())
            .app_data(hooks.clone())
            .configure(routes::configure)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
