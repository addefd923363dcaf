//! Request handler definitions
//!
//! The platform POSTs every asynchronous result to a callback URL as a JSON envelope:
//! `{timestamp, nonce, msg, msg_signature, type}`. Each kind gets its own route here. All of them go through
//! [`handle_callback`]: the envelope is verified (unless checks are disabled), `msg` is decoded into the payload type
//! for the route, the matching hook runs, and only then is the platform acknowledged.
//!
//! Handlers never block the worker thread. Hooks are async and anything slow belongs in them.
use actix_web::{get, post, web, HttpResponse, Responder};
use douyin_openapi::{
    CallbackDecoder,
    PaymentNotification,
    RefundNotification,
    SettleNotification,
    WithdrawNotification,
};
use log::*;

use crate::{
    data_objects::CallbackAck,
    errors::ServerError,
    hooks::{CallbackHooks, HookedMessage},
};

/// Registers every route on the given service config. Used by the server and by the endpoint tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(payment_callback)
        .service(refund_callback)
        .service(settle_callback)
        .service(withdraw_callback);
}

#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

#[post("/callback/payment")]
pub async fn payment_callback(
    body: web::Bytes,
    decoder: web::Data<CallbackDecoder>,
    hooks: web::Data<CallbackHooks>,
) -> Result<HttpResponse, ServerError> {
    handle_callback::<PaymentNotification>(&body, &decoder, &hooks).await
}

#[post("/callback/refund")]
pub async fn refund_callback(
    body: web::Bytes,
    decoder: web::Data<CallbackDecoder>,
    hooks: web::Data<CallbackHooks>,
) -> Result<HttpResponse, ServerError> {
    handle_callback::<RefundNotification>(&body, &decoder, &hooks).await
}

#[post("/callback/settle")]
pub async fn settle_callback(
    body: web::Bytes,
    decoder: web::Data<CallbackDecoder>,
    hooks: web::Data<CallbackHooks>,
) -> Result<HttpResponse, ServerError> {
    handle_callback::<SettleNotification>(&body, &decoder, &hooks).await
}

#[post("/callback/withdraw")]
pub async fn withdraw_callback(
    body: web::Bytes,
    decoder: web::Data<CallbackDecoder>,
    hooks: web::Data<CallbackHooks>,
) -> Result<HttpResponse, ServerError> {
    handle_callback::<WithdrawNotification>(&body, &decoder, &hooks).await
}

pub async fn handle_callback<T: HookedMessage>(
    body: &[u8],
    decoder: &CallbackDecoder,
    hooks: &CallbackHooks,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received {} callback ({} bytes)", T::KIND, body.len());
    let callback = decoder.decode_body::<T>(body)?;
    info!("💻️ Accepted {} callback with nonce {}", T::KIND, callback.nonce);
    match T::hook(hooks) {
        Some(hook) => {
            let nonce = callback.nonce.clone();
            (**hook)(callback).await.map_err(|e| {
                error!("💻️ The {} hook failed for callback {nonce}. {e}", T::KIND);
                ServerError::HookFailed(e)
            })?;
            debug!("💻️ {} hook completed for callback {nonce}", T::KIND);
        },
        None => debug!("💻️ No hook is registered for {} callbacks", T::KIND),
    }
    Ok(HttpResponse::Ok().json(CallbackAck::success()))
}
