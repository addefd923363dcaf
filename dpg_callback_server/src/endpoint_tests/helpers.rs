use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, App};
use douyin_openapi::{CallbackDecoder, CallbackVerifier};
use dpg_common::Secret;
use log::debug;
use serde_json::json;

use crate::{hooks::CallbackHooks, routes};

pub const TOKEN: &str = "callback-token";

pub fn verifier() -> CallbackVerifier {
    CallbackVerifier::new(Secret::new(TOKEN.to_string())).unwrap()
}

/// Builds a callback envelope signed with [`TOKEN`].
pub fn signed_envelope(kind: &str, msg: &str) -> String {
    let (timestamp, nonce) = ("1700000000", "nonce-7731");
    let signature = verifier().compute_signature(timestamp, nonce, msg);
    envelope(kind, msg, &signature)
}

pub fn envelope(kind: &str, msg: &str, signature: &str) -> String {
    json!({
        "timestamp": "1700000000",
        "nonce": "nonce-7731",
        "msg": msg,
        "msg_signature": signature,
        "type": kind,
    })
    .to_string()
}

pub async fn get_request(path: &str, decoder: CallbackDecoder, hooks: CallbackHooks) -> (StatusCode, String) {
    send(TestRequest::get().uri(path), decoder, hooks).await
}

pub async fn post_request(
    path: &str,
    body: String,
    decoder: CallbackDecoder,
    hooks: CallbackHooks,
) -> (StatusCode, String) {
    let req = TestRequest::post().uri(path).insert_header(("Content-Type", "application/json")).set_payload(body);
    send(req, decoder, hooks).await
}

async fn send(req: TestRequest, decoder: CallbackDecoder, hooks: CallbackHooks) -> (StatusCode, String) {
    let app = App::new()
        .app_data(web::Data::new(decoder))
        .app_data(web::Data::new(hooks))
        .configure(routes::configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::call_service(&service, req.to_request()).await.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}
