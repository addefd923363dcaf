use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
    Mutex,
};

use actix_web::http::StatusCode;
use douyin_openapi::CallbackDecoder;
use futures::FutureExt;

use super::helpers::{envelope, get_request, post_request, signed_envelope, verifier};
use crate::{
    data_objects::CallbackAck,
    hooks::{CallbackHooks, HookResult},
};

const PAYMENT_MSG: &str = concat!(
    r#"{"appid":"tt07e3715e98c9aac0","cp_orderno":"7056505317450041644","way":"2","#,
    r#""total_amount":100,"status":"SUCCESS","paid_at":1700000000}"#
);
const SUCCESS_ACK: &str = r#"{"err_no":0,"err_tips":"success"}"#;

fn verified_decoder() -> CallbackDecoder {
    CallbackDecoder::verified(verifier())
}

/// Payment hooks that record the order number of every payment they see.
fn recording_hooks() -> (CallbackHooks, Arc<Mutex<Vec<String>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut hooks = CallbackHooks::default();
    let recorder = Arc::clone(&seen);
    hooks.on_payment(move |callback| {
        let recorder = Arc::clone(&recorder);
        async move {
            recorder.lock().unwrap().push(callback.message.cp_orderno);
            HookResult::Ok(())
        }
        .boxed()
    });
    (hooks, seen)
}

#[actix_web::test]
async fn health() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/health", verified_decoder(), CallbackHooks::default()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}

#[actix_web::test]
async fn signed_payment_callback_is_acknowledged() {
    let _ = env_logger::try_init().ok();
    let (hooks, seen) = recording_hooks();
    let body = signed_envelope("payment", PAYMENT_MSG);
    let (status, body) = post_request("/callback/payment", body, verified_decoder(), hooks).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, SUCCESS_ACK);
    assert_eq!(*seen.lock().unwrap(), vec!["7056505317450041644".to_string()]);
}

#[actix_web::test]
async fn forged_payment_callback_is_rejected() {
    let _ = env_logger::try_init().ok();
    let (hooks, seen) = recording_hooks();
    let signature = verifier().compute_signature("1700000000", "nonce-7731", PAYMENT_MSG);
    let mut forged = signature.into_bytes();
    forged[0] = if forged[0] == b'0' { b'1' } else { b'0' };
    let forged = String::from_utf8(forged).unwrap();
    let body = envelope("payment", PAYMENT_MSG, &forged);
    let (status, body) = post_request("/callback/payment", body, verified_decoder(), hooks).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let ack: CallbackAck = serde_json::from_str(&body).unwrap();
    assert_eq!(ack.err_no, 401);
    assert!(seen.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn rejection_does_not_reveal_the_valid_signature() {
    let _ = env_logger::try_init().ok();
    let (hooks, seen) = recording_hooks();
    let forged_msg = PAYMENT_MSG.replace("\"total_amount\":100", "\"total_amount\":99999");
    let valid = verifier().compute_signature("1700000000", "nonce-7731", &forged_msg);
    let zeros = "0".repeat(40);
    let body = envelope("payment", &forged_msg, &zeros);
    let (status, body) = post_request("/callback/payment", body, verified_decoder(), hooks).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(!body.contains(&valid));
    assert!(!body.contains(&zeros));
    let ack: CallbackAck = serde_json::from_str(&body).unwrap();
    assert_eq!(ack, CallbackAck::failure(401, "invalid msg_signature"));
    assert!(seen.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn tampered_message_is_rejected() {
    let _ = env_logger::try_init().ok();
    let (hooks, seen) = recording_hooks();
    let signature = verifier().compute_signature("1700000000", "nonce-7731", PAYMENT_MSG);
    let tampered = PAYMENT_MSG.replace("\"total_amount\":100", "\"total_amount\":1");
    let body = envelope("payment", &tampered, &signature);
    let (status, _) = post_request("/callback/payment", body, verified_decoder(), hooks).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(seen.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn unsigned_callbacks_pass_when_checks_are_disabled() {
    let _ = env_logger::try_init().ok();
    let (hooks, seen) = recording_hooks();
    let body = envelope("payment", PAYMENT_MSG, "");
    let (status, body) = post_request("/callback/payment", body, CallbackDecoder::unverified(), hooks).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, SUCCESS_ACK);
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[actix_web::test]
async fn malformed_envelope_is_a_bad_request() {
    let _ = env_logger::try_init().ok();
    let (hooks, seen) = recording_hooks();
    let (status, body) = post_request("/callback/payment", "{not json".into(), verified_decoder(), hooks).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let ack: CallbackAck = serde_json::from_str(&body).unwrap();
    assert_eq!(ack.err_no, 400);
    assert!(seen.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn signed_but_undecodable_message_is_a_bad_request() {
    let _ = env_logger::try_init().ok();
    let (hooks, seen) = recording_hooks();
    let body = signed_envelope("payment", r#"{"total_amount":"lots"}"#);
    let (status, _) = post_request("/callback/payment", body, verified_decoder(), hooks).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(seen.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn failing_hook_asks_the_platform_to_retry() {
    let _ = env_logger::try_init().ok();
    let mut hooks = CallbackHooks::default();
    hooks.on_payment(|_| async { HookResult::Err("order store is offline".to_string()) }.boxed());
    let body = signed_envelope("payment", PAYMENT_MSG);
    let (status, body) = post_request("/callback/payment", body, verified_decoder(), hooks).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let ack: CallbackAck = serde_json::from_str(&body).unwrap();
    assert_eq!(ack.err_no, 500);
    assert_eq!(ack.err_tips, "callback could not be processed");
    assert!(!body.contains("order store is offline"));
}

#[actix_web::test]
async fn callbacks_without_hooks_are_acknowledged() {
    let _ = env_logger::try_init().ok();
    let body = signed_envelope("payment", PAYMENT_MSG);
    let (status, body) = post_request("/callback/payment", body, verified_decoder(), CallbackHooks::default()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, SUCCESS_ACK);
}

#[actix_web::test]
async fn each_kind_reaches_its_own_hook() {
    let _ = env_logger::try_init().ok();
    let refunds = Arc::new(AtomicUsize::new(0));
    let settlements = Arc::new(AtomicUsize::new(0));
    let withdrawals = Arc::new(AtomicUsize::new(0));
    let mut hooks = CallbackHooks::default();
    let counter = Arc::clone(&refunds);
    hooks.on_refund(move |cb| {
        assert_eq!(cb.message.cp_refundno, "R1");
        counter.fetch_add(1, Ordering::SeqCst);
        async { HookResult::Ok(()) }.boxed()
    });
    let counter = Arc::clone(&settlements);
    hooks.on_settle(move |cb| {
        assert_eq!(cb.message.cp_settle_no, "S1");
        counter.fetch_add(1, Ordering::SeqCst);
        async { HookResult::Ok(()) }.boxed()
    });
    let counter = Arc::clone(&withdrawals);
    hooks.on_withdraw(move |cb| {
        assert_eq!(cb.message.out_order_id, "W1");
        counter.fetch_add(1, Ordering::SeqCst);
        async { HookResult::Ok(()) }.boxed()
    });
    let cases = [
        ("/callback/refund", "refund", r#"{"cp_refundno":"R1","status":"SUCCESS","refund_amount":100}"#),
        ("/callback/settle", "settle", r#"{"cp_settle_no":"S1","status":"SUCCESS","settle_amount":100}"#),
        ("/callback/withdraw", "withdraw", r#"{"status":"SUCCESS","out_order_id":"W1","withdraw_at":1700000000}"#),
    ];
    for (path, kind, msg) in cases {
        let (status, body) =
            post_request(path, signed_envelope(kind, msg), verified_decoder(), hooks.clone()).await;
        assert_eq!(status, StatusCode::OK, "{path}");
        assert_eq!(body, SUCCESS_ACK);
    }
    assert_eq!(refunds.load(Ordering::SeqCst), 1);
    assert_eq!(settlements.load(Ordering::SeqCst), 1);
    assert_eq!(withdrawals.load(Ordering::SeqCst), 1);
}
