//! Client-side security plumbing for the Douyin mini-app open platform.
//!
//! * [`signer`] signs outbound ecpay requests with the shared salt.
//! * [`callback`] verifies and decodes the asynchronous payment, refund, settlement and withdrawal callbacks.
//! * [`session`] decrypts the user profile handed over by the mini-app after login.
//!
//! [`OpenApi`] ties these together with a pluggable [`HttpTransport`] for callers that want a ready-made client.
mod api;
mod config;
mod error;

pub mod callback;
pub mod data_objects;
pub mod ecpay;
pub mod notifications;
pub mod session;
pub mod signer;
pub mod transport;

pub use api::OpenApi;
pub use callback::{CallbackDecoder, CallbackEnvelope, CallbackKind, CallbackVerifier, DecodedCallback};
pub use config::{OpenApiConfig, PRODUCTION_BASE_URL, SANDBOX_BASE_URL};
pub use error::{DecryptionError, OpenApiError};
pub use notifications::{PaymentNotification, RefundNotification, SettleNotification, WithdrawNotification};
pub use session::{decrypt_user_profile, SessionCredential, UserProfile, Watermark};
pub use signer::{RequestSigner, SignableRequest};
pub use transport::{AccessTokenProvider, HttpTransport, ReqwestTransport, StaticAccessToken};
