//! # Callback verification and decoding
//!
//! The platform notifies the merchant of payment, refund, settlement and withdrawal results by POSTing a JSON
//! envelope:
//!
//! ```json
//! { "timestamp": "1700000000", "nonce": "abc", "msg": "{\"status\":\"SUCCESS\", ...}",
//!   "msg_signature": "b25a407b...", "type": "payment" }
//! ```
//!
//! `msg_signature` is the lowercase hex SHA-1 of the shared token, `timestamp`, `nonce` and `msg`, sorted byte-wise
//! and concatenated with no separator. This scheme is unrelated to outbound request signing and uses a different
//! secret.
//!
//! `msg` is itself JSON text whose shape depends on the callback kind. It is only parsed after the signature has been
//! checked, so a forged message never becomes a typed notification.
use std::fmt::{Display, Formatter};

use dpg_common::Secret;
use log::*;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha1::{Digest, Sha1};
use subtle::ConstantTimeEq;

use crate::{OpenApiConfig, OpenApiError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallbackKind {
    Payment,
    Refund,
    Settle,
    Withdraw,
}

impl CallbackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallbackKind::Payment => "payment",
            CallbackKind::Refund => "refund",
            CallbackKind::Settle => "settle",
            CallbackKind::Withdraw => "withdraw",
        }
    }
}

impl Display for CallbackKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inner callback payload type, tied to the callback kind that carries it.
pub trait CallbackMessage: DeserializeOwned {
    const KIND: CallbackKind;
}

/// The outer envelope of every callback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallbackEnvelope {
    pub timestamp: String,
    pub nonce: String,
    pub msg: String,
    pub msg_signature: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl CallbackEnvelope {
    pub fn from_json(body: &[u8]) -> Result<Self, OpenApiError> {
        serde_json::from_slice(body).map_err(|e| OpenApiError::ParseError(format!("Invalid callback envelope. {e}")))
    }
}

/// Parse the `msg` field of an envelope into its inner payload type.
pub fn decode_msg<T: DeserializeOwned>(msg: &str) -> Result<T, OpenApiError> {
    serde_json::from_str(msg).map_err(|e| OpenApiError::ParseError(format!("Invalid callback message. {e}")))
}

/// Checks callback signatures against the integration's shared token.
#[derive(Debug, Clone)]
pub struct CallbackVerifier {
    token: Secret<String>,
}

impl CallbackVerifier {
    pub fn new(token: Secret<String>) -> Result<Self, OpenApiError> {
        if token.is_blank() {
            return Err(OpenApiError::ConfigurationError("The callback verification token is not set".into()));
        }
        Ok(Self { token })
    }

    /// The signature the platform should have attached to a callback with these values.
    pub fn compute_signature(&self, timestamp: &str, nonce: &str, msg: &str) -> String {
        let mut parts = [self.token.reveal().as_str(), timestamp, nonce, msg];
        parts.sort_unstable();
        let mut hasher = Sha1::new();
        parts.iter().for_each(|p| hasher.update(p.as_bytes()));
        hex::encode(hasher.finalize())
    }

    /// Succeeds only if `expected` is exactly (byte-for-byte) the signature computed from the other values.
    pub fn verify(&self, timestamp: &str, nonce: &str, msg: &str, expected: &str) -> Result<(), OpenApiError> {
        let computed = self.compute_signature(timestamp, nonce, msg);
        if bool::from(computed.as_bytes().ct_eq(expected.as_bytes())) {
            trace!("🔐️ Callback signature check ✅️");
            Ok(())
        } else {
            Err(OpenApiError::CallbackVerificationError { expected: expected.to_string(), computed })
        }
    }

    pub fn verify_envelope(&self, envelope: &CallbackEnvelope) -> Result<(), OpenApiError> {
        self.verify(&envelope.timestamp, &envelope.nonce, &envelope.msg, &envelope.msg_signature)
    }
}

/// A decoded callback, along with the envelope metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCallback<T> {
    pub timestamp: String,
    pub nonce: String,
    pub kind: String,
    /// False if the decoder was configured to skip signature checks.
    pub signature_checked: bool,
    pub message: T,
}

/// Verifies (optionally) and then decodes callback envelopes.
#[derive(Debug, Clone)]
pub struct CallbackDecoder {
    // If None, then signatures are not checked and every well-formed callback is accepted
    verifier: Option<CallbackVerifier>,
}

impl CallbackDecoder {
    pub fn verified(verifier: CallbackVerifier) -> Self {
        Self { verifier: Some(verifier) }
    }

    /// A decoder that accepts callbacks without checking their signature. Only use this where the platform has not
    /// yet provisioned a callback token.
    pub fn unverified() -> Self {
        warn!("🚨️ Callback signature checks are DISABLED. Forged callbacks will be accepted.");
        Self { verifier: None }
    }

    pub fn from_config(config: &OpenApiConfig, check_signatures: bool) -> Result<Self, OpenApiError> {
        if check_signatures {
            Ok(Self::verified(config.callback_verifier()?))
        } else {
            Ok(Self::unverified())
        }
    }

    pub fn checks_signatures(&self) -> bool {
        self.verifier.is_some()
    }

    pub fn decode<T: CallbackMessage>(&self, envelope: &CallbackEnvelope) -> Result<DecodedCallback<T>, OpenApiError> {
        if let Some(verifier) = &self.verifier {
            verifier.verify_envelope(envelope).map_err(|e| {
                warn!("🔐️ Rejecting {} callback (nonce {}). {e}", T::KIND, envelope.nonce);
                e
            })?;
        }
        if envelope.kind != T::KIND.as_str() {
            warn!("🔐️ Callback type '{}' was delivered as a {} callback", envelope.kind, T::KIND);
        }
        let message = decode_msg::<T>(&envelope.msg)?;
        debug!("🔐️ Decoded {} callback (nonce {})", T::KIND, envelope.nonce);
        Ok(DecodedCallback {
            timestamp: envelope.timestamp.clone(),
            nonce: envelope.nonce.clone(),
            kind: envelope.kind.clone(),
            signature_checked: self.checks_signatures(),
            message,
        })
    }

    pub fn decode_body<T: CallbackMessage>(&self, body: &[u8]) -> Result<DecodedCallback<T>, OpenApiError> {
        let envelope = CallbackEnvelope::from_json(body)?;
        self.decode(&envelope)
    }
}
