//! # Outbound request signing
//!
//! Every ecpay request carries a `sign` field that the platform recomputes on its side. The digest is built as
//! follows:
//!
//! 1. The request is serialized to a flat JSON object. Nested objects and arrays are not recursed into; they
//!    contribute their compact JSON text.
//! 2. Fields in [`EXCLUDED_FIELDS`] are skipped.
//! 3. Every other value is reduced to its [canonical value](canonical_value). Empty values and the literal `null`
//!    are dropped, so unset optional fields never perturb the signature.
//! 4. The shared salt is appended and the list is sorted byte-wise.
//! 5. The values are joined with `&` and hashed with MD5. The digest is rendered as 32 lowercase hex characters.
//!
//! ```text
//!    md5( sort(canonical values ++ [salt]).join("&") )
//! ```
//!
//! Request types declare which of their fields take part in the digest through [`SignableRequest::SIGNED_FIELDS`]
//! (see the [`signable_request!`](crate::signable_request) macro), so adding a field to a request is a one-line change
//! next to the struct and never requires touching the signer.

use dpg_common::Secret;
use log::*;
use md5::{Digest, Md5};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::OpenApiError;

/// Fields that never contribute to the request digest, regardless of request type.
pub const EXCLUDED_FIELDS: [&str; 6] = ["other_settle_params", "app_id", "thirdparty_id", "sign", "salt", "token"];

pub fn is_excluded(field: &str) -> bool {
    EXCLUDED_FIELDS.contains(&field)
}

/// A request body that can be signed with a [`RequestSigner`].
pub trait SignableRequest: Serialize {
    /// The serialized names of the fields that participate in the digest.
    const SIGNED_FIELDS: &'static [&'static str];

    fn set_app_id(&mut self, app_id: &str);

    fn set_sign(&mut self, sign: String);
}

/// Implements [`SignableRequest`] for a request struct that has `app_id: String` and `sign: String` fields.
///
/// ```ignore
/// signable_request!(QueryOrderParams => ["out_order_no"]);
/// ```
#[macro_export]
macro_rules! signable_request {
    ($name:ident => [$($field:literal),* $(,)?]) => {
        impl $crate::signer::SignableRequest for $name {
            const SIGNED_FIELDS: &'static [&'static str] = &[$($field),*];

            fn set_app_id(&mut self, app_id: &str) {
                self.app_id = app_id.to_string();
            }

            fn set_sign(&mut self, sign: String) {
                self.sign = sign;
            }
        }
    };
}

/// Reduce a single JSON value to the string that is fed into the digest, or `None` if the value must be skipped.
///
/// Strings are used as-is, everything else contributes its JSON text. The result is trimmed, one layer of surrounding
/// double quotes is removed, and it is trimmed again. Empty strings and `null` produce `None`.
pub fn canonical_value(value: &Value) -> Option<String> {
    let raw = match value {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let trimmed = raw.trim();
    let unquoted = if trimmed.len() > 1 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };
    let value = unquoted.trim();
    if value.is_empty() || value == "null" {
        None
    } else {
        Some(value.to_string())
    }
}

/// Signs outbound requests with the integration's shared salt.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    salt: Secret<String>,
}

impl RequestSigner {
    /// Creates a new signer. A blank salt would produce digests the platform never accepts, so it is rejected here
    /// rather than at call time.
    pub fn new(salt: Secret<String>) -> Result<Self, OpenApiError> {
        if salt.is_blank() {
            return Err(OpenApiError::ConfigurationError("The request signing salt is not set".into()));
        }
        Ok(Self { salt })
    }

    /// Signs every top-level field of an arbitrary parameter bundle, except the excluded ones.
    pub fn sign_bundle<B: Serialize + ?Sized>(&self, bundle: &B) -> Result<String, OpenApiError> {
        let fields = to_object(bundle)?;
        let values = fields
            .iter()
            .filter(|(name, _)| !is_excluded(name))
            .filter_map(|(_, value)| canonical_value(value))
            .collect::<Vec<String>>();
        Ok(self.digest(values))
    }

    /// Signs the fields that `R` declares as signable.
    pub fn sign<R: SignableRequest>(&self, request: &R) -> Result<String, OpenApiError> {
        let fields = to_object(request)?;
        let values = R::SIGNED_FIELDS
            .iter()
            .filter(|name| !is_excluded(name))
            .filter_map(|name| fields.get(*name))
            .filter_map(canonical_value)
            .collect::<Vec<String>>();
        Ok(self.digest(values))
    }

    /// Computes the digest for `request` and stores it in its `sign` field.
    pub fn sign_request<R: SignableRequest>(&self, request: &mut R) -> Result<(), OpenApiError> {
        let sign = self.sign(request)?;
        request.set_sign(sign);
        Ok(())
    }

    fn digest(&self, mut values: Vec<String>) -> String {
        trace!("🔏️ Signing {} canonical values", values.len());
        values.push(self.salt.reveal().clone());
        values.sort_unstable();
        let digest = Md5::digest(values.join("&").as_bytes());
        hex::encode(digest)
    }
}

fn to_object<B: Serialize + ?Sized>(bundle: &B) -> Result<Map<String, Value>, OpenApiError> {
    let value = serde_json::to_value(bundle).map_err(|e| OpenApiError::SerializationError(e.to_string()))?;
    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(OpenApiError::SerializationError(format!(
            "Request parameters must serialize to a JSON object, but got {other}"
        ))),
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeMap;

    use serde::ser::Error;
    use serde_json::json;

    use super::*;

    fn signer() -> RequestSigner {
        RequestSigner::new(Secret::new("s3cr3t".to_string())).unwrap()
    }

    #[derive(Serialize, Default)]
    struct TestRequest {
        app_id: String,
        out_order_no: String,
        total_amount: i64,
        subject: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        cp_extra: Option<String>,
        thirdparty_id: String,
        sign: String,
    }

    signable_request!(TestRequest => ["out_order_no", "total_amount", "subject", "cp_extra", "thirdparty_id"]);

    #[test]
    fn canonical_values() {
        assert_eq!(canonical_value(&json!("  abc ")), Some("abc".into()));
        assert_eq!(canonical_value(&json!("\" quoted \"")), Some("quoted".into()));
        assert_eq!(canonical_value(&json!("\"\"x\"\"")), Some("\"x\"".into()));
        assert_eq!(canonical_value(&json!("\"")), Some("\"".into()));
        assert_eq!(canonical_value(&json!(100)), Some("100".into()));
        assert_eq!(canonical_value(&json!(1643189272388i64)), Some("1643189272388".into()));
        assert_eq!(canonical_value(&json!(false)), Some("false".into()));
        assert_eq!(canonical_value(&json!({"b": 1, "a": "x"})), Some(r#"{"a":"x","b":1}"#.into()));
        assert_eq!(canonical_value(&json!("")), None);
        assert_eq!(canonical_value(&json!("   ")), None);
        assert_eq!(canonical_value(&json!("null")), None);
        assert_eq!(canonical_value(&json!("\"null\"")), None);
        assert_eq!(canonical_value(&Value::Null), None);
    }

    #[test]
    fn reference_bundle() {
        let bundle = json!({"app_id": "A", "out_order_no": "123", "total_amount": 100, "sign": "", "subject": "x"});
        let sign = signer().sign_bundle(&bundle).unwrap();
        // md5("100&123&s3cr3t&x")
        assert_eq!(sign, "a34d8de7b6beab7a279b0d5a0235ae2f");
        assert_eq!(sign.len(), 32);
    }

    #[test]
    fn signing_is_deterministic() {
        let bundle = json!({"out_order_no": "123", "total_amount": 100});
        let signer = signer();
        assert_eq!(signer.sign_bundle(&bundle).unwrap(), signer.sign_bundle(&bundle).unwrap());
    }

    #[test]
    fn field_order_does_not_matter() {
        #[derive(Serialize)]
        struct Forward {
            out_order_no: &'static str,
            total_amount: i64,
            subject: &'static str,
        }
        #[derive(Serialize)]
        struct Backward {
            subject: &'static str,
            total_amount: i64,
            out_order_no: &'static str,
        }
        let forward = Forward { out_order_no: "123", total_amount: 100, subject: "x" };
        let backward = Backward { subject: "x", total_amount: 100, out_order_no: "123" };
        assert_eq!(signer().sign_bundle(&forward).unwrap(), signer().sign_bundle(&backward).unwrap());
        let mut map = BTreeMap::new();
        map.insert("subject", "x");
        map.insert("out_order_no", "123");
        map.insert("total_amount", "100");
        assert_eq!(signer().sign_bundle(&map).unwrap(), "a34d8de7b6beab7a279b0d5a0235ae2f");
    }

    #[test]
    fn excluded_fields_are_ignored() {
        let plain = json!({"out_order_no": "123", "total_amount": 100, "subject": "x"});
        let noisy = json!({
            "out_order_no": "123", "total_amount": 100, "subject": "x",
            "app_id": "tt07e3715e98c9aac0", "thirdparty_id": "tt84a4f2177777e29df", "sign": "abcdef",
            "salt": "other", "token": "T", "other_settle_params": "[]"
        });
        assert_eq!(signer().sign_bundle(&plain).unwrap(), signer().sign_bundle(&noisy).unwrap());
    }

    #[test]
    fn empty_and_null_fields_are_ignored() {
        let plain = json!({"out_order_no": "123", "total_amount": 100, "subject": "x"});
        let padded = json!({
            "out_order_no": " 123 ", "total_amount": 100, "subject": "\"x\"",
            "cp_extra": "", "notify_url": "null", "msg_page": null, "store_uid": "   "
        });
        assert_eq!(signer().sign_bundle(&plain).unwrap(), signer().sign_bundle(&padded).unwrap());
    }

    #[test]
    fn nested_values_sign_as_json_text() {
        let bundle = json!({
            "rate": 0.5,
            "settle_params": [{"amount": 100, "merchant_uid": "m1"}],
            "desc": "\"hello \"world\"\"",
            "finish": true,
            "blank": "  ",
            "missing": "null",
            "none": null,
        });
        // md5(r#"0.5&[{"amount":100,"merchant_uid":"m1"}]&hello "world"&s3cr3t&true"#)
        assert_eq!(signer().sign_bundle(&bundle).unwrap(), "268ca63885bb2319ea5319e9c66811eb");
    }

    #[test]
    fn empty_bundle_signs_salt_only() {
        let bundle = json!({"app_id": "A", "sign": "", "cp_extra": ""});
        // md5("s3cr3t")
        assert_eq!(signer().sign_bundle(&bundle).unwrap(), "a4d80eac9ab26a4a2da04125bc2c096a");
        assert_eq!(signer().sign_bundle(&json!({})).unwrap(), "a4d80eac9ab26a4a2da04125bc2c096a");
    }

    #[test]
    fn declared_fields_only() {
        let mut request = TestRequest {
            app_id: "A".into(),
            out_order_no: "123".into(),
            total_amount: 100,
            subject: "x".into(),
            cp_extra: None,
            thirdparty_id: "tt84a4f2177777e29df".into(),
            sign: "stale".into(),
        };
        signer().sign_request(&mut request).unwrap();
        assert_eq!(request.sign, "a34d8de7b6beab7a279b0d5a0235ae2f");
        // Re-signing a signed request is stable because `sign` never takes part.
        signer().sign_request(&mut request).unwrap();
        assert_eq!(request.sign, "a34d8de7b6beab7a279b0d5a0235ae2f");
        request.cp_extra = Some(String::new());
        assert_eq!(signer().sign(&request).unwrap(), "a34d8de7b6beab7a279b0d5a0235ae2f");
        request.cp_extra = Some("502205261403349".into());
        assert_ne!(signer().sign(&request).unwrap(), "a34d8de7b6beab7a279b0d5a0235ae2f");
    }

    #[test]
    fn undeclared_fields_do_not_participate() {
        #[derive(Serialize)]
        struct Partial {
            app_id: String,
            out_order_no: String,
            internal_note: String,
            sign: String,
        }
        signable_request!(Partial => ["out_order_no"]);
        let request = Partial {
            app_id: String::new(),
            out_order_no: "123".into(),
            internal_note: "not sent to the digest".into(),
            sign: String::new(),
        };
        let expected = signer().sign_bundle(&json!({"out_order_no": "123"})).unwrap();
        assert_eq!(signer().sign(&request).unwrap(), expected);
    }

    #[test]
    fn blank_salt_is_rejected() {
        let err = RequestSigner::new(Secret::new("  ".to_string())).unwrap_err();
        assert!(matches!(err, OpenApiError::ConfigurationError(_)));
    }

    #[test]
    fn non_object_bundles_fail() {
        let err = signer().sign_bundle(&vec!["a", "b"]).unwrap_err();
        assert!(matches!(err, OpenApiError::SerializationError(_)));
        let err = signer().sign_bundle("plain string").unwrap_err();
        assert!(matches!(err, OpenApiError::SerializationError(_)));
    }

    #[test]
    fn unserializable_bundles_fail() {
        struct Broken;
        impl Serialize for Broken {
            fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(S::Error::custom("field cannot be serialized"))
            }
        }
        let err = signer().sign_bundle(&Broken).unwrap_err();
        assert!(matches!(err, OpenApiError::SerializationError(s) if s.contains("field cannot be serialized")));
    }
}
