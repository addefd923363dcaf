use actix_web::{
    error::ResponseError,
    http::StatusCode,
    HttpResponse,
};
use douyin_openapi::OpenApiError;
use log::*;
use thiserror::Error;

use crate::data_objects::CallbackAck;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Callback rejected. {0}")]
    CallbackRejected(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Callback hook failed. {0}")]
    HookFailed(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::CallbackRejected(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::HookFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The platform reads `err_no`, so failures use the same shape as the success acknowledgement. The HTTP status
    /// doubles as the error number. `err_tips` only ever carries a fixed message; the details stay in the log.
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        debug!("💻️ Answering callback with HTTP {status}. {self}");
        let ack = CallbackAck::failure(i64::from(status.as_u16()), self.public_message());
        HttpResponse::build(status).json(ack)
    }
}

impl ServerError {
    /// The text returned to the caller.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::CallbackRejected(_) => "invalid msg_signature",
            Self::InvalidRequestBody(_) => "invalid request body",
            Self::HookFailed(_) => "callback could not be processed",
            _ => "internal server error",
        }
    }
}

impl From<OpenApiError> for ServerError {
    fn from(e: OpenApiError) -> Self {
        match e {
            // The digests are logged by the decoder and must never reach the response
            OpenApiError::CallbackVerificationError { .. } => Self::CallbackRejected("signature mismatch".into()),
            OpenApiError::ParseError(s) => Self::InvalidRequestBody(s),
            OpenApiError::ConfigurationError(s) => Self::ConfigurationError(s),
            e => Self::Unspecified(e.to_string()),
        }
    }
}

#[cfg(test)]
mod test {
    use actix_web::body::MessageBody;

    use super::*;

    #[test]
    fn verification_failures_are_unauthorized() {
        let err = ServerError::from(OpenApiError::CallbackVerificationError {
            expected: "aa".into(),
            computed: "bb".into(),
        });
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        let body = err.error_response().into_body().try_into_bytes().unwrap();
        let ack: CallbackAck = serde_json::from_slice(&body).unwrap();
        assert_eq!(ack.err_no, 401);
        assert_eq!(ack.err_tips, "invalid msg_signature");
        assert!(!err.to_string().contains("bb"));
    }

    #[test]
    fn error_details_stay_out_of_the_response() {
        let cases = [
            (ServerError::HookFailed("order store is offline".into()), 500, "callback could not be processed"),
            (
                ServerError::from(OpenApiError::ParseError("expected value at line 1".into())),
                400,
                "invalid request body",
            ),
            (ServerError::Unspecified("db password rejected".into()), 500, "internal server error"),
        ];
        for (err, code, tips) in cases {
            let body = err.error_response().into_body().try_into_bytes().unwrap();
            let ack: CallbackAck = serde_json::from_slice(&body).unwrap();
            assert_eq!(ack, CallbackAck::failure(code, tips));
        }
    }

    #[test]
    fn parse_failures_are_bad_requests() {
        let err = ServerError::from(OpenApiError::ParseError("expected value".into()));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let err = ServerError::from(OpenApiError::ConfigurationError("no token".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
