use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum OpenApiError {
    #[error("Could not serialize request parameters: {0}")]
    SerializationError(String),
    #[error("Callback signature verification failed. Expected {expected}, computed {computed}")]
    CallbackVerificationError { expected: String, computed: String },
    #[error("Could not parse JSON: {0}")]
    ParseError(String),
    #[error("Could not decrypt user data. {0}")]
    Decryption(#[from] DecryptionError),
    #[error("Invalid configuration: {0}")]
    ConfigurationError(String),
    #[error("Could not obtain an access token: {0}")]
    AccessTokenError(String),
    #[error("Transport error: {0}")]
    TransportError(String),
    #[error("Platform returned error {code}. {message}")]
    PlatformError { code: i64, message: String },
}

/// Reasons a session-encrypted payload could not be turned into a user profile. No variant ever carries partially
/// decrypted data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecryptionError {
    #[error("The {field} is not valid base64. {reason}")]
    InvalidBase64 { field: &'static str, reason: String },
    #[error("Session key must be 16, 24 or 32 bytes long, but was {0} bytes")]
    InvalidKeyLength(usize),
    #[error("Initialization vector must be 16 bytes long, but was {0} bytes")]
    InvalidIvLength(usize),
    #[error("Invalid ciphertext: {0}")]
    InvalidCiphertext(String),
    #[error("Decrypted data is not a valid user profile: {0}")]
    InvalidPayload(String),
}
