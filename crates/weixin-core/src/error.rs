//! Error types for the collaborator seams.
//!
//! Routing itself never fails; these errors come from the pluggable decoder,
//! renderer and storage. Framework-level errors (filter registration,
//! extraction, dispatch) are defined in `weixin-framework`.

use thiserror::Error;

/// Errors produced while turning a raw payload into a [`Message`](crate::Message).
///
/// The dispatcher logs these and answers with no reply; they never reach the
/// transport.
#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    /// The payload is not well-formed.
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// The payload is encrypted and could not be decrypted.
    #[error("failed to decrypt payload: {0}")]
    Decrypt(String),

    /// The signature does not match.
    #[error("signature verification failed")]
    Signature,
}

/// Errors produced while rendering a [`Reply`](crate::Reply).
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    /// The renderer does not know how to express this reply.
    #[error("unsupported reply: {0}")]
    Unsupported(String),

    /// A field the reply format requires is missing from the inbound message.
    #[error("missing field for reply: {0}")]
    MissingField(&'static str),

    /// Encoding or encryption of the reply failed.
    #[error("failed to encode reply: {0}")]
    Encode(String),
}

/// Errors produced by a [`Storage`](crate::Storage) backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend failed.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A stored value could not be (de)serialized.
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
