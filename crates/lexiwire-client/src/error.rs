//! Client-side error taxonomy for the command channel.

use thiserror::Error;

/// A failed REST command.
///
/// Commands are single-shot: the gateway never retries and never assumes
/// partial success. Submission failures leave the caller's pending
/// placement buffer intact for retry or cancel.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Exchange requested with no tiles; rejected before any network call.
    #[error("exchange requires at least one tile")]
    EmptyExchange,

    /// Request never reached the server.
    #[error("request failed: {0}")]
    Transport(String),

    /// Server answered with a non-2xx status.
    #[error("server rejected request: {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for the user-visible message.
        body: String,
    },

    /// Request or response JSON could not be encoded/decoded.
    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),
}
