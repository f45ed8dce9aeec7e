// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use thiserror::Error;

/// Failures raised by a [`Transport`](crate::Transport).
///
/// Every variant is recoverable: the pipeline treats them all as "fetch failed"
/// and moves on to the next fallback tier.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request did not complete within its deadline.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The server answered with a non-success status code.
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// Connection, TLS or protocol level failure.
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be read or decoded.
    #[error("invalid response body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() || e.is_body() {
            Self::Body(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

/// Failures raised by a [`KeyValueStore`](crate::KeyValueStore).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backing store cannot be used at all.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Failures surfaced by [`EventPipeline::refresh`](crate::EventPipeline::refresh)
/// and remote write-back.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The transport failed, timed out, or the server rejected the request.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a payload shape the pipeline does not know.
    #[error("unexpected payload: {0}")]
    UnexpectedPayload(String),

    /// An event could not be encoded for upload.
    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
}
