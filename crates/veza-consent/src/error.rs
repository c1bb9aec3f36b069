//! # Consent Error Taxonomy
//!
//! One error kind per caller-visible outcome. Provider degradation is
//! deliberately absent: a failed proof or audit call is logged and folded
//! into the approval outcome's `is_real` flags, never surfaced as a
//! request failure.

use serde::Serialize;
use thiserror::Error;

use veza_core::RequestId;
use veza_state::{RequestStatus, TransitionError};

/// Machine-readable reason for a release gate rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerificationReason {
    /// The recomputed consent digest did not match the persisted one.
    ProofVerificationFailed,
    /// No audit commitment matching the persisted digest was found.
    AuditVerificationFailed,
}

impl VerificationReason {
    /// The wire label carried in 403 response bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProofVerificationFailed => "proof-verification-failed",
            Self::AuditVerificationFailed => "audit-verification-failed",
        }
    }
}

impl std::fmt::Display for VerificationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from consent orchestration, release gating, and the relay.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsentError {
    /// No request with the given id exists.
    #[error("access request {0} not found")]
    NotFound(RequestId),

    /// The acting party is not the owner named on the request.
    #[error("not authorized to act on request {0}")]
    Unauthorized(RequestId),

    /// The request is not in a state that admits this operation.
    #[error("request {id} is {status}")]
    InvalidTransition {
        /// The request that refused the operation.
        id: RequestId,
        /// Its current status.
        status: RequestStatus,
    },

    /// The caller may not access this request's payloads. Carries no
    /// detail about whether the request exists.
    #[error("access to request {0} denied")]
    Forbidden(RequestId),

    /// The release gate's re-verification failed.
    #[error("release verification failed: {reason}")]
    Verification {
        /// Which of the two checks failed.
        reason: VerificationReason,
    },

    /// No staged payload under the requested file reference.
    #[error("no granted payload for request {request_id} under {file_ref}")]
    PayloadNotFound {
        /// The request whose bucket was searched.
        request_id: RequestId,
        /// The file reference that had no row.
        file_ref: String,
    },
}

impl From<TransitionError> for ConsentError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::NotFound(id) => Self::NotFound(id),
            TransitionError::Unauthorized(id) => Self::Unauthorized(id),
            TransitionError::InvalidTransition { id, status } => {
                Self::InvalidTransition { id, status }
            }
        }
    }
}
