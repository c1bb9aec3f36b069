//! # veza-consent — Consent Orchestration and Release Gating
//!
//! Drives the consent pipeline between the access request store and the
//! two ledger providers:
//!
//! - [`ConsentOrchestrator`] — on approval, records consent best-effort
//!   against the private proof backend and the public audit ledger, then
//!   commits the local state transition in a single atomic write. The
//!   local transition is the source of truth: a degraded ledger never
//!   blocks an approval, it only marks the result non-authoritative.
//! - [`ReleaseGate`] — re-verifies both ledger references against the
//!   persisted digest before handing out a ciphertext reference.
//!   Verify-then-fetch, never the reverse.
//! - [`GrantRelay`] — authorizes owner-side payload staging and
//!   counterparty pickup against the request state machine.
//!
//! All three hold explicitly constructed, injected providers — built once
//! at process start and passed by reference, never hidden module state.

pub mod error;
pub mod gate;
pub mod orchestrator;
pub mod relay;

pub use error::{ConsentError, VerificationReason};
pub use gate::{ReleaseGate, ReleaseOutcome};
pub use orchestrator::{
    ApprovalOutcome, AuditOutcome, ConsentOrchestrator, ProofOutcome, DEGRADED_PROOF_PREFIX,
    DEGRADED_TX_PREFIX, DEFAULT_PROVIDER_TIMEOUT,
};
pub use relay::GrantRelay;
