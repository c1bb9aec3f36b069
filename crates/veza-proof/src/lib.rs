//! # veza-proof — Private Proof Provider
//!
//! Attests that a consent decision happened without revealing its
//! parameters publicly. The attestation is a deterministic salted SHA-256
//! digest of the consent parameters; a proof backend registers the digest
//! and hands back an opaque proof reference.
//!
//! ## Backend Selection
//!
//! [`ProofBackend`] is a sealed trait with exactly two implementations,
//! selected by configuration at process start — never by inline branching
//! in the orchestrator:
//!
//! - [`HashProver`] — pure local computation, deterministic, always
//!   available. Provides **no zero-knowledge privacy**; it exists so the
//!   pipeline runs end to end without a proof service.
//! - [`RemoteProver`] — registers the digest with a networked proof
//!   service under a bounded timeout.
//!
//! A real zero-knowledge backend can replace either variant without
//! touching callers, as long as `submit` and `verify_digest` remain
//! deterministic inverses of each other.

pub mod digest;
pub mod hash;
pub mod remote;
pub mod traits;

pub use digest::{consent_digest, ConsentParams, ConsentProof, SCHEME_VERSION};
pub use hash::HashProver;
pub use remote::{RemoteProver, RemoteProverConfig};
pub use traits::{ProofBackend, ProofError};
