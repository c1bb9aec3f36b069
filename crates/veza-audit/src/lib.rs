//! # veza-audit — Public Audit Provider
//!
//! Commits a tamper-evident, publicly verifiable record referencing a
//! consent proof digest, proving *when* and *by whom* consent was given
//! without revealing its parameters.
//!
//! ## Design Decision: the Ledger is Optional
//!
//! The consent pipeline is self-sufficient — the public ledger provides
//! additional auditability but is not required for the pipeline to
//! operate. An unconfigured deployment runs the clearly-labelled
//! [`LocalLedger`] degraded mode and still produces structurally valid
//! audit records, so the flow works end to end in development.
//!
//! ## Architecture
//!
//! [`AuditLedger`] is a sealed trait with exactly two implementations,
//! selected by configuration at process start:
//!
//! - [`LocalLedger`] — in-process, immediate "finality", deterministic
//!   `local-tx-…` references. Provides no public verifiability.
//! - [`JsonRpcLedger`] — commits the digest on an EVM-style chain through
//!   a fixed verification script at a deterministic script address.
//!
//! `exists` checks two independent signals: the ledger itself when
//! reachable, and the locally persisted reference+digest pair otherwise.
//! The weaker local-only result is distinguishable via
//! [`AuditAttestation::authoritative`].

pub mod ledger;
pub mod rpc;

pub use ledger::{
    derive_script_address, AuditAttestation, AuditError, AuditLedger, AuditRecord, LocalLedger,
    LOCAL_NETWORK_ID,
};
pub use rpc::{JsonRpcLedger, JsonRpcLedgerConfig};
