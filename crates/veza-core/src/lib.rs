//! # veza-core — Foundational Types for the Veza Stack
//!
//! Defines the type-system primitives shared by every other crate in the
//! workspace: validated identity newtypes, the record category enum, the
//! UTC-only timestamp, and the consent digest value type. This crate is the
//! leaf of the dependency DAG — it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `RequestId` and `PartyId`
//!    are distinct types with validated constructors — no bare strings or
//!    UUIDs cross a crate boundary.
//!
//! 2. **UTC-only timestamps.** [`Timestamp`] enforces UTC with Z suffix and
//!    seconds precision, so the consent digest computed over a timestamp's
//!    canonical form is deterministic across processes and restarts.
//!
//! 3. **`ConsentDigest` is a value, not a string.** 32 raw bytes with an
//!    explicit hex codec; parsing rejects anything that is not 64 lowercase
//!    hex characters.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, `Serialize`, `Deserialize`.

pub mod category;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use category::RecordCategory;
pub use digest::ConsentDigest;
pub use error::CoreError;
pub use identity::{PartyId, RequestId};
pub use temporal::Timestamp;
