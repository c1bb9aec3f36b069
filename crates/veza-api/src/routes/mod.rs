//! # Route Modules
//!
//! | Prefix                        | Module    | Domain                     |
//! |-------------------------------|-----------|----------------------------|
//! | `/access/request`             | [`access`]| Request creation           |
//! | `/access/pending`             | [`access`]| Owner's pending queue      |
//! | `/access/approve`             | [`access`]| Consent orchestration      |
//! | `/access/reject`              | [`access`]| Rejection                  |
//! | `/access/release`             | [`access`]| Verified release gate      |
//! | `/access/grant-file`          | [`relay`] | Grant relay push           |
//! | `/access/view-granted-file`   | [`relay`] | Grant relay pull           |

pub mod access;
pub mod relay;
