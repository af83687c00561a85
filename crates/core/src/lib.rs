//! Domain logic for the muster attendance and rewards platform.
//!
//! This crate is pure: no I/O, no database handles. It holds the typed
//! error taxonomy, the status sum types, the check-token issuer, the
//! reward settlement math, and the attendance transition guards. The
//! `db` and `api` crates orchestrate these against storage and HTTP.

pub mod attendance;
pub mod error;
pub mod roles;
pub mod settlement;
pub mod status;
pub mod token;
pub mod types;
