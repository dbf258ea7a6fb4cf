//! Domain primitives and ports.
//!
//! Purpose: define the strongly typed user aggregate shared by the API and
//! persistence layers, the transport-agnostic error payload, and the
//! persistence port the outbound adapters implement. Types are immutable;
//! invariants and serialisation contracts live in each type's Rustdoc.

pub mod error;
pub mod ports;
pub mod user;

pub use self::error::{Error, ErrorCode};
pub use self::user::{EmailAddress, User, UserDraft, UserId, UserName, UserValidationError};
