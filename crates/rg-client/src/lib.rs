//! Remote authorization client for RoleGate.
//!
//! One GET per (user, role) check against a configured endpoint template,
//! authenticated with a basic-auth credential pair. The endpoint answers
//! with a plain-text body: exactly `Y` means authorized, anything else means
//! not authorized.

mod check;
mod error;

pub use check::{
    AuthCheck, HttpAuthCheck, HttpAuthCheckConfig, ROLE_PLACEHOLDER, USER_PLACEHOLDER,
};
pub use error::{CheckError, Result};
