//! Error taxonomy for the inspection framework (spec §7).
//!
//! Most of the codebase returns `anyhow::Result` the way the teacher
//! crate's parsers and scanner do. This module exists only so the small
//! set of call sites that must distinguish *kind* of failure (mainly
//! `main.rs`, deciding the process exit code) can do so without stringly
//! typed matching.

use std::fmt;

/// Framework-level error kinds (spec §7 taxonomy).
///
/// `InspectionDiagnostic` and `PolicyFinding` are deliberately absent here:
/// those are not propagated as errors at all, they become `Result` records
/// (see [`crate::models::result`]) and never unwind the call stack.
#[derive(Debug)]
pub enum RpmInspectError {
    /// Bad or missing primary config / profile document.
    Config(String),
    /// Could not fetch, open, or extract a build's packages.
    Acquisition(String),
    /// An internal invariant was violated (null header where one was
    /// required, an index out of range in a parallel RPM tag array, etc).
    FrameworkBug(String),
}

impl fmt::Display for RpmInspectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpmInspectError::Config(msg) => write!(f, "configuration error: {msg}"),
            RpmInspectError::Acquisition(msg) => write!(f, "acquisition error: {msg}"),
            RpmInspectError::FrameworkBug(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for RpmInspectError {}

/// Process exit codes (spec §6).
pub const RI_INSPECTION_FAILURE: i32 = 1;
pub const RI_PROGRAM_ERROR: i32 = 2;

/// Classify a terminal `anyhow::Error` into the exit code the CLI should use.
///
/// Anything that downcasts to [`RpmInspectError`] is a framework-level
/// failure (`RI_PROGRAM_ERROR`); anything else reaching this point is also
/// treated as a program error, since `RI_INSPECTION_FAILURE` is driven
/// purely by the result severity watermark, not by error propagation.
pub fn program_error_exit_code(_err: &anyhow::Error) -> i32 {
    RI_PROGRAM_ERROR
}
