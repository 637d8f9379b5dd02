//! adm_io — scenario files, canonical JSON, and digests.
//!
//! - Shared error type (`IoError`) with `From` conversions used across
//!   modules.
//! - Details live in the file modules; the public surface re-exports them.

#![forbid(unsafe_code)]

use thiserror::Error;

pub mod canonical_json;
pub mod hasher;
pub mod scenario;

pub use canonical_json::{to_canonical_bytes, write_canonical_file};
pub use hasher::{allocation_digest, sha256_canonical, sha256_hex};
pub use scenario::{load_scenario, Scenario};

/// Unified error for adm_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem errors (read/write/path).
    #[error("io error: {0}")]
    Read(String),

    /// JSON serialization/deserialization errors.
    #[error("json error: {0}")]
    Json(String),

    /// Scenario-level shape problems caught before engine setup
    /// (setup-time validation proper lives in `adm_engine`).
    #[error("scenario error: {0}")]
    Scenario(String),

    /// Engine configuration rejected by the setup builders.
    #[error("config error: {0}")]
    Config(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Read(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        IoError::Json(e.to_string())
    }
}
