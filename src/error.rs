use std::io;

use thiserror::Error;

use crate::types::GlyphName;

#[derive(Debug, Error)]
pub enum Error {
    #[error("No glyph class named '{0}'")]
    MissingGlyphClass(String),
    #[error("Glyph class '{0}' is empty")]
    EmptyGlyphClass(String),
    #[error("No routine named '{0}' in the registry")]
    UnknownRoutine(String),
    #[error(transparent)]
    Solver(#[from] SolverError),
    #[error("Unable to access kern cache at '{path}'")]
    CacheIo {
        path: std::path::PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed kern cache at '{path}'")]
    CacheCodec {
        path: std::path::PathBuf,
        #[source]
        source: bincode::Error,
    },
}

/// Failure of the external kern-distance solver for one glyph pair.
///
/// Always fatal; a silently-wrong kern is worse than an aborted build.
#[derive(Debug, Error)]
#[error("Solver failed for pair ('{left}', '{right}'): {message}")]
pub struct SolverError {
    pub left: GlyphName,
    pub right: GlyphName,
    pub message: String,
}

impl SolverError {
    pub fn new(left: GlyphName, right: GlyphName, message: impl Into<String>) -> Self {
        SolverError {
            left,
            right,
            message: message.into(),
        }
    }
}
