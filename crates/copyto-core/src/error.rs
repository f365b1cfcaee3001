//! Error types for resolution stages and placements.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why a single timestamp source produced nothing for a file.
///
/// These never abort a placement on their own: the resolver moves on to the
/// next source in its chain.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot read embedded metadata: {0}")]
    Exif(#[from] exif::Error),

    #[error("cannot open file: {0}")]
    Open(#[source] io::Error),

    #[error("no usable date tag")]
    NoTags,

    #[error("cannot run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {status}")]
    ToolStatus { program: String, status: String },

    #[error("no matching date line in tool output")]
    NoMatch,

    #[error("bad timestamp {value:?}: {source}")]
    Parse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("timestamp {0:?} does not exist in the local zone")]
    Nonexistent(String),

    #[error("stat failed: {0}")]
    Stat(#[source] io::Error),
}

/// Why a placement was abandoned.
#[derive(Debug, Error)]
pub enum PlaceError {
    #[error("cannot determine timestamp for {path}: {reason}")]
    Unresolved {
        path: PathBuf,
        #[source]
        reason: SourceError,
    },

    #[error("cannot compare with {path}: {source}")]
    Compare {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot copy to {path}: {source}")]
    Copy {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot copy permissions to {path}: {source}")]
    Permissions {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot set times on {path}: {source}")]
    SetTimes {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
