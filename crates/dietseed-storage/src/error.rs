//! Error types shared by the probes, loaders, verifier and orchestrator.

use std::path::PathBuf;
use std::time::Duration;

use crate::Engine;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value `{value}` for {key}")]
    InvalidVar { key: String, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// A failure talking to one of the stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{engine} connection failed: {message}")]
    Connect { engine: Engine, message: String },

    #[error("{engine} request failed: {message}")]
    Request { engine: Engine, message: String },

    #[error("{engine} request timed out after {}s", .after.as_secs())]
    Timeout { engine: Engine, after: Duration },

    #[error("{engine} returned an unexpected result: {message}")]
    UnexpectedResult { engine: Engine, message: String },
}

impl StoreError {
    pub fn request(engine: Engine, err: impl std::fmt::Display) -> Self {
        StoreError::Request {
            engine,
            message: err.to_string(),
        }
    }

    pub fn connect(engine: Engine, err: impl std::fmt::Display) -> Self {
        StoreError::Connect {
            engine,
            message: err.to_string(),
        }
    }
}

/// A fatal failure of one bulk load.
///
/// Relationship edges never produce this; they are recorded in the load
/// report instead.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("invalid dataset: {0}")]
    Dataset(#[from] dietseed_dataset::DatasetError),

    #[error("failed to clear existing data: {0}")]
    Wipe(#[source] StoreError),

    #[error("failed to insert {kind} records: {source}")]
    Insert {
        kind: dietseed_dataset::EntityKind,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Why a seeding run did not complete.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("{engine} did not become ready after {attempts} attempts: {last_error}")]
    NotReady {
        engine: Engine,
        attempts: u32,
        last_error: String,
    },
}

/// A failed export of one store.
#[derive(Debug, thiserror::Error)]
pub enum DumpError {
    #[error("container `{container}` is not running")]
    NotRunning { container: String },

    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("`{command}` timed out after {}s", .after.as_secs())]
    Timeout { command: String, after: Duration },

    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid connection URI: {0}")]
    InvalidUri(String),
}
