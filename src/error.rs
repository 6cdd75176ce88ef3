use std::path::PathBuf;
use thiserror::Error;

/// Per-file failures. None of these stop a batch.
#[derive(Debug, Error)]
pub enum WeaveError {
    #[error("script source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("fragments present but no line markers in generated code")]
    NoMarkersFound,

    #[error("function signature not found: {0}")]
    FunctionSignatureNotFound(String),

    #[error("body of {0} has no closing brace")]
    TruncatedFunction(String),

    #[error("fragment opened at line {line} inside fragment opened at line {open_line}")]
    NestedFragment { line: usize, open_line: usize },

    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WeaveError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WeaveError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failures while loading the config file or the build descriptor.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid build descriptor: {0}")]
    InvalidBuild(String),

    #[error("invalid conventions in {}: `{field}` must not be empty", .path.display())]
    EmptyToken { path: PathBuf, field: &'static str },
}
