//! Error types for pod operations

use std::path::PathBuf;
use thiserror::Error;

pub type PodResult<T> = Result<T, PodError>;

/// Why a pod operation failed
#[derive(Error, Debug)]
pub enum PodError {
    /// The target directory has no `.git` entry
    #[error("{} is not a git repository", repository.display())]
    NotARepository { repository: PathBuf },

    /// An external command ran and exited non-zero
    #[error("`{command}` failed with exit status {status}")]
    CommandFailed { command: String, status: i32 },

    /// An external command could not be started at all
    #[error("Failed to run `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing or removing a file under the repository failed
    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `.podinfo` or `.gitmodules` could not be parsed where it had to be
    #[error("Failed to parse {}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    /// One or more items of a batch operation failed
    #[error("Operation failed for: {}", failed.join(", "))]
    BatchFailed { failed: Vec<String> },

    /// A new project could not be set up
    #[error("Could not create project at {}", repository.display())]
    ProjectSetup { repository: PathBuf },
}

impl PodError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PodError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for failures detected before anything was touched
    pub fn is_precondition(&self) -> bool {
        matches!(self, PodError::NotARepository { .. })
    }
}
