use std::path::PathBuf;

/// Alias for `Result<T, ScanError>`.
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors produced while building an analyzer from an on-disk project.
///
/// Only the filesystem facade is fallible; the text-scanning core never
/// reports errors. A missing entry file is not an error either; the
/// index simply stays empty.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The project root directory could not be read.
    #[error("cannot read project directory {path}: {source}")]
    WorkspaceDir {
        /// The directory that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The entry file exists but its contents could not be read.
    #[error("cannot read entry file {path}: {source}")]
    EntryFile {
        /// The entry file that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
