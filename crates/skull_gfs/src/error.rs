//! Error types that can be emitted from this library

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// file is an invalid gfs archive
    #[error("file is an invalid gfs archive: {0}")]
    InvalidArchive(String),

    /// unable to find requested file
    #[error("unable to find requested file")]
    FileNotFound(#[from] FileNotFoundError),

    /// an entry with this path already exists
    #[error("{0} already exists in the archive")]
    AlreadyExists(String),

    /// a source file exceeds the transfer buffer
    #[error("{} is {size} bytes, larger than the {limit} byte transfer limit", .path.display())]
    TooLarge {
        /// Offending source file
        path: PathBuf,
        /// Its size in bytes
        size: u64,
        /// Configured transfer limit
        limit: u64,
    },

    /// path is not a regular file
    #[error("{} is not a regular file", .0.display())]
    NotAFile(PathBuf),

    /// path is not a directory
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// entry path would escape the extraction directory
    #[error("refusing to extract {0} outside of the destination")]
    UnsafePath(String),

    /// value does not fit into its on-disk field
    #[error("{0} does not fit into its field")]
    Overflow(&'static str),

    /// {0}
    #[error("{0}")]
    CustomError(String),
}

/// Error type to provide further information when a file has not been found
#[derive(Error, Diagnostic, Debug)]
#[error("unable to find requested file")]
pub enum FileNotFoundError {
    /// at index {0}
    #[error("at index {0}")]
    Index(usize),

    /// by name {0}
    #[error("by name {0}")]
    Name(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
