//! Error types that can be emitted from this library
//!

use miette::Diagnostic;
use thiserror::Error;

use crate::types::Section;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// Buffer is too short to hold the fixed header
    #[error("scene record is truncated: needed {needed} bytes but only {actual} are available")]
    Truncated {
        /// Bytes required
        needed: usize,
        /// Bytes present
        actual: usize,
    },

    /// A section offset points past the end of the structured data
    #[error("{section} section starts at {offset:#x}, past the end of the data at {end:#x}")]
    SectionOutOfBounds {
        /// Offending section
        section: Section,
        /// Absolute offset of the section start
        offset: u64,
        /// Absolute offset where the structured data ends
        end: u64,
    },

    /// A computed size or offset does not fit into the 32-bit header fields
    #[error("{0} does not fit into a 32-bit field")]
    Overflow(&'static str),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
