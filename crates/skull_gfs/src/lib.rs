//! This library handles reading, editing and creating **GFS** archives used by *Skullgirls*.
//!
//! # GFS Archive Format Documentation
//!
//! A GFS archive ("Reverge Package File") stores many named files behind a lookup table. Files are
//! typically identified with the `.gfs` extension. Archives are never patched in place: edits are
//! queued on a [`GfsEditor`] and written by a commit that rebuilds the archive in a temporary file
//! and renames it over the original.
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Data Offset            | 4 bytes: where the payloads begin                          |
//! | 0x0004         | Identifier             | 8 byte length + "Reverge Package File"                     |
//! | 0x0024         | Version                | 8 byte length + "1.1"                                      |
//! | 0x002B         | File Count             | 8 bytes: number of records in the lookup table             |
//! | 0x0033         | Lookup Table           | File Count records                                         |
//!
//! ### Record
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Path Length            | 8 bytes                                                 |
//! | 0x0008         | Path                   | Path Length bytes, `/` separated                        |
//! | variable       | Data Length            | 8 bytes: payload size                                   |
//! | variable       | Reserved               | 4 bytes: always 1                                       |
//!
//! ### Payloads
//!
//! Payloads start at the data offset and follow each other in table order with no padding, so an
//! entry's offset is the sum of the lengths before it.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.gfs`
//! - **Endianness**: Big-endian for all multi-byte integers
//!

pub mod commit;
pub mod edit;
pub mod error;
pub mod pack;
pub mod read;
pub mod types;

pub use commit::CommitSummary;
pub use edit::{BatchReport, GfsEditor, GfsEditorOptions, PendingChange};
pub use pack::{pack_directory, unpack_archive};
pub use read::GfsArchive;
