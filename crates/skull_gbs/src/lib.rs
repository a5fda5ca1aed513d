//! This library handles reading, writing and merging **GBS** scene records used by *Skullgirls*.
//!
//! # GBS Format Documentation
//!
//! A GBS file describes the fonts and textures a scene uses, followed by sections this crate does
//! not interpret (sounds, views and messages). Files are typically identified with the `.gbs`
//! extension. The PC release stores every multi-byte field little endian, the PS3 release big
//! endian; the file itself does not say which, so the byte order is detected (see [`endian`]).
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic                  | 4 bytes: usually "CSGG"                                    |
//! | 0x0004         | File Size              | 4 bytes: size of the file, optionally without the footer   |
//! | 0x0008         | Version                | 8 bytes: data version string                               |
//! | 0x0010         | Scene ID               | 4 bytes                                                    |
//! | 0x0014         | Counts                 | 5 x 4 bytes: fonts, textures, sounds, views, messages      |
//! | 0x0028         | Offsets                | 5 x 4 bytes: fonts, textures, sounds, views, messages      |
//!
//! Offsets are relative to the end of the 0x3C byte header. A font or texture section is present
//! when its count is non-zero; an opaque section when its count or offset is non-zero.
//!
//! ### Font
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Label                  | 4 bytes: usually "GFNT"                                 |
//! | 0x0004         | Length                 | 4 bytes: byte length of the entry                       |
//! | 0x0008         | ID                     | 4 bytes                                                 |
//! | 0x000C         | Name                   | 64 bytes: NUL padded                                    |
//! | 0x004C         | Size                   | 4 bytes: point size                                     |
//! | 0x0050         | Atlas Width / Height   | 2 x 4 bytes                                             |
//! | 0x0058         | Max Top                | 4 bytes                                                 |
//! | 0x005C         | Atlas Count            | 4 bytes                                                 |
//! | 0x0060         | Character Count        | 4 bytes                                                 |
//! | 0x0064         | Characters             | Character Count x 0x28 bytes                            |
//!
//! Each character holds a 4 byte code followed by nine 4 byte fields: image glyph flag, x/y
//! offset, width, height, top, advance, left bearing and atlas index.
//!
//! ### Texture
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | ID / Type              | 2 x 2 bytes                                             |
//! | 0x0004         | Path                   | 260 bytes: NUL padded                                   |
//! | 0x0108         | ID / Type              | 2 x 2 bytes: repeated                                   |
//! | 0x010C         | Reserved               | 8 bytes: zero                                           |
//! | 0x0114         | Scale                  | 2 x 4 bytes: float 1.0                                  |
//!
//! ### Trailer
//!
//! Bytes following the last known section are kept as an opaque tail. Some files end with the
//! footer `0x12344321`, written in the file's byte order.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.gbs`
//! - **Endianness**: per file, all fields share one byte order
//!

pub mod endian;
pub mod error;
pub mod merge;
pub mod read;
#[cfg(feature = "serde")]
mod serde;
pub mod types;
pub mod write;

pub use binrw::Endian;
pub use merge::{merge, MergeConfig};
pub use read::{RawSection, SceneRecord};
pub use types::Section;
