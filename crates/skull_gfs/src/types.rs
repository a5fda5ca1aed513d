//! Base types for structure of GFS file.

use binrw::binrw;

/// Library name every archive is tagged with
pub const IDENTIFIER: &str = "Reverge Package File";

/// Format version written by this crate
pub const VERSION: &str = "1.1";

/// Offset of the file count in a standard header
pub const COUNT_OFFSET: u64 = 0x2B;

/// Size of a standard header, where the lookup table begins
pub const HEADER_SIZE: u64 = 0x33;

/// Value of the reserved field following every record
pub const RESERVED: u32 = 1;

/// A string stored as an 8 byte big endian length followed by its bytes
#[binrw]
#[brw(big)]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PrefixedString {
    #[br(temp)]
    #[bw(try_calc = u64::try_from(bytes.len()))]
    len: u64,

    #[br(count = len as usize)]
    pub bytes: Vec<u8>,
}

impl PrefixedString {
    /// Lossy UTF-8 view of the bytes
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    /// Number of bytes this string occupies when written
    pub fn byte_len(&self) -> u64 {
        8 + self.bytes.len() as u64
    }
}

impl From<&str> for PrefixedString {
    fn from(value: &str) -> Self {
        Self {
            bytes: value.as_bytes().to_vec(),
        }
    }
}

impl From<&[u8]> for PrefixedString {
    fn from(value: &[u8]) -> Self {
        Self {
            bytes: value.to_vec(),
        }
    }
}

/// GFS file header
///
/// All data is stored in big endian format. With the standard identifier and version the file
/// count lands at [`COUNT_OFFSET`] and the lookup table starts at [`HEADER_SIZE`].
#[binrw]
#[brw(big)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GfsHeader {
    /// Offset from the beginning of the file where the payloads start
    pub data_offset: u32,

    /// Library name, normally [`IDENTIFIER`]
    pub identifier: PrefixedString,

    /// Format version, normally [`VERSION`]
    pub version: PrefixedString,

    /// Number of records in the lookup table
    pub file_count: u64,
}

impl Default for GfsHeader {
    fn default() -> Self {
        Self {
            data_offset: HEADER_SIZE as u32,
            identifier: IDENTIFIER.into(),
            version: VERSION.into(),
            file_count: 0,
        }
    }
}

impl GfsHeader {
    /// Number of bytes this header occupies when written
    pub fn byte_len(&self) -> u64 {
        4 + self.identifier.byte_len() + self.version.byte_len() + 8
    }
}

/// GFS lookup table record
///
/// Payload offsets are not stored; each payload follows the previous one.
#[binrw]
#[brw(big)]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GfsRecord {
    /// Archive-internal path of the entry
    pub path: PrefixedString,

    /// Size of the payload in bytes
    pub data_length: u64,

    #[br(temp)]
    #[bw(calc = RESERVED)]
    _reserved: u32,
}

impl GfsRecord {
    /// Build a record for a payload
    pub fn new(path: impl Into<PrefixedString>, data_length: u64) -> Self {
        Self {
            path: path.into(),
            data_length,
        }
    }

    /// Number of bytes this record occupies when written
    pub fn byte_len(&self) -> u64 {
        self.path.byte_len() + 8 + 4
    }
}
