//! Byte order detection for scene records
//!
//! Scene records do not store their byte order. It is guessed from the raw bytes by running an
//! ordered list of [`Strategy`] probes; the first one to return a verdict wins and little endian
//! is assumed when none does.

use binrw::Endian;
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use tracing::debug;

use crate::types::{FOOTER, HEADER_SIZE};

/// A named byte order probe
#[derive(Debug, Clone, Copy)]
pub struct Strategy {
    /// Name used when logging the verdict
    pub name: &'static str,
    /// Returns a verdict if the probe recognises the buffer
    pub probe: fn(&[u8]) -> Option<Endian>,
}

/// Probes in the order they are consulted by [`detect`]
pub const STRATEGIES: &[Strategy] = &[
    Strategy {
        name: "footer",
        probe: footer,
    },
    Strategy {
        name: "file size",
        probe: file_size,
    },
];

/// Detect the byte order of a scene record using [`STRATEGIES`]
pub fn detect(buffer: &[u8]) -> Endian {
    detect_with(buffer, STRATEGIES)
}

/// Detect the byte order of a scene record with a custom list of probes
pub fn detect_with(buffer: &[u8], strategies: &[Strategy]) -> Endian {
    for strategy in strategies {
        if let Some(endian) = (strategy.probe)(buffer) {
            debug!("{} strategy detected {:?} endian", strategy.name, endian);
            return endian;
        }
    }

    debug!("no strategy matched, assuming little endian");
    Endian::Little
}

/// Byte order of the trailing footer, if the buffer ends with one
pub fn footer(buffer: &[u8]) -> Option<Endian> {
    if buffer.len() < HEADER_SIZE + 4 {
        return None;
    }

    let tail = &buffer[buffer.len() - 4..];
    if LittleEndian::read_u32(tail) == FOOTER {
        Some(Endian::Little)
    } else if BigEndian::read_u32(tail) == FOOTER {
        Some(Endian::Big)
    } else {
        None
    }
}

/// Byte order under which the header's file size agrees with the buffer length.
///
/// Exact matches are preferred over matches that leave room for a footer. A size that matches
/// under both orders is no verdict.
pub fn file_size(buffer: &[u8]) -> Option<Endian> {
    if buffer.len() < 8 {
        return None;
    }

    let little = LittleEndian::read_u32(&buffer[4..8]) as u64;
    let big = BigEndian::read_u32(&buffer[4..8]) as u64;
    let len = buffer.len() as u64;

    [len, len.saturating_sub(4)]
        .into_iter()
        .find_map(|expected| match (little == expected, big == expected) {
            (true, false) => Some(Endian::Little),
            (false, true) => Some(Endian::Big),
            _ => None,
        })
}
