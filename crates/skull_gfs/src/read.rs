//! Types for reading GFS archives
//!

use binrw::BinRead;
use indexmap::IndexMap;
use std::{
    borrow::Cow,
    fmt::{self, Debug},
    io::{self, Read, Seek, SeekFrom, Take},
    sync::Arc,
};
use tracing::warn;

use crate::{
    error::{Error, FileNotFoundError, Result},
    types::{GfsHeader, GfsRecord, IDENTIFIER, VERSION},
};

/// A struct for reading an entry from a GFS file
pub struct GfsFile<'a, R: Read + Seek> {
    data: Cow<'a, GfsFileData>,
    reader: Take<&'a mut R>,
}

impl<'a, R: Read + Seek> Debug for GfsFile<'a, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "GfsFile({:#?})", self.get_metadata())
    }
}

/// Methods for retrieving information on GFS file entries
impl<'a, R: Read + Seek> GfsFile<'a, R> {
    /// Get the name of the file
    ///
    /// # Warnings
    ///
    /// It is dangerous to use this name directly when extracting an archive.
    /// It may contain an absolute path (`/etc/shadow`), or break out of the
    /// current directory (`../runtime`). Use [`crate::edit::GfsEditor::extract_files`]
    /// which rejects such names.
    pub fn name(&self) -> &str {
        &self.get_metadata().path
    }

    /// Get the name of the file, in the raw (internal) byte representation.
    pub fn name_raw(&self) -> &[u8] {
        &self.get_metadata().path_raw
    }

    /// Get the size of the file, in bytes
    pub fn size(&self) -> u64 {
        self.get_metadata().data_length
    }

    /// Get the offset of the payload relative to the start of the payload region
    pub fn data_offset(&self) -> u64 {
        self.get_metadata().data_offset
    }

    fn get_metadata(&self) -> &GfsFileData {
        self.data.as_ref()
    }
}

impl<R: Read + Seek> Read for GfsFile<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

/// Structure representing a GFS file entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GfsFileData {
    /// Archive-internal path of the file
    pub path: Box<str>,
    /// Raw path. To be used when path was incorrectly decoded.
    pub path_raw: Box<[u8]>,
    /// Size of the payload
    pub data_length: u64,
    /// Offset of the payload relative to the header's data offset
    pub data_offset: u64,
}

impl GfsFileData {
    /// Offset one past the end of the payload, relative to the data offset
    pub fn data_end(&self) -> u64 {
        self.data_offset + self.data_length
    }

    /// The lookup table record describing this entry
    pub fn to_record(&self) -> GfsRecord {
        GfsRecord::new(&*self.path_raw, self.data_length)
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Shared {
    pub(crate) header: GfsHeader,
    pub(crate) files: IndexMap<Box<str>, GfsFileData>,
}

impl Shared {
    /// Read the header and lookup table of an archive
    pub(crate) fn read<R: Read + Seek>(reader: &mut R) -> Result<Shared> {
        let header = GfsHeader::read(reader)?;

        if header.identifier.bytes != IDENTIFIER.as_bytes()
            || header.version.bytes != VERSION.as_bytes()
        {
            warn!(
                "unexpected archive identifier {:?} version {:?}",
                header.identifier.to_string_lossy(),
                header.version.to_string_lossy()
            );
        }

        let mut files = IndexMap::with_capacity(header.file_count.min(1 << 16) as usize);
        let mut data_offset = 0u64;
        for _ in 0..header.file_count {
            let record = GfsRecord::read(reader)?;
            let file = GfsFileData {
                path: record.path.to_string_lossy().into(),
                path_raw: record.path.bytes.into(),
                data_length: record.data_length,
                data_offset,
            };
            data_offset = data_offset
                .checked_add(record.data_length)
                .ok_or_else(|| Error::InvalidArchive("payload sizes overflow".into()))?;

            if files.contains_key(&file.path) {
                warn!("duplicate entry {}, keeping the last one", file.path);
            }
            files.insert(file.path.clone(), file);
        }

        let table_end = reader.stream_position()?;
        if table_end > header.data_offset as u64 {
            return Err(Error::InvalidArchive(format!(
                "lookup table ends at {:#x}, past the data offset {:#x}",
                table_end, header.data_offset
            )));
        }

        Ok(Shared { header, files })
    }

    /// Absolute position of an entry's payload
    pub(crate) fn data_start(&self, file: &GfsFileData) -> u64 {
        self.header.data_offset as u64 + file.data_offset
    }
}

/// GFS archive reader
///
/// ```no_run
/// use std::io::prelude::*;
///
/// fn list_gfs_contents(reader: impl Read + Seek) -> skull_gfs::error::Result<()> {
///     let mut gfs = skull_gfs::GfsArchive::new(reader)?;
///
///     for i in 0..gfs.len() {
///         let mut file = gfs.by_index(i)?;
///         println!("Filename: {}", file.name());
///         std::io::copy(&mut file, &mut std::io::stdout())?;
///     }
///
///     Ok(())
/// }
/// ```
pub struct GfsArchive<R> {
    reader: R,
    shared: Arc<Shared>,
}

impl<R> GfsArchive<R> {
    /// Total size of the payloads in the archive, if it can be known.
    pub fn payload_size(&self) -> Option<u128> {
        let mut total = 0u128;
        for file in self.shared.files.values() {
            total = total.checked_add(file.data_length as u128)?;
        }
        Some(total)
    }
}

impl<R: Read + Seek> GfsArchive<R> {
    /// Read a GFS archive collecting the files it contains.
    pub fn new(mut reader: R) -> Result<GfsArchive<R>> {
        let shared = Shared::read(&mut reader).map_err(|e| match e {
            Error::InvalidArchive(reason) => Error::InvalidArchive(reason),
            e => Error::InvalidArchive(e.to_string()),
        })?;

        Ok(GfsArchive {
            reader,
            shared: shared.into(),
        })
    }

    pub(crate) fn with_shared(reader: R, shared: Arc<Shared>) -> GfsArchive<R> {
        GfsArchive { reader, shared }
    }

    pub(crate) fn shared(&self) -> &Arc<Shared> {
        &self.shared
    }

    /// Number of entries contained in this GFS.
    pub fn len(&self) -> usize {
        self.shared.files.len()
    }

    /// Whether this GFS archive contains no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offset from the start of the file where the payloads begin
    pub fn data_offset(&self) -> u64 {
        self.shared.header.data_offset as u64
    }

    /// Returns an iterator over all the file names in this archive.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.shared.files.keys().map(|s| s.as_ref())
    }

    /// Returns an iterator over the metadata of every entry, in table order.
    pub fn entries(&self) -> impl Iterator<Item = &GfsFileData> {
        self.shared.files.values()
    }

    /// Get the index of a file entry by name, if it's present.
    #[inline(always)]
    pub fn index_for_name(&self, name: &str) -> Option<usize> {
        self.shared.files.get_index_of(name)
    }

    /// Get the name of a file entry, if it's present.
    #[inline(always)]
    pub fn name_for_index(&self, index: usize) -> Option<&str> {
        self.shared
            .files
            .get_index(index)
            .map(|(name, _)| name.as_ref())
    }

    /// Search for a file entry by name
    pub fn by_name(&mut self, name: &str) -> Result<GfsFile<'_, R>> {
        let Some(index) = self.shared.files.get_index_of(name) else {
            return Err(Error::FileNotFound(FileNotFoundError::Name(
                name.to_owned(),
            )));
        };
        self.by_index(index)
    }

    /// Get a contained file by index
    pub fn by_index(&mut self, file_number: usize) -> Result<GfsFile<'_, R>> {
        let (_, data) = self
            .shared
            .files
            .get_index(file_number)
            .ok_or(Error::FileNotFound(FileNotFoundError::Index(file_number)))?;

        self.reader
            .seek(SeekFrom::Start(self.shared.data_start(data)))?;

        Ok(GfsFile {
            data: Cow::Borrowed(data),
            reader: (&mut self.reader).take(data.data_length),
        })
    }

    /// Unwrap and return the inner reader object
    ///
    /// The position of the reader is undefined.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

#[cfg(test)]
mod test {
    use std::io::prelude::*;

    use crate::{error::Result, read::GfsArchive};
    use std::io::Cursor;

    #[rustfmt::skip]
    const HEADER: [u8; 0x2B] = [
        0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x14,
        b'R', b'e', b'v', b'e', b'r', b'g', b'e', b' ', b'P', b'a',
        b'c', b'k', b'a', b'g', b'e', b' ', b'F', b'i', b'l', b'e',
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03,
        b'1', b'.', b'1',
    ];

    fn archive(data_offset: u32, count: u64, table: &[u8], payload: &[u8]) -> Vec<u8> {
        let mut out = HEADER.to_vec();
        out[0..4].copy_from_slice(&data_offset.to_be_bytes());
        out.extend_from_slice(&count.to_be_bytes());
        out.extend_from_slice(table);
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn read_truncated_header() {
        let archive = GfsArchive::new(Cursor::new(&HEADER[..20]));
        assert!(archive.is_err());
    }

    #[test]
    fn read_empty_gfs() -> Result<()> {
        let archive = GfsArchive::new(Cursor::new(archive(0x33, 0, &[], &[])))?;
        assert!(archive.is_empty());
        assert_eq!(archive.data_offset(), 0x33);

        Ok(())
    }

    #[test]
    fn read_table_past_data_offset() {
        #[rustfmt::skip]
        let table = [
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, b'a',
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x01,
        ];

        let archive = GfsArchive::new(Cursor::new(archive(0x33, 1, &table, &[])));
        assert!(archive.is_err());
    }

    #[test]
    fn read_gfs_with_multiple_entries() -> Result<()> {
        #[rustfmt::skip]
        let table = [
            // Records (2 x 29)
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x09,
            0x68, 0x65, 0x6C, 0x6C, 0x6F, 0x2E, 0x74, 0x78, 0x74,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0B,
            0x00, 0x00, 0x00, 0x01,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x09,
            0x77, 0x6F, 0x72, 0x6C, 0x64, 0x2E, 0x74, 0x78, 0x74,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x05,
            0x00, 0x00, 0x00, 0x01,
        ];
        let payload = b"Hello WorldWorld";

        let mut archive = GfsArchive::new(Cursor::new(archive(0x6D, 2, &table, payload)))?;
        assert_eq!(archive.len(), 2);
        assert_eq!(archive.index_for_name("world.txt"), Some(1));
        assert_eq!(archive.payload_size(), Some(16));

        let mut buffer = Vec::new();

        let mut file_first = archive.by_index(0)?;
        assert_eq!(file_first.data_offset(), 0);
        assert_eq!(file_first.name(), "hello.txt");

        file_first.read_to_end(&mut buffer)?;
        assert_eq!(buffer, b"Hello World");
        buffer.clear();

        let mut file_second = archive.by_name("world.txt")?;
        assert_eq!(file_second.data_offset(), 11);
        assert_eq!(file_second.size(), 5);

        file_second.read_to_end(&mut buffer)?;
        assert_eq!(buffer, b"World");

        assert!(archive.by_name("missing.txt").is_err());

        Ok(())
    }
}
