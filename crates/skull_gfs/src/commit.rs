//! Transactional rewrite of an archive
//!
//! A commit never touches the original file until the new one is complete: the header, table and
//! payloads are written to `<archive>.tmp`, which is then renamed over the original.

use binrw::BinWrite;
use indexmap::IndexMap;
use std::{
    ffi::OsString,
    fs::{self, File, OpenOptions},
    io::{BufWriter, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{debug, info, instrument, warn};

use crate::{
    edit::GfsEditor,
    error::{Error, Result},
    read::{GfsFileData, Shared},
    types::{GfsHeader, GfsRecord},
};

/// A run of payload bytes copied with one read and one write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// Start of the run, relative to the data offset
    pub offset: u64,
    /// Length of the run
    pub length: u64,
}

impl Block {
    /// Offset one past the end of the run
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }
}

/// Counters describing a finished commit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitSummary {
    /// Entries carried over from the original
    pub kept: usize,
    /// Entries whose payload was replaced
    pub replaced: usize,
    /// Entries that did not exist before
    pub added: usize,
    /// Coalesced blocks copied from the original
    pub blocks: usize,
    /// Size of the new archive
    pub bytes_written: u64,
}

/// Group entries into contiguous runs of at most `limit` bytes.
///
/// An entry longer than `limit` forms a run of its own and is copied in `limit` sized chunks.
/// Empty entries have nothing to copy and are left out.
pub fn coalesce<'a>(entries: impl IntoIterator<Item = &'a GfsFileData>, limit: u64) -> Vec<Block> {
    let limit = limit.max(1);
    let mut blocks: Vec<Block> = Vec::new();

    for entry in entries {
        if entry.data_length == 0 {
            continue;
        }

        match blocks.last_mut() {
            Some(last)
                if last.end() == entry.data_offset
                    && last.length + entry.data_length <= limit =>
            {
                last.length += entry.data_length;
            }
            _ => blocks.push(Block {
                offset: entry.data_offset,
                length: entry.data_length,
            }),
        }
    }

    blocks
}

/// Path of the scratch file a commit writes to
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn copy_exact<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    mut length: u64,
    buffer: &mut [u8],
) -> Result<()> {
    while length > 0 {
        let chunk = length.min(buffer.len() as u64) as usize;
        reader.read_exact(&mut buffer[..chunk])?;
        writer.write_all(&buffer[..chunk])?;
        length -= chunk as u64;
    }
    Ok(())
}

impl GfsEditor {
    /// Write all pending changes.
    ///
    /// Nothing happens when the queue is empty. Otherwise the archive is rebuilt in a temporary
    /// file beside it and renamed into place. On failure the temporary file is removed, while the
    /// original archive, the table and the queue stay as they were.
    #[instrument(skip(self), fields(path = %self.path.display()), err)]
    pub fn commit(&mut self) -> Result<CommitSummary> {
        if self.pending.is_empty() {
            debug!("nothing to commit");
            return Ok(CommitSummary::default());
        }

        let temp_path = temp_path_for(&self.path);
        let temp = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)?;

        let result = self
            .write_archive(temp)
            .and_then(|built| fs::rename(&temp_path, &self.path).map(|_| built).map_err(Error::from));

        match result {
            Ok((shared, summary)) => {
                self.shared = Arc::new(shared);
                self.pending.clear();
                info!(
                    "committed {} kept, {} replaced, {} added",
                    summary.kept, summary.replaced, summary.added
                );
                Ok(summary)
            }
            Err(e) => {
                if let Err(cleanup) = fs::remove_file(&temp_path) {
                    warn!("unable to remove {}: {cleanup}", temp_path.display());
                }
                Err(e)
            }
        }
    }

    /// Build the new archive into `temp`, returning its table.
    fn write_archive(&self, temp: File) -> Result<(Shared, CommitSummary)> {
        let limit = self.options.max_transfer_size.max(1);

        let mut sizes = Vec::with_capacity(self.pending.len());
        for change in self.pending.values() {
            let metadata = fs::metadata(&change.source)?;
            if !metadata.is_file() {
                return Err(Error::NotAFile(change.source.clone()));
            }
            if metadata.len() > limit {
                return Err(Error::TooLarge {
                    path: change.source.clone(),
                    size: metadata.len(),
                    limit,
                });
            }
            sizes.push(metadata.len());
        }

        let survivors: Vec<&GfsFileData> = self
            .shared
            .files
            .values()
            .filter(|file| {
                self.pending
                    .get(&*file.path)
                    .map_or(true, |change| change.is_new)
            })
            .collect();

        let mut files = IndexMap::with_capacity(survivors.len() + self.pending.len());
        let mut offset = 0u64;
        for survivor in &survivors {
            let file = GfsFileData {
                data_offset: offset,
                ..(*survivor).clone()
            };
            offset += file.data_length;
            files.insert(file.path.clone(), file);
        }
        for (change, &size) in self.pending.values().zip(&sizes) {
            let file = GfsFileData {
                path: change.path.as_str().into(),
                path_raw: change.path.as_bytes().into(),
                data_length: size,
                data_offset: offset,
            };
            offset += size;
            files.insert(file.path.clone(), file);
        }

        let records: Vec<GfsRecord> = files.values().map(GfsFileData::to_record).collect();
        let mut header = GfsHeader {
            file_count: files.len() as u64,
            ..Default::default()
        };
        let table_end = records
            .iter()
            .fold(header.byte_len(), |total, record| total + record.byte_len());
        header.data_offset =
            u32::try_from(table_end).map_err(|_| Error::Overflow("data offset"))?;

        let blocks = coalesce(survivors.iter().copied(), limit);
        let largest = blocks
            .iter()
            .map(|block| block.length)
            .chain(sizes.iter().copied())
            .max()
            .unwrap_or(0)
            .min(limit);
        let largest = usize::try_from(largest).map_err(|_| Error::Overflow("transfer size"))?;
        let mut buffer = vec![0u8; largest];

        let mut writer = BufWriter::new(temp);
        header.write(&mut writer)?;
        for record in &records {
            record.write(&mut writer)?;
        }

        if !blocks.is_empty() {
            let mut original = File::open(&self.path)?;
            for block in &blocks {
                original.seek(SeekFrom::Start(self.data_offset() + block.offset))?;
                copy_exact(&mut original, &mut writer, block.length, &mut buffer)?;
            }
        }

        for (change, &size) in self.pending.values().zip(&sizes) {
            let mut source = File::open(&change.source)?;
            copy_exact(&mut source, &mut writer, size, &mut buffer)?;
            if source.metadata()?.len() != size {
                return Err(Error::CustomError(format!(
                    "{} changed size during commit",
                    change.source.display()
                )));
            }
        }

        writer.flush()?;
        let bytes_written = writer.stream_position()?;
        let temp = writer.into_inner().map_err(|e| e.into_error())?;
        temp.sync_all()?;

        let replaced = self.pending.values().filter(|c| !c.is_new).count();
        let summary = CommitSummary {
            kept: survivors.len(),
            replaced,
            added: self.pending.len() - replaced,
            blocks: blocks.len(),
            bytes_written,
        };

        Ok((Shared { header, files }, summary))
    }
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use crate::commit::{coalesce, temp_path_for, Block};
    use crate::read::GfsFileData;

    fn entry(data_offset: u64, data_length: u64) -> GfsFileData {
        GfsFileData {
            data_offset,
            data_length,
            ..Default::default()
        }
    }

    #[test]
    fn coalesce_contiguous_runs() {
        let entries = [entry(0, 4), entry(4, 4), entry(8, 2), entry(20, 5), entry(25, 5)];

        assert_eq!(
            coalesce(&entries, 100),
            vec![
                Block { offset: 0, length: 10 },
                Block { offset: 20, length: 10 },
            ]
        );
    }

    #[test]
    fn coalesce_respects_limit() {
        let entries = [entry(0, 4), entry(4, 4), entry(8, 4)];

        assert_eq!(
            coalesce(&entries, 8),
            vec![
                Block { offset: 0, length: 8 },
                Block { offset: 8, length: 4 },
            ]
        );
    }

    #[test]
    fn coalesce_oversized_and_empty() {
        let entries = [entry(0, 0), entry(0, 32), entry(32, 0), entry(32, 1)];

        assert_eq!(
            coalesce(&entries, 16),
            vec![
                Block { offset: 0, length: 32 },
                Block { offset: 32, length: 1 },
            ]
        );
    }

    #[test]
    fn temp_path() {
        assert_eq!(
            temp_path_for(Path::new("data/core.gfs")),
            Path::new("data/core.gfs.tmp")
        );
    }
}
