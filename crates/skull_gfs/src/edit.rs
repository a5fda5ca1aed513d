//! Queued edits against a GFS archive on disk
//!

use binrw::BinWrite;
use bon::Builder;
use indexmap::IndexMap;
use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufReader, BufWriter, Write},
    path::{Component, Path, PathBuf},
    sync::Arc,
};
use tracing::{debug, error, info, instrument, warn};
use walkdir::WalkDir;

use crate::{
    error::{Error, FileNotFoundError, Result},
    read::{GfsArchive, GfsFile, GfsFileData, Shared},
    types::GfsHeader,
};

#[cfg(target_pointer_width = "32")]
const DEFAULT_TRANSFER_SIZE: u64 = 4 * 1024 * 1024;
#[cfg(not(target_pointer_width = "32"))]
const DEFAULT_TRANSFER_SIZE: u64 = 16 * 1024 * 1024;

/// Options for how an archive is edited
#[derive(Debug, Clone, Copy, Builder)]
pub struct GfsEditorOptions {
    /// Largest number of bytes moved by a single read/write during commit. Source files larger
    /// than this are rejected.
    #[builder(default = DEFAULT_TRANSFER_SIZE)]
    pub max_transfer_size: u64,
}

impl Default for GfsEditorOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A queued add or replace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChange {
    /// Archive-internal path
    pub path: String,
    /// File the payload is read from at commit time
    pub source: PathBuf,
    /// Whether the path was absent from the archive when queued
    pub is_new: bool,
}

/// Outcome of an operation over many files, where single failures do not stop the rest
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Paths that were handled
    pub succeeded: Vec<String>,
    /// Paths that failed, with the reason
    pub failures: Vec<(String, Error)>,
}

impl BatchReport {
    /// True if nothing failed
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, path: String, result: Result<()>) {
        match result {
            Ok(()) => self.succeeded.push(path),
            Err(e) => {
                error!("{path}: {e}");
                self.failures.push((path, e));
            }
        }
    }
}

/// Editor for a GFS archive
///
/// Only the header and lookup table are held in memory. Changes are queued with
/// [`GfsEditor::add_file`] and friends and written by [`GfsEditor::commit`], which rewrites the
/// whole archive through a temporary file.
///
/// ```no_run
/// # fn doit() -> skull_gfs::error::Result<()> {
/// use skull_gfs::GfsEditor;
///
/// let mut editor = GfsEditor::open("data01.gfs")?;
/// editor.add_file("ui/title.dds", "title.dds", true)?;
/// editor.commit()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct GfsEditor {
    pub(crate) path: PathBuf,
    pub(crate) shared: Arc<Shared>,
    pub(crate) pending: IndexMap<String, PendingChange>,
    pub(crate) options: GfsEditorOptions,
}

impl GfsEditor {
    /// Open an existing archive with default options
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, GfsEditorOptions::default())
    }

    /// Open an existing archive
    #[instrument(skip(path), fields(path = %path.as_ref().display()), err)]
    pub fn open_with_options(path: impl AsRef<Path>, options: GfsEditorOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let archive = GfsArchive::new(BufReader::new(file))?;
        debug!("opened {} with {} entries", path.display(), archive.len());

        Ok(Self {
            path: path.to_path_buf(),
            shared: archive.shared().clone(),
            pending: IndexMap::new(),
            options,
        })
    }

    /// Create a new, empty archive. Fails if the file already exists.
    #[instrument(skip(path), fields(path = %path.as_ref().display()), err)]
    pub fn create(path: impl AsRef<Path>, options: GfsEditorOptions) -> Result<Self> {
        let path = path.as_ref();
        let header = GfsHeader::default();

        let file = OpenOptions::new().write(true).create_new(true).open(path)?;
        let mut writer = BufWriter::new(file);
        header.write(&mut writer)?;
        writer.flush()?;

        Ok(Self {
            path: path.to_path_buf(),
            shared: Arc::new(Shared {
                header,
                files: IndexMap::new(),
            }),
            pending: IndexMap::new(),
            options,
        })
    }

    /// Location of the archive
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Options the editor was opened with
    pub fn options(&self) -> &GfsEditorOptions {
        &self.options
    }

    /// Number of committed entries
    pub fn len(&self) -> usize {
        self.shared.files.len()
    }

    /// Whether the archive holds no committed entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Committed entries in table order
    pub fn entries(&self) -> impl Iterator<Item = &GfsFileData> {
        self.shared.files.values()
    }

    /// Look up a committed entry
    pub fn entry(&self, path: &str) -> Option<&GfsFileData> {
        self.shared.files.get(path)
    }

    /// Offset from the start of the file where the payloads begin
    pub fn data_offset(&self) -> u64 {
        self.shared.header.data_offset as u64
    }

    /// Queued changes in the order they will be written
    pub fn pending_changes(&self) -> impl Iterator<Item = &PendingChange> {
        self.pending.values()
    }

    /// Open a reader over the committed archive
    pub fn archive(&self) -> Result<GfsArchive<BufReader<File>>> {
        let file = File::open(&self.path)?;
        Ok(GfsArchive::with_shared(
            BufReader::new(file),
            self.shared.clone(),
        ))
    }

    /// Queue `source` to be stored as `path`.
    ///
    /// Queuing a path that is already pending only changes its source. An existing entry is only
    /// replaced when `allow_replace` is set.
    #[instrument(skip(self, source), fields(source = %source.as_ref().display()), err)]
    pub fn add_file(
        &mut self,
        path: &str,
        source: impl AsRef<Path>,
        allow_replace: bool,
    ) -> Result<()> {
        let source = source.as_ref();
        if path.is_empty() {
            return Err(Error::UnsafePath(path.to_owned()));
        }

        let metadata = fs::metadata(source)?;
        if !metadata.is_file() {
            return Err(Error::NotAFile(source.to_path_buf()));
        }
        if metadata.len() > self.options.max_transfer_size {
            return Err(Error::TooLarge {
                path: source.to_path_buf(),
                size: metadata.len(),
                limit: self.options.max_transfer_size,
            });
        }

        if let Some(change) = self.pending.get_mut(path) {
            debug!("retargeting pending {path}");
            change.source = source.to_path_buf();
            return Ok(());
        }

        let exists = self.shared.files.contains_key(path);
        if exists && !allow_replace {
            return Err(Error::AlreadyExists(path.to_owned()));
        }

        self.pending.insert(
            path.to_owned(),
            PendingChange {
                path: path.to_owned(),
                source: source.to_path_buf(),
                is_new: !exists,
            },
        );

        Ok(())
    }

    /// Queue every regular file below `dir`, stored under `prefix` with `/` separators.
    #[instrument(skip(self, dir), fields(dir = %dir.as_ref().display()), err)]
    pub fn add_directory(
        &mut self,
        dir: impl AsRef<Path>,
        prefix: &str,
        allow_replace: bool,
    ) -> Result<BatchReport> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::NotADirectory(dir.to_path_buf()));
        }

        let mut report = BatchReport::default();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default();
                    report.record(path, Err(io::Error::from(e).into()));
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(dir) else {
                continue;
            };
            let archive_path = join_archive_path(prefix, relative);
            let result = self.add_file(&archive_path, entry.path(), allow_replace);
            report.record(archive_path, result);
        }

        info!(
            "queued {} files, {} failed",
            report.succeeded.len(),
            report.failures.len()
        );
        Ok(report)
    }

    /// Write one committed entry to `destination`, creating parent directories. Returns the
    /// number of bytes written.
    #[instrument(skip(self, destination), fields(destination = %destination.as_ref().display()), err)]
    pub fn extract_file(&self, path: &str, destination: impl AsRef<Path>) -> Result<u64> {
        if !self.shared.files.contains_key(path) {
            return Err(FileNotFoundError::Name(path.to_owned()).into());
        }

        let mut archive = self.archive()?;
        let file = archive.by_name(path)?;
        write_entry(file, destination.as_ref())
    }

    /// Extract every entry equal to or nested under `prefix` into `destination`, keeping the
    /// structure below the prefix. An empty prefix extracts everything.
    #[instrument(skip(self, destination), fields(destination = %destination.as_ref().display()), err)]
    pub fn extract_files(&self, destination: impl AsRef<Path>, prefix: &str) -> Result<BatchReport> {
        let destination = destination.as_ref();
        let prefix = prefix.trim_end_matches('/');

        let mut archive = self.archive()?;
        let mut report = BatchReport::default();
        for (index, name) in self.shared.files.keys().enumerate() {
            let Some(relative) = relative_to_prefix(name, prefix) else {
                continue;
            };

            let result = safe_relative_path(relative).and_then(|relative| {
                let file = archive.by_index(index)?;
                write_entry(file, &destination.join(relative)).map(|_| ())
            });
            report.record(name.to_string(), result);
        }

        info!(
            "extracted {} files, {} failed",
            report.succeeded.len(),
            report.failures.len()
        );
        Ok(report)
    }
}

fn write_entry<R>(file: GfsFile<'_, R>, destination: &Path) -> Result<u64>
where
    R: io::Read + io::Seek,
{
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }

    let output = File::create(destination)?;
    match copy_entry(file, output) {
        Ok(written) => Ok(written),
        Err(e) => {
            if let Err(cleanup) = fs::remove_file(destination) {
                warn!("unable to remove {}: {cleanup}", destination.display());
            }
            Err(e)
        }
    }
}

/// Copy a payload, failing if the archive ends before `data_length` bytes were read
fn copy_entry<R>(mut file: GfsFile<'_, R>, output: File) -> Result<u64>
where
    R: io::Read + io::Seek,
{
    let expected = file.size();
    let mut writer = BufWriter::new(output);
    let written = io::copy(&mut file, &mut writer)?;
    writer.flush()?;

    if written != expected {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("{} ended after {written} of {expected} bytes", file.name()),
        )
        .into());
    }
    Ok(written)
}

/// Archive path of `relative` below `prefix`
pub(crate) fn join_archive_path(prefix: &str, relative: &Path) -> String {
    let mut path = prefix.trim_end_matches('/').to_owned();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            if !path.is_empty() {
                path.push('/');
            }
            path.push_str(&part.to_string_lossy());
        }
    }
    path
}

/// Part of `name` below `prefix`. An exact match keeps only the last segment.
pub(crate) fn relative_to_prefix<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return Some(name);
    }
    if name == prefix {
        return Some(name.rsplit('/').next().unwrap_or(name));
    }
    name.strip_prefix(prefix)?.strip_prefix('/')
}

/// Reject entry names that would land outside the extraction directory
pub(crate) fn safe_relative_path(name: &str) -> Result<PathBuf> {
    if name.starts_with('/') || name.contains('\\') || name.contains(':') {
        return Err(Error::UnsafePath(name.to_owned()));
    }

    let mut path = PathBuf::new();
    for component in name.split('/') {
        match component {
            "" | "." => continue,
            ".." => return Err(Error::UnsafePath(name.to_owned())),
            part => path.push(part),
        }
    }

    if path.as_os_str().is_empty() {
        return Err(Error::UnsafePath(name.to_owned()));
    }
    Ok(path)
}

#[cfg(test)]
mod test {
    use std::path::{Path, PathBuf};

    use crate::edit::{join_archive_path, relative_to_prefix, safe_relative_path, GfsEditorOptions};

    #[test]
    fn default_transfer_size() {
        let options = GfsEditorOptions::default();
        assert!(options.max_transfer_size >= 4 * 1024 * 1024);

        let options = GfsEditorOptions::builder().max_transfer_size(16).build();
        assert_eq!(options.max_transfer_size, 16);
    }

    #[test]
    fn archive_paths() {
        assert_eq!(join_archive_path("", Path::new("a/x.bin")), "a/x.bin");
        assert_eq!(join_archive_path("data/", Path::new("x.bin")), "data/x.bin");
        assert_eq!(join_archive_path("data", Path::new("./b/x.bin")), "data/b/x.bin");
    }

    #[test]
    fn prefix_matching() {
        assert_eq!(relative_to_prefix("a/x.bin", "a"), Some("x.bin"));
        assert_eq!(relative_to_prefix("a/b/x.bin", "a"), Some("b/x.bin"));
        assert_eq!(relative_to_prefix("ab/x.bin", "a"), None);
        assert_eq!(relative_to_prefix("a/x.bin", "a/x.bin"), Some("x.bin"));
        assert_eq!(relative_to_prefix("b/z.bin", ""), Some("b/z.bin"));
    }

    #[test]
    fn unsafe_paths() {
        assert!(safe_relative_path("../etc/passwd").is_err());
        assert!(safe_relative_path("a/../../x").is_err());
        assert!(safe_relative_path("/etc/shadow").is_err());
        assert!(safe_relative_path("C:\\x").is_err());
        assert!(safe_relative_path("").is_err());

        assert_eq!(
            safe_relative_path("a/./x.bin").ok(),
            Some(PathBuf::from("a").join("x.bin"))
        );
    }
}
