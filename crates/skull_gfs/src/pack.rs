//! Whole-directory packing and unpacking
//!

use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{instrument, warn};
use walkdir::WalkDir;

use crate::{
    commit::{temp_path_for, CommitSummary},
    edit::{BatchReport, GfsEditor, GfsEditorOptions},
    error::{Error, Result},
};

/// Archive a directory packs into by default: `dir` with a `.gfs` extension
pub fn archive_path_for(dir: impl AsRef<Path>) -> PathBuf {
    dir.as_ref().with_extension("gfs")
}

/// Directory an archive unpacks into by default: the archive path without its extension
pub fn directory_for(archive: impl AsRef<Path>) -> PathBuf {
    archive.as_ref().with_extension("")
}

/// Pack every regular file below `dir` into a new archive.
///
/// An existing archive is only replaced when `overwrite` is set, and only once the new one has
/// been written in full. Files that cannot be queued are reported and left out.
#[instrument(skip(dir, archive), fields(dir = %dir.as_ref().display()), err)]
pub fn pack_directory(
    dir: impl AsRef<Path>,
    archive: impl AsRef<Path>,
    overwrite: bool,
) -> Result<(CommitSummary, BatchReport)> {
    let dir = dir.as_ref();
    let archive = archive.as_ref();
    if !dir.is_dir() {
        return Err(Error::NotADirectory(dir.to_path_buf()));
    }
    if archive.exists() && !overwrite {
        return Err(Error::AlreadyExists(archive.display().to_string()));
    }

    // every file is taken whole, however large
    let options = GfsEditorOptions::builder()
        .max_transfer_size(
            GfsEditorOptions::default()
                .max_transfer_size
                .max(largest_file(dir)),
        )
        .build();

    let staging = temp_path_for(archive);
    let mut editor = GfsEditor::create(&staging, options)?;
    match fill_and_replace(&mut editor, dir, archive) {
        Ok(packed) => Ok(packed),
        Err(e) => {
            if let Err(cleanup) = fs::remove_file(&staging) {
                warn!("unable to remove {}: {cleanup}", staging.display());
            }
            Err(e)
        }
    }
}

fn fill_and_replace(
    editor: &mut GfsEditor,
    dir: &Path,
    archive: &Path,
) -> Result<(CommitSummary, BatchReport)> {
    let report = editor.add_directory(dir, "", false)?;
    let summary = editor.commit()?;
    fs::rename(editor.path(), archive)?;

    Ok((summary, report))
}

fn largest_file(dir: &Path) -> u64 {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .max()
        .unwrap_or(0)
}

/// Extract every entry of `archive` below `dir`.
#[instrument(skip(archive, dir), fields(archive = %archive.as_ref().display()), err)]
pub fn unpack_archive(archive: impl AsRef<Path>, dir: impl AsRef<Path>) -> Result<BatchReport> {
    GfsEditor::open(archive)?.extract_files(dir, "")
}
