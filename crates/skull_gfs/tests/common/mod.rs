#![allow(dead_code)]

use binrw::BinWrite;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use skull_gfs::{
    error::Result,
    types::{GfsHeader, GfsRecord},
};

/// Build archive bytes from `(path, payload)` pairs in table order
pub fn archive_bytes(entries: &[(&str, &[u8])]) -> Result<Vec<u8>> {
    let records: Vec<GfsRecord> = entries
        .iter()
        .map(|(path, payload)| GfsRecord::new(*path, payload.len() as u64))
        .collect();

    let mut header = GfsHeader {
        file_count: records.len() as u64,
        ..Default::default()
    };
    header.data_offset =
        (header.byte_len() + records.iter().map(GfsRecord::byte_len).sum::<u64>()) as u32;

    let mut output = Cursor::new(Vec::new());
    header.write(&mut output)?;
    for record in &records {
        record.write(&mut output)?;
    }

    let mut output = output.into_inner();
    for (_, payload) in entries {
        output.extend_from_slice(payload);
    }
    Ok(output)
}

/// Write an archive into `dir` and return its path
pub fn write_archive(dir: &Path, name: &str, entries: &[(&str, &[u8])]) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, archive_bytes(entries)?)?;
    Ok(path)
}

/// Write a loose source file into `dir` and return its path
pub fn write_source(dir: &Path, name: &str, contents: &[u8]) -> Result<PathBuf> {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, contents)?;
    Ok(path)
}

pub const ONE: &[u8] = b"first payload";
pub const TWO: &[u8] = b"second";
pub const THREE: &[u8] = b"third payload, a little longer";

/// Three entry archive used across the tests
pub fn three_entries(dir: &Path) -> Result<PathBuf> {
    write_archive(
        dir,
        "data.gfs",
        &[("one.bin", ONE), ("two.bin", TWO), ("three.bin", THREE)],
    )
}
