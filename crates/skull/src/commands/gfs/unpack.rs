use clap::Args;
use miette::{Context, Result};
use skull_gfs::{pack::directory_for, unpack_archive};
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct UnpackArgs {
    /// An input GFS file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target directory. Defaults to the file path without its extension
    #[arg(short, long, value_name = "DIR")]
    directory: Option<PathBuf>,
}

impl UnpackArgs {
    pub fn handle(&self) -> Result<()> {
        let directory = self
            .directory
            .clone()
            .unwrap_or_else(|| directory_for(&self.file));
        info!("unpacking into {}", directory.display());

        let report = unpack_archive(&self.file, &directory)
            .context(format!("unpacking {}", self.file.display()))?;

        super::report("unpacked", &report)
    }
}
