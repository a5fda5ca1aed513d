use clap::Args;
use miette::{Context, Result};
use skull_gfs::GfsEditor;
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct ExtractArgs {
    /// An input GFS file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Only extract entries equal to or below this archive path
    #[arg(short, long, value_name = "PREFIX", default_value = "")]
    prefix: String,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let editor = GfsEditor::open(&self.file)
            .context(format!("opening {}", self.file.display()))?;

        info!("extracting into {}", self.directory.display());
        let report = editor.extract_files(&self.directory, &self.prefix)?;

        super::report("extracted", &report)
    }
}
