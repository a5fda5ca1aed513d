use clap::Args;
use miette::{Context, Result};
use owo_colors::OwoColorize;
use skull_gfs::{pack::archive_path_for, pack_directory};
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct PackArgs {
    /// An input directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// A target GFS file. Defaults to the directory name with a `.gfs` extension
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl PackArgs {
    pub fn handle(&self) -> Result<()> {
        let file = self
            .file
            .clone()
            .unwrap_or_else(|| archive_path_for(&self.directory));
        info!("creating {}", file.display());

        let (summary, report) = pack_directory(&self.directory, &file, self.overwrite)
            .context(format!("packing {}", self.directory.display()))?;
        println!("{} {}", "packed".green(), file.display());
        info!("wrote {} bytes", summary.bytes_written);

        super::report("packed", &report)
    }
}
