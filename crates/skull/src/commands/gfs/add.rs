use clap::Args;
use miette::{miette, Context, Result};
use owo_colors::OwoColorize;
use skull_gfs::GfsEditor;
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct AddArgs {
    /// The GFS file to modify
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A file or directory to add
    #[arg(short, long, value_name = "PATH")]
    source: PathBuf,

    /// Archive path to store the source under. Defaults to the file name for a single file and
    /// the archive root for a directory.
    #[arg(short, long, value_name = "PREFIX")]
    prefix: Option<String>,

    /// Allow replacing existing entries
    #[arg(long, default_value_t = false)]
    replace: bool,
}

impl AddArgs {
    pub fn handle(&self) -> Result<()> {
        let mut editor = GfsEditor::open(&self.file)
            .context(format!("opening {}", self.file.display()))?;

        if self.source.is_dir() {
            let prefix = self.prefix.as_deref().unwrap_or("");
            let report = editor.add_directory(&self.source, prefix, self.replace)?;
            super::report("queued", &report)?;
        } else {
            let name = match &self.prefix {
                Some(prefix) => prefix.clone(),
                None => self
                    .source
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .ok_or(miette!("unable to name {}", self.source.display()))?,
            };
            editor
                .add_file(&name, &self.source, self.replace)
                .context(format!("adding {}", self.source.display()))?;
        }

        let summary = editor
            .commit()
            .context(format!("committing {}", self.file.display()))?;
        info!("wrote {} bytes", summary.bytes_written);
        println!(
            "{} kept, {} replaced, {} added",
            summary.kept,
            summary.replaced.yellow(),
            summary.added.green()
        );

        Ok(())
    }
}
