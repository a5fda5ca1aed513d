use clap::Args;
use miette::{Context, Result};
use owo_colors::OwoColorize;
use skull_gfs::GfsEditor;
use std::path::PathBuf;

#[derive(Args)]
pub struct ListArgs {
    /// An input GFS file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let editor = GfsEditor::open(&self.file)
            .context(format!("opening {}", self.file.display()))?;

        println!(
            "{} entries, data at {:#x}",
            editor.len().bold(),
            editor.data_offset()
        );
        for entry in editor.entries() {
            println!(
                "{:>12} {:>10}  {}",
                format!("{:#x}", entry.data_offset).dimmed(),
                entry.data_length,
                entry.path
            );
        }

        Ok(())
    }
}
