use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use skull_gbs::SceneRecord;
use std::path::PathBuf;

#[derive(Args)]
pub struct InfoArgs {
    /// An input GBS file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,
}

impl InfoArgs {
    pub fn handle(&self) -> Result<()> {
        let record = SceneRecord::open(&self.file)
            .context(format!("reading {}", self.file.display()))?;

        let json = serde_json::to_string_pretty(&record).into_diagnostic()?;
        println!("{json}");

        Ok(())
    }
}
