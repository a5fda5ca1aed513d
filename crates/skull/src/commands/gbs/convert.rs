use clap::Args;
use miette::{Context, Result};
use owo_colors::OwoColorize;
use skull_gbs::SceneRecord;
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct ConvertArgs {
    /// An input GBS file
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// A target GBS file
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Write big endian, as used by the PS3 release
    #[arg(long, conflicts_with = "pc")]
    ps3: bool,

    /// Write little endian, as used by the PC release
    #[arg(long)]
    pc: bool,
}

impl ConvertArgs {
    pub fn handle(&self) -> Result<()> {
        let mut record = SceneRecord::open(&self.input)
            .context(format!("reading {}", self.input.display()))?;
        info!("read {} as {:?}", self.input.display(), record.endian);

        if let Some(endian) = super::target_endian(self.ps3, self.pc) {
            record = record.with_byte_order(endian);
        }

        record
            .save(&self.output)
            .context(format!("writing {}", self.output.display()))?;
        println!("{} {:?} {}", "wrote".green(), record.endian, self.output.display());

        Ok(())
    }
}
