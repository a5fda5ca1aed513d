use clap::Args;
use miette::{Context, Result};
use owo_colors::OwoColorize;
use skull_gbs::{merge, MergeConfig, SceneRecord};
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct MergeArgs {
    /// The GBS file to merge into
    #[arg(short, long, value_name = "FILE")]
    base: PathBuf,

    /// The GBS file providing new fonts, characters and textures
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// A target GBS file
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Append fonts the base does not have
    #[arg(long)]
    add_new_fonts: bool,

    /// Scale appended characters down to the base resolution
    #[arg(long)]
    divide_coords: bool,

    /// Give appended textures the id after the last existing one
    #[arg(long)]
    calculate_texture_id: bool,

    /// Write big endian, as used by the PS3 release
    #[arg(long, conflicts_with = "pc")]
    ps3: bool,

    /// Write little endian, as used by the PC release
    #[arg(long)]
    pc: bool,
}

impl MergeArgs {
    fn config(&self) -> MergeConfig {
        [
            (self.add_new_fonts, MergeConfig::ADD_NEW_FONTS),
            (self.divide_coords, MergeConfig::DIVIDE_COORDS),
            (self.calculate_texture_id, MergeConfig::CALCULATE_TEXTURE_ID),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .fold(MergeConfig::NONE, |config, (_, flag)| config | flag)
    }

    pub fn handle(&self) -> Result<()> {
        let base = SceneRecord::open(&self.base)
            .context(format!("reading {}", self.base.display()))?;
        let incoming = SceneRecord::open(&self.input)
            .context(format!("reading {}", self.input.display()))?;

        let mut merged = merge(&base, &incoming, self.config());
        if let Some(endian) = super::target_endian(self.ps3, self.pc) {
            merged = merged.with_byte_order(endian);
        }
        info!(
            "{} fonts, {} textures after merge",
            merged.fonts.len(),
            merged.textures.len()
        );

        merged
            .save(&self.output)
            .context(format!("writing {}", self.output.display()))?;
        println!("{} {}", "merged".green(), self.output.display());

        Ok(())
    }
}
