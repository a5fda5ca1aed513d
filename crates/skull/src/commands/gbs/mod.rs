use skull_gbs::Endian;

pub mod convert;
pub mod info;
pub mod merge;

#[derive(clap::Subcommand)]
pub enum GbsCommands {
    /// Print a GBS scene record as JSON
    Info(info::InfoArgs),
    /// Re-encode a GBS scene record, optionally in the other byte order
    Convert(convert::ConvertArgs),
    /// Merge the fonts and textures of one GBS scene record into another
    Merge(merge::MergeArgs),
}

impl GbsCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            GbsCommands::Info(info) => info.handle(),
            GbsCommands::Convert(convert) => convert.handle(),
            GbsCommands::Merge(merge) => merge.handle(),
        }
    }
}

/// Byte order selected by the `--ps3` and `--pc` flags, if any
pub(crate) fn target_endian(ps3: bool, pc: bool) -> Option<Endian> {
    match (ps3, pc) {
        (true, _) => Some(Endian::Big),
        (_, true) => Some(Endian::Little),
        _ => None,
    }
}
