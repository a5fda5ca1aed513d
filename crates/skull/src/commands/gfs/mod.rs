use itertools::Itertools;
use miette::{miette, Result};
use owo_colors::OwoColorize;
use skull_gfs::BatchReport;

pub mod add;
pub mod extract;
pub mod list;
pub mod pack;
pub mod unpack;

#[derive(clap::Subcommand)]
pub enum GfsCommands {
    /// List the entries of a GFS archive
    List(list::ListArgs),
    /// Extract entries of a GFS archive into a directory
    Extract(extract::ExtractArgs),
    /// Add a file or directory to a GFS archive
    Add(add::AddArgs),
    /// Pack a directory into a new GFS archive
    Pack(pack::PackArgs),
    /// Unpack a whole GFS archive
    Unpack(unpack::UnpackArgs),
}

impl GfsCommands {
    pub fn handle(&self) -> Result<()> {
        match self {
            GfsCommands::List(list) => list.handle(),
            GfsCommands::Extract(extract) => extract.handle(),
            GfsCommands::Add(add) => add.handle(),
            GfsCommands::Pack(pack) => pack.handle(),
            GfsCommands::Unpack(unpack) => unpack.handle(),
        }
    }
}

/// Print a batch outcome, failing if any file failed
pub(crate) fn report(action: &str, report: &BatchReport) -> Result<()> {
    println!("{} {} files", action, report.succeeded.len().green());

    if report.is_success() {
        return Ok(());
    }

    println!(
        "{}",
        report
            .failures
            .iter()
            .map(|(path, e)| format!("❌ {}: {}", path.red(), e))
            .join("\n")
    );
    Err(miette!("{} files failed", report.failures.len()))
}
