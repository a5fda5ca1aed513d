pub mod gbs;
pub mod gfs;
pub mod process;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Handle GFS archives
    Gfs {
        #[command(subcommand)]
        command: gfs::GfsCommands,
    },
    /// Handle GBS scene records
    Gbs {
        #[command(subcommand)]
        command: gbs::GbsCommands,
    },
    /// Pack directories, unpack archives and re-encode scene records by extension
    Process(process::ProcessArgs),
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Gfs { command } => command.handle(),
            Commands::Gbs { command } => command.handle(),
            Commands::Process(process) => process.handle(),
        }
    }
}
