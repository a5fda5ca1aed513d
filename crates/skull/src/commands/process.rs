use clap::Args;
use miette::{miette, Context, Result};
use owo_colors::OwoColorize;
use skull_gbs::{Endian, SceneRecord};
use skull_gfs::{
    pack::{archive_path_for, directory_for},
    pack_directory, unpack_archive,
};
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Args)]
pub struct ProcessArgs {
    /// Directories to pack, `.gfs` archives to unpack or `.gbs` scene records to re-encode
    #[arg(value_name = "PATH", required = true)]
    paths: Vec<PathBuf>,

    /// Write scene records big endian, as used by the PS3 release
    #[arg(long, default_value_t = false)]
    ps3: bool,

    /// Allow overwriting archives when packing
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Route {
    Pack { archive: PathBuf },
    Unpack { directory: PathBuf },
    Scene { output: PathBuf, endian: Endian },
}

fn route(path: &Path, is_dir: bool, ps3: bool) -> Option<Route> {
    if is_dir {
        return Some(Route::Pack {
            archive: archive_path_for(path),
        });
    }

    let extension = path.extension()?.to_string_lossy().to_ascii_lowercase();
    match extension.as_str() {
        "gfs" => Some(Route::Unpack {
            directory: directory_for(path),
        }),
        "gbs" => {
            let (suffix, endian) = if ps3 {
                ("ps3.gbs", Endian::Big)
            } else {
                ("pc.gbs", Endian::Little)
            };
            Some(Route::Scene {
                output: path.with_extension(suffix),
                endian,
            })
        }
        _ => None,
    }
}

impl ProcessArgs {
    fn process(&self, path: &Path) -> Result<()> {
        let route = route(path, path.is_dir(), self.ps3)
            .ok_or(miette!("don't know how to process {}", path.display()))?;

        match route {
            Route::Pack { archive } => {
                info!("packing into {}", archive.display());
                let (_, report) = pack_directory(path, &archive, self.overwrite)?;
                crate::commands::gfs::report("packed", &report)
            }
            Route::Unpack { directory } => {
                info!("unpacking into {}", directory.display());
                let report = unpack_archive(path, &directory)?;
                crate::commands::gfs::report("unpacked", &report)
            }
            Route::Scene { output, endian } => {
                let record = SceneRecord::open(path)?.with_byte_order(endian);
                record.save(&output)?;
                info!("wrote {}", output.display());
                Ok(())
            }
        }
    }

    pub fn handle(&self) -> Result<()> {
        let mut failed = 0;
        for path in &self.paths {
            println!("{} {}", "processing".bold(), path.display());

            if let Err(e) = self
                .process(path)
                .context(format!("processing {}", path.display()))
            {
                error!("{e:?}");
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(miette!("{failed} of {} paths failed", self.paths.len()));
        }
        Ok(())
    }
}
