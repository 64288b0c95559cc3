use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use error_stack::ResultExt;
use sunraster_rs::{
    config::CubeConfig,
    instr::spice::SpiceMeta,
    logging::init_logging,
    spectrogram::{describe_axis_locations, Spectrogram, SpectrogramCube},
};

fn main() -> ExitCode {
    let clargs = Cli::parse();
    init_logging(clargs.verbosity.log_level_filter());
    if let Err(e) = driver(clargs) {
        eprintln!("ERROR: {e:?}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn driver(clargs: Cli) -> error_stack::Result<(), CliError> {
    let cube = CubeConfig::from_toml_file(&clargs.cube_file)
        .and_then(|cfg| cfg.into_cube())
        .change_context_lazy(|| CliError::Load(clargs.cube_file.clone()))?;

    for line in describe_axis_locations(&cube) {
        log::info!("{line}");
    }

    let cube = if clargs.apply_exposure_correction {
        cube.apply_exposure_time_correction(false, clargs.force)
            .change_context(CliError::Correction("apply"))?
    } else if clargs.undo_exposure_correction {
        cube.apply_exposure_time_correction(true, clargs.force)
            .change_context(CliError::Correction("undo"))?
    } else {
        cube
    };

    println!("{cube}");
    if clargs.show_meta {
        print_spice_meta(&cube);
    }
    Ok(())
}

fn print_spice_meta(cube: &SpectrogramCube) {
    let meta = SpiceMeta::new(cube.meta().clone());
    match meta.instrument() {
        Ok("SPICE") => {},
        Ok(other) => {
            log::warn!("INSTRUME is '{other}', not SPICE; instrument metadata may be incomplete");
        },
        Err(e) => {
            log::warn!("{e}; instrument metadata may be incomplete");
        },
    }

    for (name, value) in meta.summary_lines() {
        match value {
            Ok(v) => println!("{name}: {v}"),
            Err(e) => log::debug!("{name} unavailable: {e}"),
        }
    }
}

/// Load a spectrogram cube described in a TOML file, report where each
/// physical coordinate was found, and print a summary of the cube.
#[derive(Debug, Parser)]
struct Cli {
    /// TOML file with the cube's WCS axes, data, extra coordinates and metadata.
    cube_file: PathBuf,

    /// Divide the data by the exposure time before summarizing.
    #[clap(long, conflicts_with = "undo_exposure_correction")]
    apply_exposure_correction: bool,

    /// Multiply the data by the exposure time before summarizing.
    #[clap(long)]
    undo_exposure_correction: bool,

    /// Skip the check on the data unit when applying or undoing the
    /// exposure time correction.
    #[clap(long)]
    force: bool,

    /// Also print the SPICE instrument metadata found in the cube's meta table.
    #[clap(long)]
    show_meta: bool,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Could not load a spectrogram cube from {}", .0.display())]
    Load(PathBuf),
    #[error("Could not {0} the exposure time correction")]
    Correction(&'static str),
}
