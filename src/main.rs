// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::error::Error;
use std::path::PathBuf;

use clap::{crate_version, Parser, Subcommand};

use audio2h::assets;
use audio2h::config::{Config, Overrides};
use audio2h::emit::CHeaderWriter;
use audio2h::pipeline;
use audio2h::report;
use audio2h::resample::SoxResampler;
use audio2h::retrig::RetriggerTable;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "Packs tempo-tagged audio loops into a C header."
)]
struct Cli {
    /// The path to the config file. It's fine if it doesn't exist.
    #[arg(short, long, global = true, default_value = "audio2h.yaml")]
    config: PathBuf,

    #[clap(flatten)]
    overrides: Overrides,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Converts the tagged audio files and writes the header.
    Build {},
    /// Lists the tagged audio files and how each would be converted.
    Scan {},
    /// Prints the retrigger table for the configured tempo and sample rate.
    Retrigs {},
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::load(Some(cli.config.as_path()), &cli.overrides)?;

    match cli.command {
        Commands::Build {} => {
            let resampler = SoxResampler::new(config.resampler());
            let output_file = config.output_file().to_path_buf();
            let table = pipeline::run(config, &resampler, &CHeaderWriter::default())?;
            print!("{}", report::build_summary(&table, &output_file)?);
        }
        Commands::Scan {} => {
            let assets = assets::scan(config.input_folder())?;
            print!("{}", report::scan_listing(&config, &assets)?);
        }
        Commands::Retrigs {} => {
            let retrigs = RetriggerTable::new(config.target_bpm(), config.target_sample_rate());
            print!("{}", report::retrig_listing(&retrigs)?);
        }
    }

    Ok(())
}
