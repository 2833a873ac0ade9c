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
use std::path::{Path, PathBuf};

use config::{Environment, File};
use serde::Deserialize;

pub use self::error::ConfigError;

mod error;

/// Prefix for environment variable overrides, e.g. `AUDIO2H_TARGET_BPM=174`.
const ENV_PREFIX: &str = "AUDIO2H";

pub const DEFAULT_INPUT_FOLDER: &str = "flacs";
pub const DEFAULT_OUTPUT_FOLDER: &str = "converted";
pub const DEFAULT_OUTPUT_FILE: &str = "audio2h.h";
pub const DEFAULT_ASSET_LIMIT: u64 = 5;
pub const DEFAULT_TARGET_BPM: f64 = 180.0;
pub const DEFAULT_TARGET_SAMPLE_RATE: u64 = 19200;
pub const DEFAULT_MAX_SAMPLES: u64 = 1_000_000;
pub const DEFAULT_RESAMPLER: &str = "sox";

/// Values given on the command line. Anything set here wins over the config
/// file and the environment.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct Overrides {
    /// The folder to search for tagged audio files.
    #[arg(long, global = true)]
    pub input_folder: Option<PathBuf>,
    /// The folder converted intermediate files are written to.
    #[arg(long, global = true)]
    pub output_folder: Option<PathBuf>,
    /// The header file to generate.
    #[arg(short, long, global = true)]
    pub output_file: Option<PathBuf>,
    /// The maximum number of assets to include.
    #[arg(short = 'l', long, global = true)]
    pub asset_limit: Option<u64>,
    /// The tempo every asset is stretched to.
    #[arg(short = 'b', long, global = true)]
    pub target_bpm: Option<f64>,
    /// The sample rate of the generated table.
    #[arg(short = 'r', long, global = true)]
    pub target_sample_rate: Option<u64>,
    /// The maximum number of samples a single asset may contain.
    #[arg(long, global = true)]
    pub max_samples: Option<u64>,
    /// The resampler executable (sox compatible).
    #[arg(long, global = true)]
    pub resampler: Option<String>,
    /// Seed for asset selection. A random seed is used if omitted.
    #[arg(long, global = true)]
    pub seed: Option<u64>,
    /// Number of worker threads used for conversion and extraction.
    #[arg(short = 'j', long, global = true)]
    pub threads: Option<u64>,
}

/// The configuration of one pipeline run.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Config {
    /// Root folder scanned for tagged audio files.
    input_folder: PathBuf,
    /// Folder receiving the resampled intermediate files.
    output_folder: PathBuf,
    /// The generated header.
    output_file: PathBuf,
    /// Upper bound on the number of assets in the table.
    asset_limit: usize,
    /// Tempo every asset is stretched to.
    target_bpm: f64,
    /// Sample rate of the generated table.
    target_sample_rate: u32,
    /// Upper bound on the number of samples per asset.
    max_samples: usize,
    /// Executable used for resampling.
    resampler: String,
    /// Selection seed. None picks one at random.
    seed: Option<u64>,
    /// Worker threads for per-asset work.
    threads: usize,
}

impl Config {
    /// Loads the configuration. Sources are layered lowest to highest:
    /// built-in defaults, the optional YAML file, `AUDIO2H_*` environment
    /// variables and finally the command line overrides.
    pub fn load(file: Option<&Path>, overrides: &Overrides) -> Result<Config, ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("input_folder", DEFAULT_INPUT_FOLDER)?
            .set_default("output_folder", DEFAULT_OUTPUT_FOLDER)?
            .set_default("output_file", DEFAULT_OUTPUT_FILE)?
            .set_default("asset_limit", DEFAULT_ASSET_LIMIT)?
            .set_default("target_bpm", DEFAULT_TARGET_BPM)?
            .set_default("target_sample_rate", DEFAULT_TARGET_SAMPLE_RATE)?
            .set_default("max_samples", DEFAULT_MAX_SAMPLES)?
            .set_default("resampler", DEFAULT_RESAMPLER)?
            .set_default("threads", num_cpus::get() as u64)?;

        if let Some(file) = file {
            builder = builder.add_source(File::from(file).required(false));
        }

        let config: Config = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .set_override_option(
                "input_folder",
                overrides.input_folder.as_deref().map(path_value),
            )?
            .set_override_option(
                "output_folder",
                overrides.output_folder.as_deref().map(path_value),
            )?
            .set_override_option("output_file", overrides.output_file.as_deref().map(path_value))?
            .set_override_option("asset_limit", overrides.asset_limit)?
            .set_override_option("target_bpm", overrides.target_bpm)?
            .set_override_option("target_sample_rate", overrides.target_sample_rate)?
            .set_override_option("max_samples", overrides.max_samples)?
            .set_override_option("resampler", overrides.resampler.clone())?
            .set_override_option("seed", overrides.seed)?
            .set_override_option("threads", overrides.threads)?
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.target_bpm.is_finite() && self.target_bpm > 0.0) {
            return Err(ConfigError::Invalid {
                field: "target_bpm",
                reason: "must be a positive number",
            });
        }
        if self.target_sample_rate == 0 {
            return Err(ConfigError::Invalid {
                field: "target_sample_rate",
                reason: "must be greater than zero",
            });
        }
        if self.max_samples == 0 {
            return Err(ConfigError::Invalid {
                field: "max_samples",
                reason: "must be greater than zero",
            });
        }
        if self.threads == 0 {
            return Err(ConfigError::Invalid {
                field: "threads",
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }

    pub fn input_folder(&self) -> &Path {
        &self.input_folder
    }

    pub fn output_folder(&self) -> &Path {
        &self.output_folder
    }

    pub fn output_file(&self) -> &Path {
        &self.output_file
    }

    pub fn asset_limit(&self) -> usize {
        self.asset_limit
    }

    pub fn target_bpm(&self) -> f64 {
        self.target_bpm
    }

    pub fn target_sample_rate(&self) -> u32 {
        self.target_sample_rate
    }

    pub fn max_samples(&self) -> usize {
        self.max_samples
    }

    pub fn resampler(&self) -> &str {
        &self.resampler
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// A configuration rooted in the given folders with every other value at its default.
    #[cfg(test)]
    pub fn for_folders(input_folder: &Path, output_folder: &Path, output_file: &Path) -> Config {
        Config {
            input_folder: input_folder.to_path_buf(),
            output_folder: output_folder.to_path_buf(),
            output_file: output_file.to_path_buf(),
            asset_limit: DEFAULT_ASSET_LIMIT as usize,
            target_bpm: DEFAULT_TARGET_BPM,
            target_sample_rate: DEFAULT_TARGET_SAMPLE_RATE as u32,
            max_samples: DEFAULT_MAX_SAMPLES as usize,
            resampler: DEFAULT_RESAMPLER.to_string(),
            seed: Some(0),
            threads: 2,
        }
    }

    #[cfg(test)]
    pub fn with_asset_limit(mut self, asset_limit: usize) -> Config {
        self.asset_limit = asset_limit;
        self
    }

    #[cfg(test)]
    pub fn with_max_samples(mut self, max_samples: usize) -> Config {
        self.max_samples = max_samples;
        self
    }

    #[cfg(test)]
    pub fn with_seed(mut self, seed: u64) -> Config {
        self.seed = Some(seed);
        self
    }
}

fn path_value(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::load(None, &Overrides::default()).unwrap();

        assert_eq!(config.input_folder(), Path::new("flacs"));
        assert_eq!(config.output_folder(), Path::new("converted"));
        assert_eq!(config.output_file(), Path::new("audio2h.h"));
        assert_eq!(config.asset_limit(), 5);
        assert_eq!(config.target_bpm(), 180.0);
        assert_eq!(config.target_sample_rate(), 19200);
        assert_eq!(config.max_samples(), 1_000_000);
        assert_eq!(config.resampler(), "sox");
        assert_eq!(config.seed(), None);
        assert!(config.threads() >= 1);
    }

    #[test]
    fn test_missing_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(
            Some(dir.path().join("does-not-exist.yaml").as_path()),
            &Overrides::default(),
        )
        .unwrap();

        assert_eq!(config.asset_limit(), 5);
    }

    #[test]
    fn test_file_then_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audio2h.yaml");
        fs::write(
            &path,
            r#"
            input_folder: loops
            asset_limit: 12
            target_bpm: 174
            target_sample_rate: 22050
            seed: 42
            "#,
        )
        .unwrap();

        let overrides = Overrides {
            asset_limit: Some(3),
            output_file: Some(PathBuf::from("out/samples.h")),
            ..Default::default()
        };
        let config = Config::load(Some(path.as_path()), &overrides).unwrap();

        assert_eq!(config.input_folder(), Path::new("loops"));
        assert_eq!(config.asset_limit(), 3);
        assert_eq!(config.target_bpm(), 174.0);
        assert_eq!(config.target_sample_rate(), 22050);
        assert_eq!(config.seed(), Some(42));
        assert_eq!(config.output_file(), Path::new("out/samples.h"));
    }

    #[test]
    fn test_invalid_values() {
        let overrides = Overrides {
            target_bpm: Some(0.0),
            ..Default::default()
        };
        assert!(matches!(
            Config::load(None, &overrides),
            Err(ConfigError::Invalid {
                field: "target_bpm",
                ..
            })
        ));

        let overrides = Overrides {
            target_sample_rate: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            Config::load(None, &overrides),
            Err(ConfigError::Invalid {
                field: "target_sample_rate",
                ..
            })
        ));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audio2h.yaml");
        fs::write(&path, "asset_limit: [not, a, number]").unwrap();

        assert!(matches!(
            Config::load(Some(path.as_path()), &Overrides::default()),
            Err(ConfigError::Load(_))
        ));
    }
}
