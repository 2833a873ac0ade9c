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

//! Resampling policy and the external tool that applies it.
//!
//! Every asset is stretched to the target tempo, reduced to 8-bit mono at the
//! target sample rate and normalized with a fixed amount of headroom.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use tracing::trace;

use crate::assets::AssetDescriptor;

/// Converted files are always mono.
pub const OUTPUT_CHANNELS: u16 = 1;

/// Converted files are always unsigned 8-bit.
pub const OUTPUT_BIT_DEPTH: u16 = 8;

/// Gain applied after normalization so the bit reduction doesn't clip.
pub const HEADROOM_DB: f64 = -3.0;

#[derive(Debug, thiserror::Error)]
pub enum ResampleError {
    #[error("unable to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {status} while converting {}: {output}", .input.display())]
    Failed {
        program: String,
        input: PathBuf,
        status: ExitStatus,
        output: String,
    },
}

/// The parameters of one conversion.
#[derive(Clone, Debug, PartialEq)]
pub struct ResampleParams {
    input: PathBuf,
    output: PathBuf,
    sample_rate: u32,
    channels: u16,
    bit_depth: u16,
    /// Playback speed factor. Above 1.0 speeds the clip up.
    speed: f64,
    lowpass_hz: u32,
    gain_db: f64,
}

impl ResampleParams {
    /// Computes the conversion of `asset` into `output` for the given target tempo and rate.
    pub fn for_asset(
        asset: &AssetDescriptor,
        output: PathBuf,
        target_bpm: f64,
        target_sample_rate: u32,
    ) -> ResampleParams {
        ResampleParams {
            input: asset.path().to_path_buf(),
            output,
            sample_rate: target_sample_rate,
            channels: OUTPUT_CHANNELS,
            bit_depth: OUTPUT_BIT_DEPTH,
            speed: target_bpm / asset.source_bpm(),
            lowpass_hz: target_sample_rate,
            gain_db: HEADROOM_DB,
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn lowpass_hz(&self) -> u32 {
        self.lowpass_hz
    }

    pub fn gain_db(&self) -> f64 {
        self.gain_db
    }

    /// The sox command line for this conversion, without the program name.
    pub fn sox_args(&self) -> Vec<String> {
        vec![
            self.input.to_string_lossy().into_owned(),
            "-r".to_string(),
            self.sample_rate.to_string(),
            "-c".to_string(),
            self.channels.to_string(),
            "-b".to_string(),
            self.bit_depth.to_string(),
            self.output.to_string_lossy().into_owned(),
            "speed".to_string(),
            format!("{:.6}", self.speed),
            "lowpass".to_string(),
            self.lowpass_hz.to_string(),
            "norm".to_string(),
            "gain".to_string(),
            format!("{}", self.gain_db),
        ]
    }
}

/// Applies a conversion. Implementations block until the output file is complete.
pub trait Resampler: Send + Sync {
    fn resample(&self, params: &ResampleParams) -> Result<(), ResampleError>;
}

/// Runs sox (or a binary with the same command line) as a child process.
pub struct SoxResampler {
    program: String,
}

impl SoxResampler {
    pub fn new(program: &str) -> SoxResampler {
        SoxResampler {
            program: program.to_string(),
        }
    }
}

impl Resampler for SoxResampler {
    fn resample(&self, params: &ResampleParams) -> Result<(), ResampleError> {
        let args = params.sox_args();
        trace!(program = self.program, args = ?args, "Running resampler");

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| ResampleError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(ResampleError::Failed {
                program: self.program.clone(),
                input: params.input.clone(),
                status: output.status,
                output: combined.trim().to_string(),
            });
        }

        Ok(())
    }
}
