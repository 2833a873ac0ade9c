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
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::resample::{ResampleError, ResampleParams, Resampler};

fn spec(channels: u16, sample_rate: u32, bits_per_sample: u16, format: SampleFormat) -> WavSpec {
    WavSpec {
        channels,
        sample_rate,
        bits_per_sample,
        sample_format: format,
    }
}

/// Writes a mono 8-bit WAV, the format the resampler produces.
pub fn write_wav_i8(path: &Path, samples: &[i8], sample_rate: u32) -> Result<(), Box<dyn Error>> {
    let mut writer = WavWriter::create(path, spec(1, sample_rate, 8, SampleFormat::Int))?;
    for sample in samples {
        writer.write_sample(*sample)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Writes a 16-bit WAV with one Vec per channel. All channels must have the same length.
pub fn write_wav_i16(
    path: &Path,
    channels: &[Vec<i16>],
    sample_rate: u32,
) -> Result<(), Box<dyn Error>> {
    assert!(!channels.is_empty(), "At least one channel is required");
    let frames = channels[0].len();
    assert!(
        channels.iter().all(|c| c.len() == frames),
        "Channels must have the same length"
    );

    let mut writer = WavWriter::create(
        path,
        spec(channels.len() as u16, sample_rate, 16, SampleFormat::Int),
    )?;
    for frame in 0..frames {
        for channel in channels {
            writer.write_sample(channel[frame])?;
        }
    }
    writer.finalize()?;
    Ok(())
}

/// Writes a mono 32-bit float WAV.
pub fn write_wav_f32(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), Box<dyn Error>> {
    let mut writer = WavWriter::create(path, spec(1, sample_rate, 32, SampleFormat::Float))?;
    for sample in samples {
        writer.write_sample(*sample)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Stands in for sox. Writes an 8-bit ramp whose length is the input file's byte length
/// divided by the speed, and fails for inputs whose file name contains `fail_marker`.
pub struct StubResampler {
    fail_marker: String,
    calls: Mutex<Vec<ResampleParams>>,
}

impl StubResampler {
    pub fn new(fail_marker: &str) -> StubResampler {
        StubResampler {
            fail_marker: fail_marker.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every conversion requested so far, in no particular order.
    pub fn calls(&self) -> Vec<ResampleParams> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }
}

impl Resampler for StubResampler {
    fn resample(&self, params: &ResampleParams) -> Result<(), ResampleError> {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push(params.clone());

        let name = params
            .input()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if name.contains(&self.fail_marker) {
            return Err(ResampleError::Spawn {
                program: "stub".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "stub failure"),
            });
        }

        let len = fs::metadata(params.input())
            .map_err(|source| ResampleError::Spawn {
                program: "stub".to_string(),
                source,
            })?
            .len();
        let frames = (len as f64 / params.speed()).round() as usize;
        let samples: Vec<i8> = (0..frames).map(|i| (i % 256) as u8 as i8).collect();

        write_wav_i8(params.output(), &samples, params.sample_rate()).map_err(|e| {
            ResampleError::Spawn {
                program: "stub".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
            }
        })
    }
}
