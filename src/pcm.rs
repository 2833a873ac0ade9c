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

//! PCM extraction from converted WAV files.
//!
//! Samples are stored as unsigned 8-bit magnitudes where 128 is silence,
//! which is what a PWM output with a wrap of 255 plays directly.

use std::io;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader};
use tracing::{debug, warn};

/// The value of a silent sample.
pub const SILENCE: u8 = 128;

/// A push past the configured sample limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("more than {limit} samples")]
pub struct CapacityError {
    limit: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("unable to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not a valid WAV file: {source}", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("{} has too many samples: {source}", .path.display())]
    Overflow {
        path: PathBuf,
        #[source]
        source: CapacityError,
    },
}

impl ExtractError {
    fn from_hound(path: &Path, error: hound::Error) -> ExtractError {
        match error {
            hound::Error::IoError(source) => ExtractError::Io {
                path: path.to_path_buf(),
                source,
            },
            source => ExtractError::Format {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    fn overflow(path: &Path, source: CapacityError) -> ExtractError {
        ExtractError::Overflow {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// One asset's waveform as unsigned bytes, bounded by a fixed sample limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmBuffer {
    data: Vec<u8>,
    limit: usize,
}

impl PcmBuffer {
    /// Creates an empty buffer that accepts at most `limit` samples.
    pub fn with_limit(limit: usize) -> PcmBuffer {
        PcmBuffer {
            data: Vec::new(),
            limit,
        }
    }

    /// Appends a sample, failing once the limit is reached.
    pub fn push(&mut self, sample: u8) -> Result<(), CapacityError> {
        if self.data.len() >= self.limit {
            return Err(CapacityError { limit: self.limit });
        }
        self.data.push(sample);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, offset: usize) -> Option<u8> {
        self.data.get(offset).copied()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

/// Reads every frame of a WAV file into a [PcmBuffer]. Only the first channel is kept.
///
/// The stream is read until it runs out, even if that is earlier or later than the
/// header claims. Only the samples actually read count against `max_samples`.
pub fn extract(path: &Path, max_samples: usize) -> Result<PcmBuffer, ExtractError> {
    let mut reader = WavReader::open(path).map_err(|e| ExtractError::from_hound(path, e))?;
    let spec = reader.spec();
    let reported = reader.duration() as usize;

    if spec.channels != 1 {
        warn!(
            path = ?path,
            channels = spec.channels,
            "Converted file is not mono, keeping the first channel"
        );
    }

    let channels = usize::from(spec.channels.max(1));
    let mut buffer = PcmBuffer::with_limit(max_samples);

    match spec.sample_format {
        SampleFormat::Float => {
            for sample in reader.samples::<f32>().step_by(channels) {
                let Some(sample) = until_end(path, sample)? else {
                    break;
                };
                buffer
                    .push(float_to_u8(sample))
                    .map_err(|e| ExtractError::overflow(path, e))?;
            }
        }
        SampleFormat::Int => {
            for sample in reader.samples::<i32>().step_by(channels) {
                let Some(sample) = until_end(path, sample)? else {
                    break;
                };
                buffer
                    .push(int_to_u8(sample, spec.bits_per_sample))
                    .map_err(|e| ExtractError::overflow(path, e))?;
            }
        }
    }

    if buffer.len() != reported {
        warn!(
            path = ?path,
            reported,
            extracted = buffer.len(),
            "Sample count differs from the WAV header"
        );
    }
    debug!(path = ?path, samples = buffer.len(), "Extracted PCM");

    Ok(buffer)
}

/// Hound reports a data chunk that is shorter than its header as an I/O error. That is
/// the end of the stream, not a failure.
fn until_end<S>(
    path: &Path,
    sample: Result<S, hound::Error>,
) -> Result<Option<S>, ExtractError> {
    match sample {
        Ok(sample) => Ok(Some(sample)),
        Err(hound::Error::IoError(e)) => {
            debug!(path = ?path, err = %e, "Data ended before the header said it would");
            Ok(None)
        }
        Err(e) => Err(ExtractError::from_hound(path, e)),
    }
}

/// Maps a signed integer sample of the given width onto 0..=255.
fn int_to_u8(sample: i32, bits_per_sample: u16) -> u8 {
    let scaled = if bits_per_sample >= 8 {
        sample >> (bits_per_sample - 8)
    } else {
        sample << (8 - bits_per_sample)
    };
    (scaled + i32::from(SILENCE)).clamp(0, 255) as u8
}

/// Maps a float sample in [-1.0, 1.0] onto 0..=255.
fn float_to_u8(sample: f32) -> u8 {
    ((sample.clamp(-1.0, 1.0) + 1.0) * 127.5).round() as u8
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::testutil::{write_wav_f32, write_wav_i16, write_wav_i8};

    #[test]
    fn test_buffer_limit() {
        let mut buffer = PcmBuffer::with_limit(2);
        buffer.push(1).unwrap();
        buffer.push(2).unwrap();

        assert_eq!(buffer.push(3), Err(CapacityError { limit: 2 }));
        assert_eq!(buffer.as_slice(), &[1, 2]);
        assert_eq!(buffer.get(1), Some(2));
        assert_eq!(buffer.get(2), None);
    }

    #[test]
    fn test_int_to_u8() {
        assert_eq!(int_to_u8(-128, 8), 0);
        assert_eq!(int_to_u8(0, 8), 128);
        assert_eq!(int_to_u8(127, 8), 255);
        assert_eq!(int_to_u8(i16::MIN.into(), 16), 0);
        assert_eq!(int_to_u8(0, 16), 128);
        assert_eq!(int_to_u8(i16::MAX.into(), 16), 255);
        assert_eq!(int_to_u8(-(1 << 23), 24), 0);
    }

    #[test]
    fn test_float_to_u8() {
        assert_eq!(float_to_u8(-1.0), 0);
        assert_eq!(float_to_u8(0.0), 128);
        assert_eq!(float_to_u8(1.0), 255);
        assert_eq!(float_to_u8(4.0), 255);
        assert_eq!(float_to_u8(-4.0), 0);
    }

    #[test]
    fn test_extract_8_bit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loop.wav");
        let samples: Vec<i8> = (-128..=127).collect();
        write_wav_i8(&path, &samples, 19200).unwrap();

        let buffer = extract(&path, 1_000).unwrap();

        assert_eq!(buffer.len(), samples.len());
        let expected: Vec<u8> = (0..=255).collect();
        assert_eq!(buffer.as_slice(), expected.as_slice());
    }

    #[test]
    fn test_extract_keeps_first_channel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_wav_i16(
            &path,
            &[vec![0, 0, 0], vec![i16::MAX, i16::MAX, i16::MAX]],
            19200,
        )
        .unwrap();

        let buffer = extract(&path, 1_000).unwrap();

        assert_eq!(buffer.as_slice(), &[128, 128, 128]);
    }

    #[test]
    fn test_extract_float() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("float.wav");
        write_wav_f32(&path, &[-1.0, 0.0, 1.0], 19200).unwrap();

        let buffer = extract(&path, 1_000).unwrap();

        assert_eq!(buffer.as_slice(), &[0, 128, 255]);
    }

    #[test]
    fn test_extract_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.wav");
        write_wav_i8(&path, &[], 19200).unwrap();

        let buffer = extract(&path, 1_000).unwrap();

        assert!(buffer.is_empty());
    }

    #[test]
    fn test_extract_overflow() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.wav");
        write_wav_i8(&path, &[0; 100], 19200).unwrap();

        assert!(extract(&path, 100).is_ok());
        assert!(matches!(
            extract(&path, 99),
            Err(ExtractError::Overflow { .. })
        ));
    }

    #[test]
    fn test_extract_truncated_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("truncated.wav");
        let samples: Vec<i8> = (0..100).collect();
        write_wav_i8(&path, &samples, 19200).unwrap();

        // Cut the last 10 samples off while the header still claims 100.
        let file = fs::OpenOptions::new().write(true).open(&path).unwrap();
        let len = file.metadata().unwrap().len();
        file.set_len(len - 10).unwrap();
        drop(file);

        let buffer = extract(&path, 1_000).unwrap();

        let expected: Vec<u8> = (0..90).map(|s: u8| s + 128).collect();
        assert_eq!(buffer.as_slice(), expected.as_slice());
    }

    #[test]
    fn test_extract_header_overstating_length_within_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("truncated.wav");
        write_wav_i8(&path, &[0; 100], 19200).unwrap();

        let file = fs::OpenOptions::new().write(true).open(&path).unwrap();
        let len = file.metadata().unwrap().len();
        file.set_len(len - 50).unwrap();
        drop(file);

        // The header says 100 but only 50 are there, which fits.
        let buffer = extract(&path, 60).unwrap();
        assert_eq!(buffer.len(), 50);
    }

    #[test]
    fn test_extract_missing_file() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            extract(&dir.path().join("missing.wav"), 100),
            Err(ExtractError::Io { .. })
        ));
    }

    #[test]
    fn test_extract_not_a_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.wav");
        fs::write(&path, b"this is definitely not a RIFF file").unwrap();

        assert!(matches!(
            extract(&path, 100),
            Err(ExtractError::Format { .. })
        ));
    }
}
