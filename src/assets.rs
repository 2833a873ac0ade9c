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
use std::fmt;
use std::path::{Path, PathBuf};

use crate::util::filename_display;

pub use self::scan::{parse_tags, scan, ScanError};

mod scan;

/// A tagged audio file that may be packed into the table.
#[derive(Clone, Debug, PartialEq)]
pub struct AssetDescriptor {
    /// The source file.
    path: PathBuf,
    /// The resampled file. Only set once the resampler succeeded.
    converted_path: Option<PathBuf>,
    /// Number of musical beats the clip spans.
    beat_count: f64,
    /// Tempo the clip was recorded at.
    source_bpm: f64,
}

impl AssetDescriptor {
    /// Creates a new descriptor. Returns None unless both the beat count and the tempo are
    /// positive.
    pub fn new(path: PathBuf, beat_count: f64, source_bpm: f64) -> Option<AssetDescriptor> {
        if !(beat_count > 0.0 && beat_count.is_finite()) {
            return None;
        }
        if !(source_bpm > 0.0 && source_bpm.is_finite()) {
            return None;
        }

        Some(AssetDescriptor {
            path,
            converted_path: None,
            beat_count,
            source_bpm,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The file name of the source, used in log lines and the generated comments.
    pub fn name(&self) -> &str {
        filename_display(&self.path)
    }

    pub fn converted_path(&self) -> Option<&Path> {
        self.converted_path.as_deref()
    }

    pub fn beat_count(&self) -> f64 {
        self.beat_count
    }

    pub fn source_bpm(&self) -> f64 {
        self.source_bpm
    }

    /// Where the resampled version of this asset goes. The source's location below
    /// `input_folder` is mirrored below `output_folder`, so files with the same name in
    /// different subfolders never share a converted file.
    pub fn conversion_target(&self, input_folder: &Path, output_folder: &Path) -> PathBuf {
        let relative = self
            .path
            .strip_prefix(input_folder)
            .unwrap_or_else(|_| Path::new(self.name()));
        let mut target = output_folder.join(relative).into_os_string();
        target.push(".wav");
        PathBuf::from(target)
    }

    /// Records a successful conversion.
    pub fn converted_to(self, converted_path: PathBuf) -> AssetDescriptor {
        AssetDescriptor {
            converted_path: Some(converted_path),
            ..self
        }
    }
}

impl fmt::Display for AssetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Beats={}) (BPM={})",
            self.name(),
            self.beat_count,
            self.source_bpm
        )
    }
}
