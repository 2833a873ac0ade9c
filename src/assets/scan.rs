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
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info};

use super::AssetDescriptor;
use crate::util::filename_display;

const AUDIO_EXTENSIONS: [&str; 6] = ["flac", "wav", "mp3", "aif", "aiff", "ogg"];

lazy_static! {
    static ref BEATS_TAG: Regex = Regex::new(r"(?i)beats(?<beats>\d+)").unwrap();
    static ref BPM_TAG: Regex = Regex::new(r"(?i)bpm(?<bpm>\d+)").unwrap();
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("unable to read input folder {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Extracts the beat count and the tempo from a file name such as `amen_beats8_bpm136.flac`.
/// Returns None if either tag is missing.
pub fn parse_tags(file_name: &str) -> Option<(f64, f64)> {
    let beats = BEATS_TAG.captures(file_name)?["beats"].parse::<f64>().ok()?;
    let bpm = BPM_TAG.captures(file_name)?["bpm"].parse::<f64>().ok()?;
    Some((beats, bpm))
}

/// Recurses into the given folder and returns a descriptor for every tagged audio file,
/// sorted by path. Files without both tags are skipped.
pub fn scan(root: &Path) -> Result<Vec<AssetDescriptor>, ScanError> {
    let mut files = Vec::new();
    collect_audio_files(root, &mut files)?;
    files.sort();
    info!(folder = ?root, count = files.len(), "Found audio files");

    let assets: Vec<AssetDescriptor> = files
        .into_iter()
        .filter_map(|path| {
            let Some((beats, bpm)) = parse_tags(filename_display(&path)) else {
                debug!(path = ?path, "Skipping file without beats/bpm tags");
                return None;
            };
            let asset = AssetDescriptor::new(path.clone(), beats, bpm);
            if asset.is_none() {
                debug!(path = ?path, beats, bpm, "Skipping file with a zero tag");
            }
            asset
        })
        .collect();

    info!(count = assets.len(), "Found tagged assets");
    Ok(assets)
}

fn collect_audio_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), ScanError> {
    let io_error = |source| ScanError::Io {
        path: dir.to_path_buf(),
        source,
    };

    for entry in fs::read_dir(dir).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        let path = entry.path();

        // Symlinked folders are not followed, so a link back up the tree can't loop.
        if entry.file_type().map_err(io_error)?.is_dir() {
            collect_audio_files(&path, files)?;
        } else if is_audio_file(&path) {
            files.push(path);
        }
    }

    Ok(())
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            AUDIO_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}
