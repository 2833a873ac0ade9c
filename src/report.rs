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

//! Human readable output of the subcommands.

use std::fmt::{self, Write};
use std::path::Path;

use crate::assets::AssetDescriptor;
use crate::config::Config;
use crate::resample::ResampleParams;
use crate::retrig::RetriggerTable;
use crate::table::AssetTable;

/// Summarizes a finished build.
pub fn build_summary(table: &AssetTable, output_file: &Path) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(
        out,
        "Wrote {} sample(s) to {}.",
        table.len(),
        output_file.display()
    )?;
    for (i, entry) in table.entries().iter().enumerate() {
        writeln!(
            out,
            "- {}: {} ({} samples, {} half beats)",
            i,
            entry.name(),
            entry.pcm().len(),
            entry.half_beats()
        )?;
    }
    Ok(out)
}

/// Lists the candidates and how each one would be converted.
pub fn scan_listing(config: &Config, assets: &[AssetDescriptor]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    if assets.is_empty() {
        writeln!(
            out,
            "No tagged audio files found in {}.",
            config.input_folder().display()
        )?;
        return Ok(out);
    }

    writeln!(out, "Assets (count: {}):", assets.len())?;
    for asset in assets {
        let params = ResampleParams::for_asset(
            asset,
            asset.conversion_target(config.input_folder(), config.output_folder()),
            config.target_bpm(),
            config.target_sample_rate(),
        );
        writeln!(
            out,
            "- {} (Speed={:.6}) -> {}",
            asset,
            params.speed(),
            params.output().display()
        )?;
    }
    Ok(out)
}

/// Describes the retrigger table.
pub fn retrig_listing(retrigs: &RetriggerTable) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(
        out,
        "Samples per half beat: {}",
        retrigs.samples_per_half_beat()
    )?;
    writeln!(out, "Retriggers: {}", retrigs)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use rand::rngs::mock::StepRng;

    use super::*;
    use crate::pcm::PcmBuffer;
    use crate::select::select;
    use crate::table::AssetEntry;

    fn config() -> Config {
        Config::for_folders(
            Path::new("flacs"),
            Path::new("converted"),
            Path::new("audio2h.h"),
        )
    }

    #[test]
    fn test_scan_listing() {
        let assets = vec![
            AssetDescriptor::new(PathBuf::from("flacs/amen_beats8_bpm90.flac"), 8.0, 90.0)
                .unwrap(),
            AssetDescriptor::new(PathBuf::from("flacs/think_beats4_bpm240.wav"), 4.0, 240.0)
                .unwrap(),
        ];
        let converted = config().output_folder().to_path_buf();

        let listing = scan_listing(&config(), &assets).unwrap();

        let expected = format!(
            "Assets (count: 2):\n\
             - amen_beats8_bpm90.flac (Beats=8) (BPM=90) (Speed=2.000000) -> {}\n\
             - think_beats4_bpm240.wav (Beats=4) (BPM=240) (Speed=0.750000) -> {}\n",
            converted.join("amen_beats8_bpm90.flac.wav").display(),
            converted.join("think_beats4_bpm240.wav.wav").display(),
        );
        assert_eq!(listing, expected);
    }

    #[test]
    fn test_scan_listing_empty() {
        let listing = scan_listing(&config(), &[]).unwrap();
        assert_eq!(listing, "No tagged audio files found in flacs.\n");
    }

    #[test]
    fn test_retrig_listing() {
        let listing = retrig_listing(&RetriggerTable::new(180.0, 19200)).unwrap();
        assert_eq!(
            listing,
            "Samples per half beat: 3200\n\
             Retriggers: [12800, 9600, 6400, 3200, 1600, 800, 400, 200]\n"
        );
    }

    #[test]
    fn test_build_summary() {
        let candidates = vec![
            AssetDescriptor::new(PathBuf::from("flacs/a_beats4_bpm120.wav"), 4.0, 120.0).unwrap(),
            AssetDescriptor::new(PathBuf::from("flacs/b_beats2_bpm90.wav"), 2.0, 90.0).unwrap(),
        ];
        let selected = select(candidates, 5, &mut StepRng::new(0, 0));
        let entries = selected
            .iter()
            .map(|s| {
                let mut pcm = PcmBuffer::with_limit(100);
                for _ in 0..(s.source_index() + 1) * 3 {
                    pcm.push(128).unwrap();
                }
                AssetEntry::new(s, pcm)
            })
            .collect();
        let table = AssetTable::assemble(entries, RetriggerTable::new(180.0, 19200));

        let summary = build_summary(&table, Path::new("audio2h.h")).unwrap();

        let mut lines = summary.lines();
        assert_eq!(lines.next(), Some("Wrote 2 sample(s) to audio2h.h."));
        for (i, entry) in table.entries().iter().enumerate() {
            assert_eq!(
                lines.next().unwrap(),
                format!(
                    "- {}: {} ({} samples, {} half beats)",
                    i,
                    entry.name(),
                    (entry.source_index() + 1) * 3,
                    entry.beat_count() as u32 * 2
                )
            );
        }
        assert_eq!(lines.next(), None);
    }
}
