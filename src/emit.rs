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
use std::fmt::{self, Write};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::pcm::SILENCE;
use crate::table::AssetTable;
use crate::util::comment_safe;

/// Bytes per line in the generated sample arrays.
pub const DEFAULT_BYTES_PER_LINE: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("unable to render table: {0}")]
    Render(#[from] fmt::Error),

    #[error("unable to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Turns a table into the text of an artifact.
pub trait TableWriter {
    fn render(&self, table: &AssetTable) -> Result<String, EmitError>;
}

/// Writes the table as a C header for the Pico SDK. Sample data is placed in flash.
pub struct CHeaderWriter {
    bytes_per_line: usize,
}

impl CHeaderWriter {
    pub fn new(bytes_per_line: usize) -> CHeaderWriter {
        CHeaderWriter {
            bytes_per_line: bytes_per_line.max(1),
        }
    }

    fn write_constants(&self, out: &mut String, table: &AssetTable) -> fmt::Result {
        let retrigs = table.retrigs();
        let element = if retrigs.max_offset() <= u32::from(u16::MAX) {
            "uint16_t"
        } else {
            "uint32_t"
        };
        let offsets: Vec<String> = retrigs.offsets().iter().map(|o| o.to_string()).collect();

        writeln!(out, "#define NUM_SAMPLES {}", table.len())?;
        writeln!(out, "#define SAMPLES_PER_BEAT {}", table.samples_per_half_beat())?;
        writeln!(out, "#define NUM_RETRIGS {}", offsets.len())?;
        writeln!(
            out,
            "static const {} retrigs[] = {{ {} }};",
            element,
            offsets.join(", ")
        )
    }

    fn write_entries(&self, out: &mut String, table: &AssetTable) -> fmt::Result {
        for (i, entry) in table.entries().iter().enumerate() {
            writeln!(out)?;
            writeln!(out, "// {}", comment_safe(entry.name()))?;
            writeln!(out, "#define RAW_{}_BEATS {}", i, entry.half_beats())?;
            writeln!(out, "#define RAW_{}_SAMPLES {}", i, entry.pcm().len())?;
            writeln!(
                out,
                "static const unsigned char __in_flash() raw_{}[] = {{",
                i
            )?;

            // C has no zero length arrays. RAW_i_SAMPLES stays 0 so the pad is never played.
            let pad = [SILENCE];
            let data = if entry.pcm().is_empty() {
                &pad[..]
            } else {
                entry.pcm().as_slice()
            };
            let lines: Vec<String> = data
                .chunks(self.bytes_per_line)
                .map(|chunk| {
                    let bytes: Vec<String> = chunk.iter().map(|b| format!("0x{:02x}", b)).collect();
                    format!("\t{}", bytes.join(", "))
                })
                .collect();
            writeln!(out, "{}", lines.join(",\n"))?;
            writeln!(out, "}};")?;
        }
        Ok(())
    }

    fn write_accessors(&self, out: &mut String, table: &AssetTable) -> fmt::Result {
        writeln!(out)?;
        if table.is_empty() {
            writeln!(out, "// No samples were packed. Every sample is silent and empty.")?;
            writeln!(
                out,
                "static inline unsigned char raw_val(int s, int i) {{ return {}; }}",
                SILENCE
            )?;
            writeln!(out, "static inline unsigned int raw_len(int s) {{ return 0; }}")?;
            writeln!(out, "static inline unsigned int raw_beats(int s) {{ return 0; }}")?;
            return Ok(());
        }

        writeln!(
            out,
            "// Sample indices outside [0, NUM_SAMPLES) fall back to sample 0."
        )?;
        self.write_accessor(out, table, "unsigned char raw_val(int s, int i)", |i| {
            format!("raw_{}[i]", i)
        })?;
        self.write_accessor(out, table, "unsigned int raw_len(int s)", |i| {
            format!("RAW_{}_SAMPLES", i)
        })?;
        self.write_accessor(out, table, "unsigned int raw_beats(int s)", |i| {
            format!("RAW_{}_BEATS", i)
        })
    }

    fn write_accessor<F>(
        &self,
        out: &mut String,
        table: &AssetTable,
        signature: &str,
        value: F,
    ) -> fmt::Result
    where
        F: Fn(usize) -> String,
    {
        writeln!(out)?;
        writeln!(out, "static inline {} {{", signature)?;
        for i in 1..table.len() {
            writeln!(out, "\tif (s == {}) return {};", i, value(i))?;
        }
        writeln!(out, "\treturn {};", value(0))?;
        writeln!(out, "}}")
    }
}

impl Default for CHeaderWriter {
    fn default() -> Self {
        CHeaderWriter::new(DEFAULT_BYTES_PER_LINE)
    }
}

impl TableWriter for CHeaderWriter {
    fn render(&self, table: &AssetTable) -> Result<String, EmitError> {
        let mut out = String::new();
        writeln!(out, "// Generated by audio2h. Do not edit.")?;
        writeln!(out, "#pragma once")?;
        writeln!(out, "#include <pico/platform.h>")?;
        writeln!(out, "#include <stdint.h>")?;
        writeln!(out)?;
        self.write_constants(&mut out, table)?;
        self.write_entries(&mut out, table)?;
        self.write_accessors(&mut out, table)?;
        Ok(out)
    }
}

/// Writes the artifact through a temporary sibling so a failed run never leaves a
/// partial file behind.
pub fn write_artifact(path: &Path, contents: &str) -> Result<(), EmitError> {
    let io_error = |source| EmitError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);

    fs::write(&temp, contents).map_err(io_error)?;
    fs::rename(&temp, path).map_err(io_error)?;

    info!(path = ?path, bytes = contents.len(), "Wrote table");
    Ok(())
}
