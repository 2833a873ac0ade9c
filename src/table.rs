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

//! The logical asset table and its accessors.
//!
//! Every accessor takes a table index. Indices outside `[0, len)` resolve to
//! the first asset instead of failing, so a player wired to a knob always has
//! something to play. [fallback_index] is the single place that decides this,
//! and the emitted header implements the same rule.

use crate::pcm::PcmBuffer;
use crate::retrig::RetriggerTable;
use crate::select::Selected;

/// Resolves a table index for a table of `len` entries. Out of range indices fall back
/// to the first entry. Returns None only for an empty table.
pub fn fallback_index(index: usize, len: usize) -> Option<usize> {
    if len == 0 {
        None
    } else if index < len {
        Some(index)
    } else {
        Some(0)
    }
}

/// One packed asset.
#[derive(Clone, Debug, PartialEq)]
pub struct AssetEntry {
    /// Source file name, kept for the generated comments.
    name: String,
    /// Position in the candidate list the asset was selected from.
    source_index: usize,
    beat_count: f64,
    pcm: PcmBuffer,
}

impl AssetEntry {
    pub fn new(selected: &Selected, pcm: PcmBuffer) -> AssetEntry {
        AssetEntry {
            name: selected.asset().name().to_string(),
            source_index: selected.source_index(),
            beat_count: selected.asset().beat_count(),
            pcm,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_index(&self) -> usize {
        self.source_index
    }

    pub fn beat_count(&self) -> f64 {
        self.beat_count
    }

    /// Length of the clip in half beats.
    pub fn half_beats(&self) -> u32 {
        (self.beat_count * 2.0).round() as u32
    }

    pub fn pcm(&self) -> &PcmBuffer {
        &self.pcm
    }
}

/// The selected assets in table order plus the shared retrigger table.
#[derive(Clone, Debug, PartialEq)]
pub struct AssetTable {
    entries: Vec<AssetEntry>,
    retrigs: RetriggerTable,
}

impl AssetTable {
    /// Builds the table. `entries` must already be in table index order.
    pub fn assemble(entries: Vec<AssetEntry>, retrigs: RetriggerTable) -> AssetTable {
        AssetTable { entries, retrigs }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[AssetEntry] {
        &self.entries
    }

    pub fn retrigs(&self) -> &RetriggerTable {
        &self.retrigs
    }

    pub fn samples_per_half_beat(&self) -> u32 {
        self.retrigs.samples_per_half_beat()
    }

    fn entry(&self, index: usize) -> Option<&AssetEntry> {
        fallback_index(index, self.entries.len()).map(|i| &self.entries[i])
    }

    /// The sample at `offset` of the asset at `index`. None past the end of the asset.
    pub fn raw_value(&self, index: usize, offset: usize) -> Option<u8> {
        self.entry(index)?.pcm.get(offset)
    }

    /// The number of samples of the asset at `index`.
    pub fn length(&self, index: usize) -> Option<usize> {
        self.entry(index).map(|entry| entry.pcm.len())
    }

    /// The length of the asset at `index` in half beats.
    pub fn beats(&self, index: usize) -> Option<u32> {
        self.entry(index).map(AssetEntry::half_beats)
    }
}
