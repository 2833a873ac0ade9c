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

/// Multiples of a half beat at the start of the table.
const LONG_MULTIPLES: [u32; 3] = [4, 3, 2];

/// Number of halvings following the multiples, starting at one half beat.
const SUBDIVISIONS: usize = 5;

/// Number of entries in every retrigger table.
pub const RETRIGGER_COUNT: usize = LONG_MULTIPLES.len() + SUBDIVISIONS;

/// Returns the number of samples in half a beat, rounded half away from zero.
pub fn samples_per_half_beat(target_bpm: f64, target_sample_rate: u32) -> u32 {
    (60.0 / target_bpm * f64::from(target_sample_rate) / 2.0).round() as u32
}

/// Sample offsets at which a player may retrigger, longest first.
///
/// The first entries are two beats, a dotted beat and a beat; the rest halve
/// from a half beat down to a sixteenth of one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetriggerTable {
    samples_per_half_beat: u32,
    offsets: [u32; RETRIGGER_COUNT],
}

impl RetriggerTable {
    pub fn new(target_bpm: f64, target_sample_rate: u32) -> RetriggerTable {
        let half_beat = samples_per_half_beat(target_bpm, target_sample_rate);
        let mut offsets = [0; RETRIGGER_COUNT];

        for (offset, multiple) in offsets.iter_mut().zip(LONG_MULTIPLES) {
            *offset = half_beat.saturating_mul(multiple);
        }
        for (i, offset) in offsets[LONG_MULTIPLES.len()..].iter_mut().enumerate() {
            *offset = (f64::from(half_beat) / f64::from(1u32 << i)).round() as u32;
        }

        RetriggerTable {
            samples_per_half_beat: half_beat,
            offsets,
        }
    }

    pub fn samples_per_half_beat(&self) -> u32 {
        self.samples_per_half_beat
    }

    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    /// The largest offset, which decides the C element type.
    pub fn max_offset(&self) -> u32 {
        self.offsets[0]
    }
}

impl fmt::Display for RetriggerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let offsets: Vec<String> = self.offsets.iter().map(|o| o.to_string()).collect();
        write!(f, "[{}]", offsets.join(", "))
    }
}
