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

//! Packs tempo-tagged audio loops into a statically indexable C header.
//!
//! Every file found under the input folder whose name carries a `beats<N>` and a
//! `bpm<N>` tag is stretched to a common tempo, reduced to 8-bit mono and a
//! random subset of them is written out together with a table of retrigger
//! offsets for a fixed-rate sample player.

pub mod assets;
pub mod config;
pub mod emit;
pub mod pcm;
pub mod pipeline;
pub mod report;
pub mod resample;
pub mod retrig;
pub mod select;
pub mod table;
#[cfg(test)]
mod testutil;
pub mod util;
