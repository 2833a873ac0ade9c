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
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::assets::AssetDescriptor;

/// An asset chosen for the table.
#[derive(Clone, Debug, PartialEq)]
pub struct Selected {
    /// Position in the generated table.
    index: usize,
    /// Position in the candidate list.
    source_index: usize,
    asset: AssetDescriptor,
}

impl Selected {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn source_index(&self) -> usize {
        self.source_index
    }

    pub fn asset(&self) -> &AssetDescriptor {
        &self.asset
    }
}

/// Creates the selection RNG. Without a seed one is drawn from the OS so the run can
/// still be repeated by passing the returned seed back in.
pub fn seeded_rng(seed: Option<u64>) -> (StdRng, u64) {
    let seed = seed.unwrap_or_else(rand::random);
    (StdRng::seed_from_u64(seed), seed)
}

/// Shuffles the candidates and keeps the first `limit`. Indices are assigned in
/// selection order.
pub fn select<R: Rng + ?Sized>(
    candidates: Vec<AssetDescriptor>,
    limit: usize,
    rng: &mut R,
) -> Vec<Selected> {
    let mut order: Vec<(usize, AssetDescriptor)> = candidates.into_iter().enumerate().collect();
    order.shuffle(rng);
    order.truncate(limit);

    order
        .into_iter()
        .enumerate()
        .map(|(index, (source_index, asset))| Selected {
            index,
            source_index,
            asset,
        })
        .collect()
}
