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

//! One complete packing run.
//!
//! Conversion failures only drop the affected asset. Anything that goes wrong
//! after selection aborts the run before the header is written, since a table
//! with a hole in it would shift every index after the hole.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{error, info};

use crate::assets::{self, AssetDescriptor, ScanError};
use crate::config::Config;
use crate::emit::{self, EmitError, TableWriter};
use crate::pcm::{self, ExtractError};
use crate::resample::{ResampleParams, Resampler};
use crate::retrig::RetriggerTable;
use crate::select::{self, Selected};
use crate::table::{AssetEntry, AssetTable};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("unable to create output folder {}: {source}", .path.display())]
    OutputFolder {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to start worker threads: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("asset {asset} was selected without a converted file")]
    NotConverted { asset: String },

    #[error("extracting asset {asset} failed: {source}")]
    Extract {
        asset: String,
        #[source]
        source: ExtractError,
    },

    #[error(transparent)]
    Emit(#[from] EmitError),
}

/// Scans, converts, selects, extracts and writes the table described by `config`.
/// Returns the table that was written.
pub fn run(
    config: Config,
    resampler: &dyn Resampler,
    writer: &dyn TableWriter,
) -> Result<AssetTable, PipelineError> {
    let retrigs = RetriggerTable::new(config.target_bpm(), config.target_sample_rate());
    info!(
        bpm = config.target_bpm(),
        sample_rate = config.target_sample_rate(),
        samples_per_half_beat = retrigs.samples_per_half_beat(),
        retrigs = %retrigs,
        "Computed retrigger table"
    );

    let candidates = assets::scan(config.input_folder())?;
    fs::create_dir_all(config.output_folder()).map_err(|source| {
        PipelineError::OutputFolder {
            path: config.output_folder().to_path_buf(),
            source,
        }
    })?;

    let pool = worker_pool(config.threads())?;
    let converted = convert_all(&pool, resampler, candidates, &config);

    let (mut rng, seed) = select::seeded_rng(config.seed());
    let selected = select::select(converted, config.asset_limit(), &mut rng);
    info!(seed, count = selected.len(), "Selected assets");
    for s in &selected {
        info!(
            index = s.index(),
            source_index = s.source_index(),
            asset = s.asset().name(),
            "Selected asset"
        );
    }

    let entries = extract_all(&pool, &selected, config.max_samples())?;
    let table = AssetTable::assemble(entries, retrigs);

    let contents = writer.render(&table)?;
    emit::write_artifact(config.output_file(), &contents)?;

    Ok(table)
}

fn worker_pool(threads: usize) -> Result<ThreadPool, PipelineError> {
    Ok(ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .thread_name(|i| format!("audio2h-worker-{i}"))
        .build()?)
}

/// Converts every candidate on the pool. Assets the resampler fails on are logged and left
/// out; the rest keep their relative order.
pub fn convert_all(
    pool: &ThreadPool,
    resampler: &dyn Resampler,
    candidates: Vec<AssetDescriptor>,
    config: &Config,
) -> Vec<AssetDescriptor> {
    let total = candidates.len();
    let converted: Vec<AssetDescriptor> = pool.install(|| {
        candidates
            .into_par_iter()
            .filter_map(|asset| convert(resampler, asset, config))
            .collect()
    });

    info!(
        converted = converted.len(),
        failed = total - converted.len(),
        "Converted assets"
    );
    converted
}

fn convert(
    resampler: &dyn Resampler,
    asset: AssetDescriptor,
    config: &Config,
) -> Option<AssetDescriptor> {
    let output = asset.conversion_target(config.input_folder(), config.output_folder());
    if let Some(parent) = output.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            error!(
                asset = asset.name(),
                path = ?parent,
                err = %e,
                "Unable to create folder, skipping asset"
            );
            return None;
        }
    }
    let params = ResampleParams::for_asset(
        &asset,
        output.clone(),
        config.target_bpm(),
        config.target_sample_rate(),
    );

    match resampler.resample(&params) {
        Ok(()) => {
            info!(asset = asset.name(), speed = params.speed(), "Converted asset");
            Some(asset.converted_to(output))
        }
        Err(e) => {
            error!(asset = asset.name(), err = %e, "Conversion failed, skipping asset");
            None
        }
    }
}

/// Extracts the PCM of every selected asset on the pool. The entries come back in table
/// order. The first failure aborts the whole batch.
pub fn extract_all(
    pool: &ThreadPool,
    selected: &[Selected],
    max_samples: usize,
) -> Result<Vec<AssetEntry>, PipelineError> {
    pool.install(|| {
        selected
            .par_iter()
            .map(|s| extract(s, max_samples))
            .collect()
    })
}

fn extract(selected: &Selected, max_samples: usize) -> Result<AssetEntry, PipelineError> {
    let asset = selected.asset();
    let path: &Path = asset
        .converted_path()
        .ok_or_else(|| PipelineError::NotConverted {
            asset: asset.name().to_string(),
        })?;

    let pcm = pcm::extract(path, max_samples).map_err(|source| PipelineError::Extract {
        asset: asset.name().to_string(),
        source,
    })?;
    info!(
        index = selected.index(),
        asset = asset.name(),
        samples = pcm.len(),
        "Extracted asset"
    );

    Ok(AssetEntry::new(selected, pcm))
}
