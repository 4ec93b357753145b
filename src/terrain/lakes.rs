//! valley detection & water basins

use bevy::log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{BiomeId, WorldConfig};
use crate::constants::AIR_ID;
use crate::error::Result;
use crate::grid::TileGrid;
use crate::registry::{TileRegistry, WATER};

/// surface span `[start_x, end_x)` with the surface rows at both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Valley {
    pub start_x: usize,
    pub start_y: usize,
    pub end_x: usize,
    pub end_y: usize,
}

impl Valley {
    pub fn width(&self) -> usize {
        self.end_x - self.start_x
    }
}

/// accepted valley plus its carved depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lake {
    pub biome: BiomeId,
    pub valley: Valley,
    /// first water row
    pub surface_y: usize,
    /// one past the last water row
    pub floor_y: usize,
}

/// larger lakes push their neighbours further away
pub fn far_enough(prev: &Valley, candidate: &Valley) -> bool {
    candidate.start_x - prev.end_x >= prev.width().max(candidate.width())
}

/// valleys in one biome band that pass the width, roll, and spacing checks
pub fn find_valleys<R: Rng>(
    config: &WorldConfig,
    biome: BiomeId,
    lake_prob: u32,
    surface: &[usize],
    rng: &mut R,
) -> Vec<Valley> {
    let band_w = config.biome_width();
    let band_start = biome * band_w;
    let band_end = (band_start + band_w).min(surface.len());
    let (min_w, max_w) = (*config.lake_width.start(), *config.lake_width.end());

    let mut valleys: Vec<Valley> = Vec::new();
    if band_start >= band_end {
        return valleys;
    }
    let (mut start_x, mut start_y) = (band_start, surface[band_start]);
    // lowest ground (largest row) seen since `start_x`
    let mut deepest = start_y;

    for x in band_start + 1..band_end {
        let y = surface[x];
        if x - start_x > max_w {
            // too wide, start over from here
            (start_x, start_y, deepest) = (x, y, y);
            continue;
        }
        if y >= start_y {
            deepest = deepest.max(y);
            continue;
        }
        // surface rose above where the valley started; only a dip makes a valley
        let dipped = deepest > start_y;
        if dipped && x - start_x >= min_w && rng.gen_range(0..=100) < lake_prob {
            let candidate = Valley { start_x, start_y, end_x: x, end_y: y };
            if valleys.last().map_or(true, |prev| far_enough(prev, &candidate)) {
                valleys.push(candidate);
            }
        }
        (start_x, start_y, deepest) = (x, y, y);
    }
    valleys
}

/// fills each accepted valley with water and clears the terrain above it
pub fn carve_lakes<R: Rng>(
    grid: &mut TileGrid,
    config: &WorldConfig,
    registry: &TileRegistry,
    surface: &[usize],
    rng: &mut R,
) -> Result<Vec<Lake>> {
    let water = registry.id_of(WATER)?;
    let height = grid.height();
    let mut lakes = Vec::new();

    for (biome, params) in config.biomes.iter().enumerate() {
        let Some(prob) = params.lake_prob else { continue };

        for valley in find_valleys(config, biome, prob, surface, rng) {
            let mut peak = valley.start_y.max(valley.end_y);
            let peak_x = if peak == valley.start_y { valley.start_x } else { valley.end_x };
            if registry.is_ramp(grid.get(peak_x, peak)?) {
                // only fill up to the next full tile
                peak += 1;
            }
            let floor = (peak + rng.gen_range(config.lake_depth.clone())).min(height);

            for x in valley.start_x..valley.end_x {
                for y in 0..peak.min(height) {
                    grid.set(x, y, AIR_ID)?;
                }
                for y in peak..floor {
                    grid.set(x, y, water)?;
                }
            }
            debug!(
                "lake in {} at x {}..{} rows {}..{}",
                params.name, valley.start_x, valley.end_x, peak, floor
            );
            lakes.push(Lake { biome, valley, surface_y: peak, floor_y: floor });
        }
    }
    Ok(lakes)
}
