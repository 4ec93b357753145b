//! world‑generation configuration: biome tables, map size, seed

use std::ops::RangeInclusive;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{Result, WorldError};

/// index into [`WorldConfig::biomes`]; the depth biome is `biomes.len()`
pub type BiomeId = usize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseParams {
    pub scale: f64,
    pub octaves: usize,
    pub persistence: f64,
    pub lacunarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaveParams {
    pub noise: NoiseParams,
    /// normalized noise above this is carved
    pub threshold: f64,
}

/// surface elevation band in tile rows (`top` < `bottom`, row 0 = sky)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationBand {
    pub top: f32,
    pub bottom: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomeConfig {
    pub name: String,
    pub height: NoiseParams,
    pub caves: CaveParams,
    pub elevation: ElevationBand,
    /// ordered, most common first; shallow bands see only a prefix
    pub tile_probs: Vec<(String, u32)>,
    /// weighted surface material
    pub surface_tiles: Vec<(String, u32)>,
    /// how many `tile_probs` entries each named depth band may use
    pub depth_prefixes: [usize; DEPTH_BANDS.len()],
    /// percent chance a valley becomes a lake
    pub lake_prob: Option<u32>,
    /// base percent chance of a tree per column
    pub tree_prob: Option<u32>,
}

fn weighted(pairs: &[(&str, u32)]) -> Vec<(String, u32)> {
    pairs.iter().map(|(n, w)| (n.to_string(), *w)).collect()
}

fn noise(scale: f64, octaves: usize, persistence: f64, lacunarity: f64) -> NoiseParams {
    NoiseParams { scale, octaves, persistence, lacunarity }
}

impl BiomeConfig {
    pub fn highlands() -> Self {
        Self {
            name: "highlands".into(),
            height: noise(325.0, 5, 1.6, 2.1),
            caves: CaveParams { noise: noise(30.0, 5, 2.0, 2.3), threshold: 0.4 },
            elevation: ElevationBand { top: 0.0, bottom: 70.0 },
            tile_probs: weighted(&[("stone", 40), ("dirt", 20), ("coal", 15), ("tin", 3), ("iron", 13), ("copper", 10)]),
            surface_tiles: weighted(&[("stone", 7), ("dirt", 4)]),
            depth_prefixes: [2, 5, 6],
            lake_prob: None,
            tree_prob: None,
        }
    }

    pub fn desert() -> Self {
        Self {
            name: "desert".into(),
            height: noise(425.0, 4, 0.9, 1.4),
            caves: CaveParams { noise: noise(60.0, 3, 0.7, 0.9), threshold: 0.6 },
            elevation: ElevationBand { top: 50.0, bottom: 90.0 },
            tile_probs: weighted(&[
                ("sand", 40), ("sandstone", 20), ("clay", 3), ("dirt", 10),
                ("desert fossil", 3), ("copper", 12), ("iron", 8),
            ]),
            surface_tiles: weighted(&[("sand", 1)]),
            depth_prefixes: [2, 5, 6],
            lake_prob: None,
            tree_prob: None,
        }
    }

    pub fn forest() -> Self {
        Self {
            name: "forest".into(),
            height: noise(400.0, 3, 1.2, 2.0),
            caves: CaveParams { noise: noise(30.0, 4, 1.6, 1.3), threshold: 0.55 },
            elevation: ElevationBand { top: 70.0, bottom: 110.0 },
            tile_probs: weighted(&[
                ("dirt", 35), ("stone", 25), ("clay", 7), ("tin", 5),
                ("coal", 9), ("iron", 11), ("copper", 8),
            ]),
            surface_tiles: weighted(&[("dirt", 8), ("stone", 3)]),
            depth_prefixes: [2, 3, 5],
            lake_prob: Some(35),
            tree_prob: Some(30),
        }
    }

    pub fn taiga() -> Self {
        Self {
            name: "taiga".into(),
            height: noise(375.0, 4, 1.3, 1.6),
            caves: CaveParams { noise: noise(40.0, 4, 1.6, 1.9), threshold: 0.4 },
            elevation: ElevationBand { top: 35.0, bottom: 90.0 },
            tile_probs: weighted(&[("stone", 35), ("dirt", 25), ("clay", 4), ("ice", 15), ("coal", 13), ("iron", 8)]),
            surface_tiles: weighted(&[("stone", 6), ("dirt", 5)]),
            depth_prefixes: [2, 3, 4],
            lake_prob: Some(25),
            tree_prob: Some(20),
        }
    }

    pub fn tundra() -> Self {
        Self {
            name: "tundra".into(),
            height: noise(450.0, 3, 1.2, 1.5),
            caves: CaveParams { noise: noise(70.0, 2, 0.6, 1.8), threshold: 0.35 },
            elevation: ElevationBand { top: 90.0, bottom: 125.0 },
            tile_probs: weighted(&[
                ("ice", 30), ("stone", 25), ("dirt", 15), ("tin", 2),
                ("coal", 11), ("copper", 6), ("iron", 11),
            ]),
            surface_tiles: weighted(&[("ice", 6), ("dirt", 5)]),
            depth_prefixes: [2, 3, 5],
            lake_prob: None,
            tree_prob: None,
        }
    }

    /// spans the whole map below its `elevation.top`
    pub fn underworld() -> Self {
        Self {
            name: "underworld".into(),
            height: noise(300.0, 6, 1.7, 2.0),
            caves: CaveParams { noise: noise(90.0, 6, 2.5, 2.4), threshold: 0.3 },
            elevation: ElevationBand { top: 160.0, bottom: MAP_HEIGHT as f32 },
            tile_probs: weighted(&[
                ("hellstone", 20), ("stone", 15), ("dirt", 5), ("coal", 15),
                ("copper", 15), ("iron", 15), ("obsidian", 15),
            ]),
            surface_tiles: weighted(&[("stone", 1)]),
            depth_prefixes: [7, 7, 7],
            lake_prob: None,
            tree_prob: None,
        }
    }

    /// the first `len` probabilities normalized to sum to 1
    pub fn band_probs(&self, len: usize) -> Vec<(&str, f64)> {
        let slice = &self.tile_probs[..len.min(self.tile_probs.len())];
        let total: u32 = slice.iter().map(|(_, w)| w).sum();
        slice
            .iter()
            .map(|(n, w)| (n.as_str(), *w as f64 / total as f64))
            .collect()
    }

    fn validate(&self) -> Result<()> {
        let bad = |msg: String| Err(WorldError::InvalidConfig(format!("{}: {msg}", self.name)));
        if self.tile_probs.is_empty() {
            return bad("empty tile probability table".into());
        }
        if self.surface_tiles.iter().map(|(_, w)| w).sum::<u32>() == 0 {
            return bad("surface tile weights sum to zero".into());
        }
        for &len in &self.depth_prefixes {
            if len == 0 || len > self.tile_probs.len() {
                return bad(format!("depth prefix {len} out of range"));
            }
            if self.tile_probs[..len].iter().map(|(_, w)| w).sum::<u32>() == 0 {
                return bad(format!("first {len} tile probabilities sum to zero"));
            }
        }
        if self.elevation.top >= self.elevation.bottom {
            return bad("elevation top must be above bottom".into());
        }
        if self.height.scale <= 0.0 || self.caves.noise.scale <= 0.0 {
            return bad("noise scale must be positive".into());
        }
        Ok(())
    }
}

/* ===========================================================
   world config resource
   =========================================================== */
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    pub seed: u64,
    pub width: usize,
    pub height: usize,
    /// left‑to‑right, one band each
    pub biomes: Vec<BiomeConfig>,
    pub depth_biome: BiomeConfig,
    /// biome whose caves are active when the world starts
    pub start_biome: String,
    /// last `band_width / blend_fraction` columns of a band are blended
    pub blend_fraction: usize,
    pub depth_bands: [f32; DEPTH_BANDS.len()],
    pub cave_min_depth: RangeInclusive<usize>,
    pub lake_width: RangeInclusive<usize>,
    pub lake_depth: RangeInclusive<usize>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            width: MAP_WIDTH,
            height: MAP_HEIGHT,
            biomes: vec![
                BiomeConfig::highlands(),
                BiomeConfig::desert(),
                BiomeConfig::forest(),
                BiomeConfig::taiga(),
                BiomeConfig::tundra(),
            ],
            depth_biome: BiomeConfig::underworld(),
            start_biome: "forest".into(),
            blend_fraction: BLEND_FRACTION,
            depth_bands: DEPTH_BANDS,
            cave_min_depth: CAVE_MIN_DEPTH,
            lake_width: LAKE_WIDTH,
            lake_depth: LAKE_DEPTH,
        }
    }
}

impl WorldConfig {
    pub fn biome_width(&self) -> usize {
        self.width / self.biomes.len().max(1)
    }

    /// columns at the end of a band blended into the next biome
    pub fn blend_width(&self) -> usize {
        self.biome_width() / self.blend_fraction.max(1)
    }

    pub fn depth_biome_id(&self) -> BiomeId {
        self.biomes.len()
    }

    pub fn biome(&self, id: BiomeId) -> Option<&BiomeConfig> {
        if id == self.depth_biome_id() {
            Some(&self.depth_biome)
        } else {
            self.biomes.get(id)
        }
    }

    pub fn biome_id(&self, name: &str) -> Option<BiomeId> {
        if self.depth_biome.name == name {
            return Some(self.depth_biome_id());
        }
        self.biomes.iter().position(|b| b.name == name)
    }

    /// biome band owning column `x` (clamped to the last band)
    pub fn biome_at_column(&self, x: usize) -> BiomeId {
        (x / self.biome_width().max(1)).min(self.biomes.len().saturating_sub(1))
    }

    /// biome order as persisted in snapshots
    pub fn biome_order(&self) -> Vec<String> {
        self.biomes.iter().map(|b| b.name.clone()).collect()
    }

    pub fn validate(&self) -> Result<()> {
        let bad = |msg: &str| Err(WorldError::InvalidConfig(msg.to_string()));
        if self.biomes.is_empty() {
            return bad("at least one surface biome is required");
        }
        if self.width == 0 || self.height == 0 {
            return bad("map must have a non‑zero extent");
        }
        if self.width % self.biomes.len() != 0 {
            return bad("map width must split evenly into biome bands");
        }
        if self.blend_fraction == 0 || self.blend_width() == 0 {
            return bad("blend zone must be at least one column");
        }
        if self.depth_bands.windows(2).any(|w| w[0] >= w[1]) {
            return bad("depth bands must be strictly increasing");
        }
        for range in [&self.cave_min_depth, &self.lake_width, &self.lake_depth] {
            if range.start() > range.end() {
                return bad("inverted min/max range");
            }
        }
        if self.biome_id(&self.start_biome).is_none() {
            return bad("start biome is not a configured biome");
        }
        for biome in self.biomes.iter().chain(std::iter::once(&self.depth_biome)) {
            biome.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_config(width: usize, height: usize) -> WorldConfig {
    let mut config = WorldConfig {
        width,
        height,
        biomes: vec![BiomeConfig::forest(), BiomeConfig::taiga()],
        cave_min_depth: 4..=8,
        ..Default::default()
    };
    config.depth_biome.elevation = ElevationBand { top: height as f32 * 0.8, bottom: height as f32 };
    config
}
