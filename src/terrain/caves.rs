//! lazily carved, per‑biome cave masks

use std::collections::BTreeMap;

use bevy::log::debug;
use noise::NoiseFn;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::{BiomeConfig, BiomeId, WorldConfig};
use crate::error::{Result, WorldError};
use crate::grid::HeightMap;
use crate::terrain::height_map::fbm;

/// `true` = carved to air; same extent as the tile grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaveMask {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl CaveMask {
    pub fn from_raw(width: usize, height: usize, cells: Vec<bool>) -> Result<Self> {
        if cells.len() != width * height {
            return Err(WorldError::InvalidConfig(format!(
                "cave mask holds {} cells, expected {width}×{height}",
                cells.len()
            )));
        }
        Ok(Self { width, height, cells })
    }

    /// outside the mask nothing is carved
    #[inline]
    pub fn is_carved(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.cells[y * self.width + x]
    }

    pub fn carved_count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.cells
    }
}

/// carve one biome's mask; nothing above `surface + min_depth`
pub fn carve_mask<N: NoiseFn<f64, 2>>(
    noise: &N,
    biome: &BiomeConfig,
    height_map: &HeightMap,
    height: usize,
    min_depth: usize,
) -> CaveMask {
    let width = height_map.len();
    let scale = biome.caves.noise.scale;
    let mut cells = vec![false; width * height];

    for (x, surface) in height_map.surface_levels(height).into_iter().enumerate() {
        for y in (surface + min_depth)..height {
            let n = noise.get([x as f64 / scale, y as f64 / scale]);
            cells[y * width + x] = (n + 1.0) / 2.0 > biome.caves.threshold;
        }
    }
    CaveMask { width, height, cells }
}

/// get‑or‑compute cache keyed by biome
#[derive(Debug, Clone, Default)]
pub struct CaveCarver {
    seed: u64,
    maps: BTreeMap<BiomeId, CaveMask>,
}

impl CaveCarver {
    pub fn new(seed: u64) -> Self {
        Self { seed, maps: BTreeMap::new() }
    }

    /// computed once per biome, then served from the cache
    pub fn get_or_compute(
        &mut self,
        biome: BiomeId,
        config: &WorldConfig,
        height_map: &HeightMap,
    ) -> Result<&CaveMask> {
        if !self.maps.contains_key(&biome) {
            let params = config
                .biome(biome)
                .ok_or_else(|| WorldError::InvalidConfig(format!("no biome with id {biome}")))?;

            // own stream per biome: the mask doesn't depend on which biome was carved first
            let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
            rng.set_stream(biome as u64 + 1);
            let min_depth = rng.gen_range(config.cave_min_depth.clone());

            let noise = fbm(&params.caves.noise, self.seed as u32);
            let mask = carve_mask(&noise, params, height_map, config.height, min_depth);
            debug!(
                "carved {} cave cells for {} (min depth {})",
                mask.carved_count(),
                params.name,
                min_depth
            );
            self.maps.insert(biome, mask);
        }
        self.maps
            .get(&biome)
            .ok_or_else(|| WorldError::InvalidConfig(format!("no cave mask for biome {biome}")))
    }

    pub fn get(&self, biome: BiomeId) -> Option<&CaveMask> {
        self.maps.get(&biome)
    }

    /// restore a mask loaded from a snapshot
    pub fn insert(&mut self, biome: BiomeId, mask: CaveMask) {
        self.maps.insert(biome, mask);
    }

    pub fn iter(&self) -> impl Iterator<Item = (BiomeId, &CaveMask)> {
        self.maps.iter().map(|(id, mask)| (*id, mask))
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}
