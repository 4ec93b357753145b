//! surface row, ramps, and depth‑banded underground fill

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::config::{BiomeConfig, BiomeId, WorldConfig};
use crate::error::{Result, WorldError};
use crate::grid::{HeightMap, TileGrid};
use crate::registry::{RampSide, TileId, TileRegistry};
use crate::terrain::caves::CaveCarver;

/// resolved ids + weighted distribution for one candidate table
struct TileTable {
    ids: Vec<TileId>,
    dist: WeightedIndex<f64>,
}

impl TileTable {
    fn new(registry: &TileRegistry, probs: &[(&str, f64)], biome: &str) -> Result<Self> {
        let ids = probs
            .iter()
            .map(|(name, _)| registry.id_of(name))
            .collect::<Result<Vec<_>>>()?;
        let dist = WeightedIndex::new(probs.iter().map(|(_, p)| *p))
            .map_err(|e| WorldError::InvalidConfig(format!("{biome}: {e}")))?;
        Ok(Self { ids, dist })
    }

    #[inline]
    fn draw<R: Rng>(&self, rng: &mut R) -> TileId {
        self.ids[self.dist.sample(rng)]
    }
}

/// one table per named depth band plus the unrestricted one
fn band_tables(registry: &TileRegistry, biome: &BiomeConfig) -> Result<Vec<TileTable>> {
    let mut tables = biome
        .depth_prefixes
        .iter()
        .map(|&len| TileTable::new(registry, &biome.band_probs(len), &biome.name))
        .collect::<Result<Vec<_>>>()?;
    tables.push(TileTable::new(
        registry,
        &biome.band_probs(biome.tile_probs.len()),
        &biome.name,
    )?);
    Ok(tables)
}

/// index of the band `rel` falls into; `bands.len()` = below all named bands
pub fn depth_band(rel: f32, bands: &[f32]) -> usize {
    bands.iter().position(|&limit| rel < limit).unwrap_or(bands.len())
}

/* ===========================================================
   surface
   =========================================================== */

/// writes one surface tile per column, returns the material used
pub fn place_surface<R: Rng>(
    grid: &mut TileGrid,
    config: &WorldConfig,
    registry: &TileRegistry,
    surface: &[usize],
    rng: &mut R,
) -> Result<Vec<TileId>> {
    let tables = config
        .biomes
        .iter()
        .map(|biome| {
            let total: u32 = biome.surface_tiles.iter().map(|(_, w)| w).sum();
            let probs: Vec<(&str, f64)> = biome
                .surface_tiles
                .iter()
                .map(|(n, w)| (n.as_str(), *w as f64 / total as f64))
                .collect();
            TileTable::new(registry, &probs, &biome.name)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut materials = Vec::with_capacity(surface.len());
    for (x, &y) in surface.iter().enumerate() {
        let id = tables[config.biome_at_column(x)].draw(rng);
        grid.set(x, y, id)?;
        materials.push(id);
    }
    Ok(materials)
}

/// a ramp where consecutive surface rows differ; returns how many were placed
pub fn place_ramps(
    grid: &mut TileGrid,
    registry: &TileRegistry,
    surface: &[usize],
    materials: &[TileId],
) -> Result<usize> {
    let mut placed = 0;
    // surface drops going right: slope down from the higher column
    for x in 0..surface.len().saturating_sub(1) {
        if surface[x + 1] > surface[x] {
            grid.set(x, surface[x], registry.ramp_of(materials[x], RampSide::Right)?)?;
            placed += 1;
        }
    }
    // surface climbs going right: slope up onto the higher column
    for x in 0..surface.len().saturating_sub(1) {
        if surface[x + 1] < surface[x] {
            grid.set(x + 1, surface[x + 1], registry.ramp_of(materials[x + 1], RampSide::Left)?)?;
            placed += 1;
        }
    }
    Ok(placed)
}

/* ===========================================================
   underground
   =========================================================== */

/// fills every cell below the surface row, leaving cells carved by the
/// `active` biome's cave mask as air
pub fn place_underground<R: Rng>(
    grid: &mut TileGrid,
    config: &WorldConfig,
    registry: &TileRegistry,
    height_map: &HeightMap,
    caves: &mut CaveCarver,
    active: BiomeId,
    rng: &mut R,
) -> Result<()> {
    let tables = config
        .biomes
        .iter()
        .map(|biome| band_tables(registry, biome))
        .collect::<Result<Vec<_>>>()?;
    let depth_table = TileTable::new(
        registry,
        &config.depth_biome.band_probs(config.depth_biome.tile_probs.len()),
        &config.depth_biome.name,
    )?;

    // other biomes' masks are left for when they become active
    let mask = caves.get_or_compute(active, config, height_map)?;

    let height = grid.height();
    let depth_top = config.depth_biome.elevation.top;
    let surface = height_map.surface_levels(height);

    for (x, &surface_y) in surface.iter().enumerate() {
        let biome = config.biome_at_column(x);
        let bands = &tables[biome];
        for y in (surface_y + 1)..height {
            if mask.is_carved(x, y) {
                continue;
            }
            let table = if y as f32 >= depth_top {
                &depth_table
            } else {
                let rel = (y - surface_y) as f32 / height as f32;
                &bands[depth_band(rel, &config.depth_bands)]
            };
            grid.set(x, y, table.draw(rng))?;
        }
    }
    Ok(())
}
