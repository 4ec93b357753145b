//! world generation pipeline: height map → surface → ramps → underground → lakes → trees
pub mod caves;
pub mod height_map;
pub mod lakes;
pub mod trees;
pub mod underground;

use bevy::log::info;
use noise::NoiseFn;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::{BiomeConfig, WorldConfig};
use crate::error::{Result, WorldError};
use crate::grid::{HeightMap, TileGrid};
use crate::registry::TileRegistry;

use caves::CaveCarver;
use lakes::Lake;
use trees::TreeSet;

/// everything the pipeline produces
#[derive(Debug, Clone)]
pub struct Terrain {
    pub grid: TileGrid,
    pub height_map: HeightMap,
    pub caves: CaveCarver,
    pub trees: TreeSet,
    pub lakes: Vec<Lake>,
}

/// every tile name a biome table mentions must be registered
fn check_tile_names(config: &WorldConfig, registry: &TileRegistry) -> Result<()> {
    for biome in config.biomes.iter().chain(std::iter::once(&config.depth_biome)) {
        for (name, _) in biome.tile_probs.iter().chain(biome.surface_tiles.iter()) {
            registry.id_of(name)?;
        }
    }
    Ok(())
}

pub fn generate_terrain(config: &WorldConfig, registry: &TileRegistry) -> Result<Terrain> {
    let seed = config.seed as u32;
    generate_terrain_with(config, registry, |biome| height_map::fbm(&biome.height, seed))
}

/// full pipeline with an injectable height noise
pub fn generate_terrain_with<N, F>(
    config: &WorldConfig,
    registry: &TileRegistry,
    noise_for: F,
) -> Result<Terrain>
where
    N: NoiseFn<f64, 2>,
    F: FnMut(&BiomeConfig) -> N,
{
    config.validate()?;
    check_tile_names(config, registry)?;
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    /* -------- height map -------- */
    let height_map = height_map::generate_height_map_with(config, noise_for);
    if height_map.len() != config.width {
        return Err(WorldError::InvalidConfig(format!(
            "height map covers {} columns, map is {} wide",
            height_map.len(),
            config.width
        )));
    }
    let surface = height_map.surface_levels(config.height);
    info!("height map: {} columns over {} biomes", surface.len(), config.biomes.len());

    /* -------- surface & ramps -------- */
    let mut grid = TileGrid::new(config.width, config.height);
    let materials = underground::place_surface(&mut grid, config, registry, &surface, &mut rng)?;
    let ramps = underground::place_ramps(&mut grid, registry, &surface, &materials)?;
    info!("surface: {} ramps", ramps);

    /* -------- underground & caves -------- */
    let start = config
        .biome_id(&config.start_biome)
        .ok_or_else(|| WorldError::InvalidConfig(format!("unknown start biome {}", config.start_biome)))?;
    let mut caves = CaveCarver::new(config.seed);
    underground::place_underground(&mut grid, config, registry, &height_map, &mut caves, start, &mut rng)?;
    let carved: usize = caves.iter().map(|(_, mask)| mask.carved_count()).sum();
    info!("caves: {} masks, {} carved cells", caves.len(), carved);

    /* -------- lakes -------- */
    let lakes = lakes::carve_lakes(&mut grid, config, registry, &surface, &mut rng)?;
    info!("lakes: {}", lakes.len());

    /* -------- trees -------- */
    let trees = trees::place_trees(&mut grid, config, registry, &surface, &mut rng)?;
    info!("trees: {}", trees.len());

    info!("generated {}×{} world from seed {}", config.width, config.height, config.seed);
    Ok(Terrain { grid, height_map, caves, trees, lakes })
}

/// centre column if it's a valid spawn, else the closest valid column, else the centre anyway
pub fn spawn_point(grid: &TileGrid, registry: &TileRegistry, height_map: &HeightMap) -> (usize, usize) {
    let surface = height_map.surface_levels(grid.height());
    let center_x = grid.width() / 2;
    let Some(&center_y) = surface.get(center_x) else {
        return (center_x, 0);
    };
    if trees::valid_spawn_point(grid, registry, center_x, center_y) {
        return (center_x, center_y);
    }
    surface
        .iter()
        .enumerate()
        .filter(|(x, y)| trees::valid_spawn_point(grid, registry, *x, **y))
        .min_by_key(|(x, _)| x.abs_diff(center_x))
        .map(|(x, y)| (x, *y))
        .unwrap_or((center_x, center_y))
}
