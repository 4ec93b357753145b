//! the world aggregate: tile grid, height map, generation caches & collision index
//!
//! [`TileWorld::set_tile`] is the only way to write a tile at runtime; it
//! writes the grid and resyncs the collision index in the same call, so no
//! query can observe one without the other.

use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::collision::{CollisionIndex, TileRect};
use crate::config::{BiomeId, WorldConfig};
use crate::constants::{AIR_ID, TILE_SIZE};
use crate::error::{Result, WorldError};
use crate::grid::{HeightMap, TileGrid};
use crate::physics::Surroundings;
use crate::registry::{TileId, TileKind, TileRegistry};
use crate::terrain::caves::{CaveCarver, CaveMask};
use crate::terrain::trees::TreeSet;
use crate::terrain::{self, Terrain};

/// everything save/load needs, as flat arrays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub width: usize,
    pub height: usize,
    /// row‑major
    pub tile_map: Vec<TileId>,
    pub height_map: Vec<f32>,
    pub tree_map: Vec<(usize, usize)>,
    pub cave_maps: BTreeMap<String, Vec<bool>>,
    pub biome_order: Vec<String>,
    pub current_biome: String,
}

#[derive(Resource, Debug, Clone)]
pub struct TileWorld {
    config: WorldConfig,
    registry: TileRegistry,
    grid: TileGrid,
    height_map: HeightMap,
    caves: CaveCarver,
    trees: TreeSet,
    collision: CollisionIndex,
    active_biome: BiomeId,
    spawn_tile: (usize, usize),
}

impl TileWorld {
    /// run the whole generation pipeline
    pub fn generate(config: WorldConfig, registry: TileRegistry) -> Result<Self> {
        let terrain = terrain::generate_terrain(&config, &registry)?;
        Self::from_terrain(config, registry, terrain)
    }

    pub fn from_terrain(config: WorldConfig, registry: TileRegistry, terrain: Terrain) -> Result<Self> {
        let Terrain { grid, height_map, caves, trees, .. } = terrain;
        let active_biome = config
            .biome_id(&config.start_biome)
            .ok_or_else(|| WorldError::InvalidConfig(format!("unknown start biome {}", config.start_biome)))?;
        Self::assemble(config, registry, grid, height_map, caves, trees, active_biome)
    }

    fn assemble(
        config: WorldConfig,
        registry: TileRegistry,
        grid: TileGrid,
        height_map: HeightMap,
        mut caves: CaveCarver,
        trees: TreeSet,
        active_biome: BiomeId,
    ) -> Result<Self> {
        caves.get_or_compute(active_biome, &config, &height_map)?;
        let collision = CollisionIndex::build(&grid, &registry);
        let spawn_tile = terrain::spawn_point(&grid, &registry, &height_map);
        Ok(Self {
            config,
            registry,
            grid,
            height_map,
            caves,
            trees,
            collision,
            active_biome,
            spawn_tile,
        })
    }

    /* -------- read access -------- */

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn registry(&self) -> &TileRegistry {
        &self.registry
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn height_map(&self) -> &HeightMap {
        &self.height_map
    }

    pub fn caves(&self) -> &CaveCarver {
        &self.caves
    }

    pub fn trees(&self) -> &TreeSet {
        &self.trees
    }

    pub fn collision(&self) -> &CollisionIndex {
        &self.collision
    }

    pub fn tile_id_at(&self, x: usize, y: usize) -> Result<TileId> {
        self.grid.get(x, y)
    }

    pub fn tile_name_at(&self, x: usize, y: usize) -> Result<&str> {
        self.registry.name_of(self.grid.get(x, y)?)
    }

    /// candidates only; the caller does the exact overlap test
    pub fn query_nearby_rects(&self, rect: Rect) -> Vec<TileRect> {
        self.collision.query(rect)
    }

    pub fn surroundings(&self) -> Surroundings<'_> {
        Surroundings {
            grid: &self.grid,
            registry: &self.registry,
            index: &self.collision,
        }
    }

    /// pixel size of the whole map
    pub fn extent(&self) -> Vec2 {
        Vec2::new(self.grid.width() as f32, self.grid.height() as f32) * TILE_SIZE
    }

    /* -------- mutation -------- */

    /// write one tile and resync the collision index
    pub fn set_tile(&mut self, x: usize, y: usize, id: TileId) -> Result<()> {
        self.registry.kind_of(id)?;
        self.grid.set(x, y, id)?;
        self.collision.resync(&self.grid, &self.registry, x, y)
    }

    /// mining; air, liquids and tree bases can't be mined and give `None`
    pub fn remove_tile(&mut self, x: usize, y: usize) -> Result<Option<TileId>> {
        let id = self.grid.get(x, y)?;
        match self.registry.kind_of(id)? {
            TileKind::Air | TileKind::Liquid | TileKind::TreeBase => Ok(None),
            _ => {
                self.set_tile(x, y, AIR_ID)?;
                Ok(Some(id))
            }
        }
    }

    /// placement over air or liquid, next to something solid; `false` if refused
    pub fn place_tile(&mut self, x: usize, y: usize, id: TileId) -> Result<bool> {
        if !self.registry.is_solid(id) {
            return Ok(false);
        }
        let current = self.grid.get(x, y)?;
        if current != AIR_ID && !self.registry.is_liquid(current) {
            return Ok(false);
        }
        let (cx, cy) = (x as i32, y as i32);
        let supported = [(-1, 0), (1, 0), (0, -1), (0, 1)]
            .iter()
            .any(|(dx, dy)| self.grid.at(cx + dx, cy + dy).is_some_and(|n| self.registry.is_solid(n)));
        if !supported {
            return Ok(false);
        }
        self.set_tile(x, y, id)?;
        Ok(true)
    }

    /* -------- biome tracking -------- */

    pub fn active_biome(&self) -> BiomeId {
        self.active_biome
    }

    pub fn active_biome_name(&self) -> &str {
        self.config.biome(self.active_biome).map_or("", |b| b.name.as_str())
    }

    /// biome of column `x`; makes sure its cave mask is cached. `true` if it changed
    pub fn set_active_biome(&mut self, x: usize) -> Result<bool> {
        if x >= self.grid.width() {
            return Err(WorldError::OutOfBounds { x: x as i64, y: 0 });
        }
        let biome = self.config.biome_at_column(x);
        if biome == self.active_biome {
            return Ok(false);
        }
        self.caves.get_or_compute(biome, &self.config, &self.height_map)?;
        self.active_biome = biome;
        info!("entered {}", self.active_biome_name());
        Ok(true)
    }

    /* -------- spawn -------- */

    pub fn spawn_tile(&self) -> (usize, usize) {
        self.spawn_tile
    }

    /// top‑left of a body of `size` standing on the spawn tile
    pub fn spawn_position(&self, size: Vec2) -> Vec2 {
        let (x, y) = self.spawn_tile;
        Vec2::new(
            x as f32 * TILE_SIZE + (TILE_SIZE - size.x) / 2.0,
            y as f32 * TILE_SIZE - size.y,
        )
    }

    /* -------- snapshot -------- */

    pub fn snapshot(&self) -> WorldSnapshot {
        let cave_maps = self
            .caves
            .iter()
            .filter_map(|(id, mask)| {
                self.config.biome(id).map(|b| (b.name.clone(), mask.as_slice().to_vec()))
            })
            .collect();
        WorldSnapshot {
            width: self.grid.width(),
            height: self.grid.height(),
            tile_map: self.grid.as_slice().to_vec(),
            height_map: self.height_map.as_slice().to_vec(),
            tree_map: self.trees.iter().copied().collect(),
            cave_maps,
            biome_order: self.config.biome_order(),
            current_biome: self.active_biome_name().to_string(),
        }
    }

    /// rebuild a world (and its collision index) from a snapshot
    pub fn from_snapshot(snapshot: WorldSnapshot, config: WorldConfig, registry: TileRegistry) -> Result<Self> {
        let (width, height) = (snapshot.width, snapshot.height);
        if width != config.width || height != config.height {
            return Err(WorldError::InvalidConfig(format!(
                "snapshot is {width}×{height}, config expects {}×{}",
                config.width, config.height
            )));
        }
        if snapshot.biome_order != config.biome_order() {
            return Err(WorldError::InvalidConfig("snapshot biome order differs from config".into()));
        }
        if let Some(bad) = snapshot.tile_map.iter().find(|id| registry.kind_of(**id).is_err()) {
            return Err(WorldError::UnknownId(*bad));
        }
        if snapshot.height_map.len() != width {
            return Err(WorldError::InvalidConfig(format!(
                "height map holds {} columns, expected {width}",
                snapshot.height_map.len()
            )));
        }

        let grid = TileGrid::from_raw(width, height, snapshot.tile_map)?;
        let height_map = HeightMap::new(snapshot.height_map);

        let mut caves = CaveCarver::new(config.seed);
        for (name, cells) in snapshot.cave_maps {
            let id = config
                .biome_id(&name)
                .ok_or_else(|| WorldError::InvalidConfig(format!("cave map for unknown biome {name}")))?;
            caves.insert(id, CaveMask::from_raw(width, height, cells)?);
        }

        let mut trees = TreeSet::new();
        for (x, y) in snapshot.tree_map {
            if x >= width || y >= height {
                return Err(WorldError::OutOfBounds { x: x as i64, y: y as i64 });
            }
            trees.insert((x, y));
        }

        let active_biome = config
            .biome_id(&snapshot.current_biome)
            .ok_or_else(|| WorldError::InvalidConfig(format!("unknown biome {}", snapshot.current_biome)))?;
        Self::assemble(config, registry, grid, height_map, caves, trees, active_biome)
    }
}

/* ===========================================================
   startup
   =========================================================== */

/// build the `TileWorld` resource from the `WorldConfig` resource
pub fn generate_world_system(
    mut commands: Commands,
    config: Res<WorldConfig>,
    mut exit: EventWriter<AppExit>,
) {
    match TileRegistry::shipped().and_then(|registry| TileWorld::generate(config.clone(), registry)) {
        Ok(world) => {
            let (x, y) = world.spawn_tile();
            info!("world ready, spawn at tile ({x}, {y})");
            commands.insert_resource(world);
        }
        Err(e) => {
            error!("world generation failed: {e}");
            exit.send(AppExit::error());
        }
    }
}
